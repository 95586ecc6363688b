use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Margin, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};

use crate::domain::TVConfig;
use crate::model::{Model, UIData, UILayout};

pub const TITLE_HEIGHT: u16 = 2;
pub const SEARCH_HEIGHT: u16 = 3;
pub const DEBUG_PANEL_HEIGHT: u16 = 12;
pub const STATUSLINE_HEIGHT: u16 = 1;
/// Group header row plus leaf header row.
pub const TABLE_HEADER_HEIGHT: u16 = 2;
pub const TABLE_COLUMN_SPACING: u16 = 1;

const SEARCH_PLACEHOLDER: &str = "Search first name, last name, status...";
const EMPTY_MESSAGE: &str = "No rows match your search.";
const ACCENT: Color = Color::Rgb(234, 88, 12);

#[derive(Debug)]
pub struct TableUI {
    status_timeout: Duration,
}

impl TableUI {
    pub fn new(config: &TVConfig) -> Self {
        Self {
            status_timeout: Duration::from_secs(config.status_timeout),
        }
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let uidata = model.uidata();
        let area = frame.area();
        // The model only learns about a new size with the next resize event.
        let layout = if uidata.layout.width == area.width && uidata.layout.height == area.height {
            uidata.layout.clone()
        } else {
            UILayout::from_values(area.width, area.height, uidata.debug_json.is_some())
        };

        self.draw_title(frame, layout.title);
        self.draw_search(&uidata, frame, layout.search);
        self.draw_table(&uidata, &layout, frame);
        if let Some(json) = &uidata.debug_json
            && layout.debug.height > 0
        {
            self.draw_debug(json, frame, layout.debug);
        }
        self.draw_statusline(&uidata, frame, layout.statusline);
        if uidata.show_popup {
            self.draw_popup(&uidata.popup_message, frame, area);
        }
    }

    fn draw_title(&self, frame: &mut Frame, area: Rect) {
        let text = Text::from(vec![
            Line::from(" Adjustable Columns".bold().fg(ACCENT)),
            Line::from(" Drag the column edges to resize. Use search to filter rows.".dark_gray()),
        ]);
        frame.render_widget(Paragraph::new(text), area);
    }

    fn draw_search(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let border_style = if uidata.active_cmdinput {
            Style::new().fg(ACCENT)
        } else {
            Style::new().fg(Color::Gray)
        };
        let controls = Line::from(vec![
            " Clear ".into(),
            "<c>".blue().bold(),
            " Reset Resizing ".into(),
            "<r> ".blue().bold(),
        ]);
        let block = Block::bordered()
            .title(" Search ")
            .title_top(controls.right_aligned())
            .border_set(border::ROUNDED)
            .border_style(border_style);

        let input = &uidata.cmdinput.input;
        let content = if input.is_empty() && !uidata.active_cmdinput {
            Line::from(SEARCH_PLACEHOLDER.dark_gray())
        } else {
            Line::from(input.as_str())
        };
        frame.render_widget(Paragraph::new(content).block(block), area);

        if uidata.active_cmdinput {
            let inner = area.inner(Margin::new(1, 1));
            let x = inner.x + uidata.cmdinput.curser_pos.min(inner.width as usize) as u16;
            frame.set_cursor_position((x, inner.y));
        }
    }

    fn group_line(uidata: &UIData, areas: &[Rect]) -> Line<'static> {
        let spans = uidata
            .header_groups
            .iter()
            .filter_map(|group| {
                let first = areas.get(group.first_leaf)?;
                let last = areas.get(group.first_leaf + group.span - 1)?;
                let width = last.right().saturating_sub(first.x) as usize;
                let label: String = group.label.chars().take(width).collect();
                Some(Span::styled(
                    format!("{label:^width$}{}", " ".repeat(TABLE_COLUMN_SPACING as usize)),
                    Style::new().add_modifier(Modifier::BOLD),
                ))
            })
            .collect::<Vec<Span>>();
        Line::from(spans)
    }

    fn draw_table(&self, uidata: &UIData, layout: &UILayout, frame: &mut Frame) {
        let title = Line::from(format!(" {} of {} rows ", uidata.nrows, uidata.total_rows));
        let block = Block::bordered()
            .title(title)
            .border_set(border::ROUNDED)
            .border_style(Style::new().fg(Color::Gray));
        frame.render_widget(block, layout.table);

        let inner = layout.table.inner(Margin::new(1, 1));
        if inner.height < TABLE_HEADER_HEIGHT || inner.width == 0 {
            return;
        }

        let cells: Vec<u16> = uidata.columns.iter().map(|c| c.width).collect();
        let areas = layout.column_areas(&cells);

        let group_area = Rect::new(inner.x, layout.group_row_y, inner.width, 1);
        frame.render_widget(Paragraph::new(Self::group_line(uidata, &areas)), group_area);

        let header = Row::new(uidata.columns.iter().enumerate().map(|(idx, c)| {
            let mut style = Style::new().fg(Color::Gray).add_modifier(Modifier::BOLD);
            if idx == uidata.selected_column {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            if c.resizing {
                style = style.fg(Color::Black).bg(ACCENT);
            }
            Cell::from(c.label.to_uppercase()).style(style)
        }));
        // already fitted, so the table keeps the hit-test geometry
        let widths = areas.iter().map(|a| Constraint::Length(a.width));

        let rows = uidata
            .rows
            .iter()
            .map(|r| Row::new(r.iter().map(|v| Cell::from(v.as_str()))));

        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(TABLE_COLUMN_SPACING)
            .flex(Flex::Start)
            .row_highlight_style(Style::new().add_modifier(Modifier::REVERSED));

        let table_area = Rect::new(
            inner.x,
            layout.header_row_y,
            inner.width,
            inner.height - (layout.header_row_y - inner.y),
        );
        let mut state = TableState::default();
        if uidata.nrows > 0 {
            state.select(Some(uidata.selected_row));
        }
        frame.render_stateful_widget(table, table_area, &mut state);

        if uidata.nrows == 0 && table_area.height > 2 {
            let message_area = Rect::new(inner.x, layout.rows_y + 1, inner.width, 1);
            frame.render_widget(
                Paragraph::new(EMPTY_MESSAGE.italic().dark_gray()).centered(),
                message_area,
            );
        }
    }

    fn draw_debug(&self, json: &str, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .title(" State ")
            .border_set(border::ROUNDED)
            .style(Style::new().fg(Color::Gray).bg(Color::Rgb(15, 23, 42)));
        frame.render_widget(Paragraph::new(json).block(block), area);
    }

    fn draw_statusline(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let position = if uidata.nrows == 0 {
            " 0/0 ".to_string()
        } else {
            format!(" {}/{} ", uidata.abs_selected_row + 1, uidata.nrows)
        };
        let mut spans: Vec<Span> = vec![Span::styled(
            position,
            Style::new().fg(Color::Black).bg(Color::Gray),
        )];
        if uidata.selected_sub_rows > 0 {
            spans.push(Span::styled(
                format!(" +{} sub rows ", uidata.selected_sub_rows),
                Style::new().fg(Color::DarkGray),
            ));
        }
        if uidata.active_cmdinput {
            spans.push(" SEARCH ".bold().fg(ACCENT));
        } else {
            spans.push(" ?".blue().bold());
            spans.push(" help ".into());
        }
        if uidata.last_status_message_update.elapsed() < self.status_timeout {
            spans.push(" ".into());
            spans.push(uidata.status_message.clone().into());
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn draw_popup(&self, message: &str, frame: &mut Frame, area: Rect) {
        let [area] = Layout::vertical([Constraint::Percentage(80)])
            .flex(Flex::Center)
            .areas(area);
        let [area] = Layout::horizontal([Constraint::Percentage(60)])
            .flex(Flex::Center)
            .areas(area);
        let block = Block::bordered()
            .title(" Help ".bold())
            .title_bottom(Line::from(" Close <Esc> ").centered())
            .border_set(border::THICK);
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(message)
                .wrap(Wrap { trim: false })
                .block(block),
            area,
        );
    }
}
