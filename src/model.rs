use std::sync::Arc;
use std::time::Instant;

use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use ratatui::layout::{Constraint, Flex, Layout, Margin, Rect};
use tracing::{debug, info, trace, warn};

use crate::columns::{ColumnDef, ColumnNode, HeaderGroup, default_schema, header_groups, leaves};
use crate::data::Row;
use crate::domain::{HELP_TEXT, Message, TVConfig, TVError};
use crate::filter::filter_rows;
use crate::inputter::{InputResult, Inputter};
use crate::resize::{ColumnSizing, boundary_hit, px_to_cells};
use crate::ui::{
    DEBUG_PANEL_HEIGHT, SEARCH_HEIGHT, STATUSLINE_HEIGHT, TABLE_COLUMN_SPACING,
    TABLE_HEADER_HEIGHT, TITLE_HEIGHT,
};

#[derive(Debug, PartialEq)]
pub enum AppStatus {
    Ready,
    Quitting,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Modus {
    Table,
    Search,
    Popup,
}

#[derive(Default, Clone, Debug, PartialEq)]
pub struct UILayout {
    pub width: u16,
    pub height: u16,
    pub title: Rect,
    pub search: Rect,
    pub table: Rect,
    pub debug: Rect,
    pub statusline: Rect,
    pub group_row_y: u16,
    pub header_row_y: u16,
    pub rows_y: u16,
    pub row_capacity: usize,
}

impl UILayout {
    pub fn from_values(width: u16, height: u16, show_debug: bool) -> Self {
        let debug_height = if show_debug { DEBUG_PANEL_HEIGHT } else { 0 };
        let [title, search, table, debug, statusline] = Layout::vertical([
            Constraint::Length(TITLE_HEIGHT),
            Constraint::Length(SEARCH_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(debug_height),
            Constraint::Length(STATUSLINE_HEIGHT),
        ])
        .areas(Rect::new(0, 0, width, height));

        let inner = table.inner(Margin::new(1, 1));
        let layout = UILayout {
            width,
            height,
            title,
            search,
            table,
            debug,
            statusline,
            group_row_y: inner.y,
            header_row_y: inner.y + 1,
            rows_y: inner.y + TABLE_HEADER_HEIGHT,
            row_capacity: inner.height.saturating_sub(TABLE_HEADER_HEIGHT) as usize,
        };
        trace!("Build UILayout: {:?}", layout);
        layout
    }

    fn in_header(&self, y: u16) -> bool {
        y == self.group_row_y || y == self.header_row_y
    }

    /// Areas of the columns inside the table, squeezed to the available
    /// width the same way the table widget lays them out.
    pub fn column_areas(&self, widths_cells: &[u16]) -> Vec<Rect> {
        let inner = self.table.inner(Margin::new(1, 1));
        let row = Rect::new(inner.x, self.header_row_y, inner.width, 1);
        Layout::horizontal(widths_cells.iter().map(|&w| Constraint::Length(w)))
            .spacing(TABLE_COLUMN_SPACING)
            .flex(Flex::Start)
            .split(row)
            .to_vec()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnView {
    pub id: String,
    pub label: String,
    pub width: u16,
    pub resizing: bool,
}

/// Everything the ui needs for one frame.
pub struct UIData {
    pub layout: UILayout,
    pub columns: Vec<ColumnView>,
    pub header_groups: Vec<HeaderGroup>,
    pub rows: Vec<Vec<String>>,
    pub nrows: usize,
    pub total_rows: usize,
    pub selected_row: usize,
    pub abs_selected_row: usize,
    pub selected_column: usize,
    pub selected_sub_rows: usize,
    pub cmdinput: InputResult,
    pub active_cmdinput: bool,
    pub show_popup: bool,
    pub popup_message: String,
    pub debug_json: Option<String>,
    pub status_message: String,
    pub last_status_message_update: Instant,
}

pub struct Model {
    config: TVConfig,
    pub status: AppStatus,
    modus: Modus,
    previous_modus: Modus,
    data: Arc<Vec<Row>>,
    view: Arc<Vec<Row>>,
    query: String,
    schema: Vec<ColumnNode>,
    columns: Vec<ColumnDef>,
    sizing: ColumnSizing,
    curser_row: usize,
    offset_row: usize,
    curser_column: usize,
    uilayout: UILayout,
    clipboard: Option<Clipboard>,
    input: Inputter,
    last_input: InputResult,
    show_debug: bool,
    status_message: String,
    last_status_message_update: Instant,
}

impl Model {
    pub fn init(config: &TVConfig, rows: Vec<Row>, ui_width: u16, ui_height: u16) -> Self {
        let schema = default_schema();
        let columns = leaves(&schema);
        let sizing = ColumnSizing::new(&columns);
        let data = Arc::new(rows);

        let clipboard = match Clipboard::new() {
            Ok(c) => Some(c),
            Err(e) => {
                warn!("Clipboard not available: {e}");
                None
            }
        };

        let mut model = Self {
            config: config.clone(),
            status: AppStatus::Ready,
            modus: Modus::Table,
            previous_modus: Modus::Table,
            view: Arc::clone(&data),
            data,
            query: String::new(),
            schema,
            columns,
            sizing,
            curser_row: 0,
            offset_row: 0,
            curser_column: 0,
            uilayout: UILayout::from_values(ui_width, ui_height, config.show_debug),
            clipboard,
            input: Inputter::default(),
            last_input: InputResult::default(),
            show_debug: config.show_debug,
            status_message: String::new(),
            last_status_message_update: Instant::now(),
        };
        model.set_status_message(format!("Generated {} rows", model.data.len()));
        info!(
            "Model ready with {} rows and {} columns",
            model.data.len(),
            model.columns.len()
        );
        model
    }

    #[cfg(test)]
    pub fn layout(&self) -> &UILayout {
        &self.uilayout
    }

    #[cfg(test)]
    pub fn modus(&self) -> Modus {
        self.modus
    }

    #[cfg(test)]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[cfg(test)]
    pub fn view(&self) -> &Arc<Vec<Row>> {
        &self.view
    }

    #[cfg(test)]
    pub fn data(&self) -> &Arc<Vec<Row>> {
        &self.data
    }

    #[cfg(test)]
    pub fn sizing(&self) -> &ColumnSizing {
        &self.sizing
    }

    pub fn selected_row(&self) -> Option<&Row> {
        self.view.get(self.curser_row)
    }

    #[cfg(test)]
    /// "No rows match" is shown instead of the table body.
    pub fn is_empty_view(&self) -> bool {
        self.view.is_empty()
    }

    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::Search
    }

    pub fn quit(&mut self) {
        self.status = AppStatus::Quitting;
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.last_status_message_update = Instant::now();
    }

    fn column_cells(&self) -> Vec<u16> {
        self.sizing.widths().into_iter().map(px_to_cells).collect()
    }

    pub fn uidata(&self) -> UIData {
        let resizing = self.sizing.resizing_column();
        let columns = self
            .columns
            .iter()
            .map(|c| ColumnView {
                id: c.id.clone(),
                label: c.label.clone(),
                width: px_to_cells(self.sizing.width(&c.id)),
                resizing: resizing == Some(c.id.as_str()),
            })
            .collect();

        let rend = std::cmp::min(
            self.offset_row + self.uilayout.row_capacity,
            self.view.len(),
        );
        let rows = self.view[self.offset_row.min(rend)..rend]
            .iter()
            .map(|row| self.columns.iter().map(|c| c.accessor.value(row)).collect())
            .collect();

        let debug_json = if self.show_debug {
            Some(
                self.sizing
                    .to_debug_json()
                    .unwrap_or_else(|e| format!("state unavailable: {e}")),
            )
        } else {
            None
        };

        UIData {
            layout: self.uilayout.clone(),
            columns,
            header_groups: header_groups(&self.schema),
            rows,
            nrows: self.view.len(),
            total_rows: self.data.len(),
            selected_row: self.curser_row.saturating_sub(self.offset_row),
            abs_selected_row: self.curser_row,
            selected_column: self.curser_column,
            selected_sub_rows: self.selected_row().map(|r| r.descendants()).unwrap_or(0),
            cmdinput: if self.modus == Modus::Search {
                self.last_input.clone()
            } else {
                InputResult {
                    input: self.query.clone(),
                    ..InputResult::default()
                }
            },
            active_cmdinput: self.modus == Modus::Search,
            show_popup: self.modus == Modus::Popup,
            popup_message: HELP_TEXT.to_string(),
            debug_json,
            status_message: self.status_message.clone(),
            last_status_message_update: self.last_status_message_update,
        }
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), TVError> {
        let Some(msg) = message else {
            return Ok(());
        };
        trace!("Update: Modus {:?}, Message {:?}", self.modus, msg);

        // Pointer and terminal resize events are handled the same way in every mode.
        match msg {
            Message::Resize(width, height) => {
                self.ui_resize(width, height);
                return Ok(());
            }
            Message::PointerDown(x, y) if self.modus != Modus::Popup => {
                self.pointer_down(x, y);
                return Ok(());
            }
            Message::PointerMove(x, _) => {
                self.pointer_move(x);
                return Ok(());
            }
            Message::PointerUp => {
                self.sizing.end();
                return Ok(());
            }
            _ => {}
        }

        match self.modus {
            Modus::Table => match msg {
                Message::Quit => self.quit(),
                Message::MoveDown => self.move_selection_down(1),
                Message::MoveUp => self.move_selection_up(1),
                Message::MovePageDown => self.move_selection_down(self.uilayout.row_capacity),
                Message::MovePageUp => self.move_selection_up(self.uilayout.row_capacity),
                Message::MoveBeginning => self.move_selection_up(usize::MAX),
                Message::MoveEnd => self.move_selection_down(usize::MAX),
                Message::MoveLeft => self.select_column(self.curser_column.saturating_sub(1)),
                Message::MoveRight => self.select_column(self.curser_column + 1),
                Message::Search => self.enter_search_mode(),
                Message::ClearSearch => self.clear_search(),
                Message::ResetResizing => self.reset_resizing(),
                Message::GrowColumn => self.resize_selected_column(self.config.resize_step as i64),
                Message::ShrinkColumn => {
                    self.resize_selected_column(-(self.config.resize_step as i64))
                }
                Message::ToggleDebug => self.toggle_debug(),
                Message::CopyRow => self.copy_row(),
                Message::Help => self.show_help(),
                _ => (),
            },
            Modus::Search => {
                if let Message::RawKey(key) = msg {
                    self.raw_input(key)
                }
            }
            Modus::Popup => match msg {
                Message::Quit => self.quit(),
                Message::Exit | Message::Help => self.exit(),
                _ => (),
            },
        }
        Ok(())
    }

    // -------------------- Control handling functions ---------------------- //

    fn ui_resize(&mut self, width: u16, height: u16) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.uilayout.width, width, self.uilayout.height, height
        );
        self.uilayout = UILayout::from_values(width, height, self.show_debug);
        self.scroll_to_cursor();
    }

    fn toggle_debug(&mut self) {
        self.show_debug = !self.show_debug;
        self.uilayout =
            UILayout::from_values(self.uilayout.width, self.uilayout.height, self.show_debug);
        self.scroll_to_cursor();
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::Popup;
    }

    fn exit(&mut self) {
        if self.modus == Modus::Popup {
            trace!("Close popup ...");
            self.modus = self.previous_modus;
            self.previous_modus = Modus::Popup;
        }
    }

    fn enter_search_mode(&mut self) {
        trace!("Entering search mode ...");
        self.previous_modus = self.modus;
        self.modus = Modus::Search;
        self.input.set(&self.query);
        self.last_input = self.input.get();
    }

    fn leave_search_mode(&mut self) {
        self.modus = Modus::Table;
        self.previous_modus = Modus::Search;
    }

    fn raw_input(&mut self, key: KeyEvent) {
        self.last_input = self.input.read(key);
        if self.last_input.changed {
            let input = self.last_input.input.clone();
            self.set_query(&input);
        }
        if self.last_input.finished {
            self.leave_search_mode();
        }
    }

    fn clear_search(&mut self) {
        self.input.clear();
        self.last_input = self.input.get();
        self.set_query("");
    }

    /// Recomputes the view only when the query text changed.
    pub fn set_query(&mut self, raw: &str) {
        if raw == self.query {
            return;
        }
        let start_time = Instant::now();
        self.query = raw.to_string();
        self.view = filter_rows(&self.data, &self.query);
        debug!(
            "Filter \"{}\" matched {} rows in {}us",
            self.query,
            self.view.len(),
            start_time.elapsed().as_micros()
        );

        self.curser_row = self.curser_row.min(self.view.len().saturating_sub(1));
        self.scroll_to_cursor();

        if self.query.is_empty() {
            self.set_status_message(format!("Showing all {} rows", self.data.len()));
        } else if self.view.is_empty() {
            self.set_status_message("Found no matches!");
        } else {
            self.set_status_message(format!("{} rows match", self.view.len()));
        }
    }

    fn reset_resizing(&mut self) {
        self.sizing.reset();
        debug!("Widths back to {:?}", self.sizing.default_width_map());
        self.set_status_message("Column sizes reset");
    }

    fn resize_selected_column(&mut self, delta: i64) {
        let Some(column) = self.columns.get(self.curser_column) else {
            return;
        };
        let (id, label) = (column.id.clone(), column.label.clone());
        if let Some(width) = self.sizing.resize_by(&id, delta) {
            self.set_status_message(format!("{label} width {width}px"));
        }
    }

    fn pointer_down(&mut self, x: u16, y: u16) {
        let layout = &self.uilayout;
        if layout.in_header(y) {
            let areas = layout.column_areas(&self.column_cells());
            if let Some(idx) = boundary_hit(&areas, TABLE_COLUMN_SPACING, x) {
                let id = self.columns[idx].id.clone();
                self.curser_column = idx;
                self.sizing.begin(&id, x);
            }
        } else if y >= layout.rows_y && (y - layout.rows_y) < layout.row_capacity as u16 {
            let row = self.offset_row + (y - layout.rows_y) as usize;
            if row < self.view.len() {
                self.curser_row = row;
            }
        } else if layout.search.contains((x, y).into()) && self.modus == Modus::Table {
            self.enter_search_mode();
        }
    }

    fn pointer_move(&mut self, x: u16) {
        let Some(width) = self.sizing.drag(x) else {
            return;
        };
        let label = self
            .columns
            .iter()
            .find(|c| self.sizing.resizing_column() == Some(c.id.as_str()))
            .map(|c| c.label.clone())
            .unwrap_or_default();
        self.set_status_message(format!("{label} width {width}px"));
    }

    fn select_column(&mut self, column: usize) {
        self.curser_column = column.min(self.columns.len().saturating_sub(1));
    }

    fn scroll_to_cursor(&mut self) {
        let capacity = self.uilayout.row_capacity.max(1);
        if self.curser_row < self.offset_row {
            self.offset_row = self.curser_row;
        } else if self.curser_row >= self.offset_row + capacity {
            self.offset_row = self.curser_row + 1 - capacity;
        }
        // keep the window filled when the view shrinks
        self.offset_row = self
            .offset_row
            .min(self.view.len().saturating_sub(capacity));
    }

    fn move_selection_up(&mut self, size: usize) {
        self.curser_row = self.curser_row.saturating_sub(size);
        self.scroll_to_cursor();
    }

    fn move_selection_down(&mut self, size: usize) {
        let last = self.view.len().saturating_sub(1);
        self.curser_row = self.curser_row.saturating_add(size).min(last);
        self.scroll_to_cursor();
    }

    fn wrap_cell_content(c: &str) -> String {
        let needs_escaping = c.chars().any(|c| c == '"');
        let needs_wrapping = c.chars().any(|c| c == ' ' || c == '\t' || c == ',');
        let mut out = String::from(c);

        if needs_escaping {
            out = out.replace('"', "\"\"");
        }
        if needs_wrapping || needs_escaping {
            out = format!("\"{out}\"");
        }
        out
    }

    fn row_as_csv(&self, row: &Row) -> String {
        self.columns
            .iter()
            .map(|c| Model::wrap_cell_content(&c.accessor.value(row)))
            .collect::<Vec<String>>()
            .join(",")
    }

    fn copy_row(&mut self) {
        let Some(row) = self.selected_row() else {
            self.set_status_message("Nothing to copy");
            return;
        };
        let content = self.row_as_csv(row);
        trace!("Row content: {}", content);

        let result = match self.clipboard.as_mut() {
            Some(clipboard) => clipboard.set_text(content).map_err(|e| e.to_string()),
            None => Err("no clipboard".to_string()),
        };
        match result {
            Ok(_) => self.set_status_message("Copied row to clipboard"),
            Err(e) => {
                warn!("Error copying to clipboard: {e}");
                self.set_status_message(format!("Copy failed: {e}"));
            }
        }
    }
}
