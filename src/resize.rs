use std::collections::{BTreeMap, HashMap};

use ratatui::layout::Rect;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::columns::ColumnDef;
use crate::domain::PIXELS_PER_CELL;

pub const DEFAULT_MIN_WIDTH: u16 = 40;
pub const DEFAULT_WIDTH: u16 = 150;
pub const DEFAULT_MAX_WIDTH: u16 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnBounds {
    pub min_width: u16,
    pub width: u16,
    pub max_width: u16,
}

impl Default for ColumnBounds {
    fn default() -> Self {
        ColumnBounds {
            min_width: DEFAULT_MIN_WIDTH,
            width: DEFAULT_WIDTH,
            max_width: DEFAULT_MAX_WIDTH,
        }
    }
}

impl ColumnBounds {
    fn from_def(def: &ColumnDef) -> Self {
        let base = ColumnBounds::default();
        ColumnBounds {
            min_width: def.min_width.unwrap_or(base.min_width),
            width: def.width.unwrap_or(base.width),
            max_width: def.max_width.unwrap_or(base.max_width),
        }
    }

    fn clamp(&self, width: i64) -> u16 {
        width.clamp(self.min_width as i64, self.max_width as i64) as u16
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResizeState {
    #[default]
    Idle,
    Resizing {
        column: String,
        start_x: u16,
        start_width: u16,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ColumnResizingDump<'a> {
    start_x: Option<u16>,
    column_width: Option<u16>,
    is_resizing_column: Option<&'a str>,
    column_widths: &'a BTreeMap<String, u16>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StateDump<'a> {
    column_resizing: ColumnResizingDump<'a>,
}

/// Column widths in pixels plus the drag interaction state.
#[derive(Debug, Clone)]
pub struct ColumnSizing {
    order: Vec<String>,
    bounds: HashMap<String, ColumnBounds>,
    column_widths: BTreeMap<String, u16>,
    state: ResizeState,
    /// Start x and width of the latest drag, kept after it ends.
    last_start: Option<(u16, u16)>,
}

impl ColumnSizing {
    pub fn new(columns: &[ColumnDef]) -> Self {
        ColumnSizing {
            order: columns.iter().map(|c| c.id.clone()).collect(),
            bounds: columns
                .iter()
                .map(|c| (c.id.clone(), ColumnBounds::from_def(c)))
                .collect(),
            column_widths: BTreeMap::new(),
            state: ResizeState::Idle,
            last_start: None,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &ResizeState {
        &self.state
    }

    pub fn resizing_column(&self) -> Option<&str> {
        match &self.state {
            ResizeState::Resizing { column, .. } => Some(column),
            ResizeState::Idle => None,
        }
    }

    pub fn width(&self, column: &str) -> u16 {
        self.column_widths
            .get(column)
            .copied()
            .or_else(|| self.bounds.get(column).map(|b| b.width))
            .unwrap_or(DEFAULT_WIDTH)
    }

    /// Widths of all columns in display order.
    pub fn widths(&self) -> Vec<u16> {
        self.order.iter().map(|id| self.width(id)).collect()
    }

    pub fn width_map(&self) -> BTreeMap<String, u16> {
        self.order
            .iter()
            .map(|id| (id.clone(), self.width(id)))
            .collect()
    }

    pub fn default_width_map(&self) -> BTreeMap<String, u16> {
        self.order
            .iter()
            .map(|id| (id.clone(), self.bounds[id].width))
            .collect()
    }

    pub fn begin(&mut self, column: &str, x: u16) {
        if !self.bounds.contains_key(column) {
            warn!("Ignoring resize of unknown column \"{column}\"");
            return;
        }
        let start_width = self.width(column);
        debug!("Start resizing \"{column}\" at x {x}, width {start_width}");
        self.last_start = Some((x, start_width));
        self.state = ResizeState::Resizing {
            column: column.to_string(),
            start_x: x,
            start_width,
        };
    }

    /// Applies the pointer position to the column being resized.
    /// Returns the new width, `None` when idle.
    pub fn drag(&mut self, x: u16) -> Option<u16> {
        let ResizeState::Resizing {
            column,
            start_x,
            start_width,
        } = &self.state
        else {
            return None;
        };
        let delta = (x as i64 - *start_x as i64) * PIXELS_PER_CELL;
        let width = self.bounds[column].clamp(*start_width as i64 + delta);
        trace!("Drag \"{column}\" to x {x} => width {width}");
        self.column_widths.insert(column.clone(), width);
        Some(width)
    }

    pub fn end(&mut self) {
        if let ResizeState::Resizing { column, .. } = &self.state {
            debug!("Stop resizing \"{column}\" at width {}", self.width(column));
        }
        self.state = ResizeState::Idle;
    }

    pub fn resize_by(&mut self, column: &str, delta: i64) -> Option<u16> {
        let bounds = self.bounds.get(column)?;
        let width = bounds.clamp(self.width(column) as i64 + delta);
        self.column_widths.insert(column.to_string(), width);
        Some(width)
    }

    pub fn reset(&mut self) {
        debug!("Reset {} column width overrides", self.column_widths.len());
        self.column_widths.clear();
        self.state = ResizeState::Idle;
        self.last_start = None;
    }

    pub fn to_debug_json(&self) -> Result<String, serde_json::Error> {
        let (start_x, column_width) = self.last_start.unzip();
        serde_json::to_string_pretty(&StateDump {
            column_resizing: ColumnResizingDump {
                start_x,
                column_width,
                is_resizing_column: self.resizing_column(),
                column_widths: &self.column_widths,
            },
        })
    }
}

pub fn px_to_cells(px: u16) -> u16 {
    (px as i64 / PIXELS_PER_CELL).max(1) as u16
}

/// Index of the column whose right boundary is under `x`, given the
/// rendered column areas. The boundary is the last cell of the column plus
/// the spacing after it.
pub fn boundary_hit(areas: &[Rect], spacing: u16, x: u16) -> Option<usize> {
    let x = x as u32;
    areas.iter().position(|area| {
        let right = area.right() as u32;
        x + 1 >= right && x < right + spacing.max(1) as u32
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{default_schema, leaves};

    fn sizing() -> ColumnSizing {
        ColumnSizing::new(&leaves(&default_schema()))
    }

    #[test]
    fn defaults_and_overrides() {
        let s = sizing();
        assert_eq!(s.width("firstName"), 150);
        assert_eq!(s.width("age"), 50);
        assert_eq!(s.width("visits"), 60);
        assert_eq!(s.widths(), vec![150, 150, 50, 60, 150, 150]);
        assert_eq!(s.width_map(), s.default_width_map());
    }

    #[test]
    fn drag_cycle() {
        let mut s = sizing();
        assert_eq!(s.drag(30), None);
        s.begin("status", 20);
        assert_eq!(s.resizing_column(), Some("status"));
        assert_eq!(s.drag(23), Some(180));
        assert_eq!(s.drag(18), Some(130));
        s.end();
        assert_eq!(*s.state(), ResizeState::Idle);
        assert_eq!(s.width("status"), 130);
        assert_eq!(s.drag(40), None);
        assert_eq!(s.width("status"), 130);
    }

    #[test]
    fn unknown_column_stays_idle() {
        let mut s = sizing();
        s.begin("nope", 3);
        assert_eq!(*s.state(), ResizeState::Idle);
        assert_eq!(s.resize_by("nope", 10), None);
    }

    #[test]
    fn widths_are_clamped_for_any_delta() {
        let mut s = sizing();
        s.begin("age", 100);
        assert_eq!(s.drag(u16::MAX), Some(600));
        assert_eq!(s.drag(0), Some(40));
        s.end();
        assert_eq!(s.resize_by("visits", i64::MAX / 2), Some(600));
        assert_eq!(s.resize_by("visits", i64::MIN / 2), Some(40));
        assert_eq!(s.resize_by("lastName", -35), Some(115));
        for w in s.widths() {
            assert!((40..=600).contains(&w));
        }
    }

    #[test]
    fn reset_restores_defaults_from_any_state() {
        let mut s = sizing();
        s.resize_by("firstName", 73);
        s.resize_by("progress", -500);
        s.begin("lastName", 10);
        s.drag(90);
        assert_ne!(s.width_map(), s.default_width_map());
        s.reset();
        assert_eq!(*s.state(), ResizeState::Idle);
        assert_eq!(s.width_map(), s.default_width_map());
    }

    #[test]
    fn debug_json_mirrors_state() {
        let mut s = sizing();
        s.begin("age", 7);
        s.drag(9);
        let v: serde_json::Value = serde_json::from_str(&s.to_debug_json().unwrap()).unwrap();
        let r = &v["columnResizing"];
        assert_eq!(r["isResizingColumn"], "age");
        assert_eq!(r["startX"], 7);
        assert_eq!(r["columnWidth"], 50);
        assert_eq!(r["columnWidths"]["age"], 70);

        // the drag start stays visible once the pointer is released
        s.end();
        let v: serde_json::Value = serde_json::from_str(&s.to_debug_json().unwrap()).unwrap();
        let r = &v["columnResizing"];
        assert!(r["isResizingColumn"].is_null());
        assert_eq!(r["startX"], 7);
        assert_eq!(r["columnWidth"], 50);

        s.reset();
        let v: serde_json::Value = serde_json::from_str(&s.to_debug_json().unwrap()).unwrap();
        let r = &v["columnResizing"];
        assert!(r["isResizingColumn"].is_null());
        assert!(r["startX"].is_null());
        assert_eq!(r["columnWidths"], serde_json::json!({}));
    }

    #[test]
    fn pixel_to_cell_conversion() {
        assert_eq!(px_to_cells(150), 15);
        assert_eq!(px_to_cells(45), 4);
        assert_eq!(px_to_cells(5), 1);
    }

    #[test]
    fn boundary_hits() {
        // columns at [1,5) [6,11) with a spacer at 5 and 11
        let areas = [Rect::new(1, 0, 4, 1), Rect::new(6, 0, 5, 1)];
        assert_eq!(boundary_hit(&areas, 1, 3), None);
        assert_eq!(boundary_hit(&areas, 1, 4), Some(0));
        assert_eq!(boundary_hit(&areas, 1, 5), Some(0));
        assert_eq!(boundary_hit(&areas, 1, 6), None);
        assert_eq!(boundary_hit(&areas, 1, 10), Some(1));
        assert_eq!(boundary_hit(&areas, 1, 11), Some(1));
        assert_eq!(boundary_hit(&areas, 1, 12), None);
        assert_eq!(boundary_hit(&areas, 1, 0), None);
    }
}
