use ratatui::crossterm::event::KeyEvent;
use thiserror::Error;

pub const HELP_TEXT: &str = "\
Navigation
  j / Down        next row
  k / Up          previous row
  PgDn / PgUp     page down / up
  g / G           first / last row
  h / Left        previous column
  l / Right       next column

Columns
  > / +           grow selected column
  < / -           shrink selected column
  mouse drag      drag a header boundary to resize
  r               reset resizing

Search
  /               focus search box
  Enter           leave search box, keep query
  Esc             leave search box, clear query
  c               clear search

Other
  y               copy row to clipboard
  d               toggle debug panel
  ?               this help
  q               quit";

/// Width of one terminal cell in pixels.
pub const PIXELS_PER_CELL: i64 = 10;

#[derive(Debug, Error)]
pub enum TVError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not serialize state: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("logging setup failed: {0}")]
    Logging(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

#[derive(Debug, Clone)]
pub struct TVConfig {
    pub event_poll_time: u64,
    pub rows: usize,
    pub nested: usize,
    pub seed: Option<u64>,
    pub resize_step: u16,
    pub show_debug: bool,
    pub status_timeout: u64,
}

impl Default for TVConfig {
    fn default() -> Self {
        TVConfig {
            event_poll_time: 100,
            rows: 25,
            nested: 0,
            seed: None,
            resize_step: 10,
            show_debug: true,
            status_timeout: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    MoveLeft,
    MoveRight,
    Search,
    ClearSearch,
    ResetResizing,
    GrowColumn,
    ShrinkColumn,
    ToggleDebug,
    CopyRow,
    Help,
    Exit,
    Resize(u16, u16),
    PointerDown(u16, u16),
    PointerMove(u16, u16),
    PointerUp,
    RawKey(KeyEvent),
}
