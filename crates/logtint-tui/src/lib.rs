//! Viewers for classified log lines
//!
//! [`AnsiPrinter`] writes colored lines to any writer; [`TerminalViewer`]
//! is the interactive full-screen viewer.

pub mod app;
pub mod config;
pub mod style;
mod terminal_viewer;
pub mod tui;
pub mod ui;
pub mod viewer;

pub use app::{Action, AppState};
pub use config::{KeyBindings, KeyContext};
pub use style::{parse_color, StyleTable};
pub use terminal_viewer::TerminalViewer;
pub use tui::{Event, EventHandler};
pub use viewer::{AnsiPrinter, ViewerAdapter};
