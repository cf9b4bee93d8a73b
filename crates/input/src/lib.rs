//! Terminal input for the dashboard.
//!
//! Maps `crossterm` key events to [`DashboardAction`]s depending on which pane
//! has focus, and holds the console prompt's [`LineEditor`].

pub mod editor;
pub mod map;

pub use sdtd_monitor_types as types;

pub use editor::LineEditor;
pub use map::{handle_key_event, should_quit, DashboardAction, Prefill};
