//! Terminal dashboard rendering.
//!
//! Renders into a plain framebuffer that is diffed against the previous frame
//! and flushed through crossterm. No widget toolkit is involved, so the view
//! stays pure and unit-testable.

pub mod dashboard_view;
pub mod fb;
pub mod renderer;

pub use sdtd_monitor_types as types;

pub use dashboard_view::{DashboardFrame, DashboardView, LogLine, Tone, Viewport};
pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
