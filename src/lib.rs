//! 7 Days to Die console monitor (workspace facade crate).
//!
//! The implementation lives in dedicated crates under `crates/`; this package
//! re-exports them as `sdtd_monitor::{adapter,core,input,term,types}` and adds
//! the dashboard application state in [`app`].

pub mod app;

pub use sdtd_monitor_adapter as adapter;
pub use sdtd_monitor_core as core;
pub use sdtd_monitor_input as input;
pub use sdtd_monitor_term as term;
pub use sdtd_monitor_types as types;

pub use app::App;
