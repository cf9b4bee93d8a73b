//! Console output interpretation - pure and testable.
//!
//! This crate turns the text a 7 Days to Die telnet console sends back into
//! typed values. It has no I/O and never fails: text it does not understand
//! degrades to defaults.
//!
//! # Module Structure
//!
//! - [`classify`]: separates engine log broadcasts from a command's reply body
//! - [`decode`]: roster, heap/FPS, entity and game-time decoders
//! - [`snapshot`]: assembles one [`ServerSnapshot`](types::ServerSnapshot) per poll tick
//!
//! # Example
//!
//! ```
//! use sdtd_monitor_core::{classify, decode_roster};
//!
//! let raw = "2025-12-10T10:35:08 1991.171 INF Executing command 'lp'\n\
//!            1. id=171, Bob, health=100, ping=12\n";
//! let classified = classify(raw);
//! assert_eq!(classified.logs().count(), 1);
//!
//! let players = decode_roster(&classified.body_text());
//! assert_eq!(players[0].name, "Bob");
//! assert_eq!(players[0].ping, 12);
//! ```

pub mod classify;
pub mod decode;
pub mod snapshot;

pub use sdtd_monitor_types as types;

pub use classify::{classify, classify_line, Classified, Line};
pub use decode::{
    decode_entities, decode_memory, decode_roster, decode_roster_with, decode_time, detect_dialect,
    RosterDialect, KEY_VALUE, STRICT,
};
pub use snapshot::{build_snapshot, PollReplies};
