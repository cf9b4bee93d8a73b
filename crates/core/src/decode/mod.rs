//! Field decoders for the polled console commands.
//!
//! Each decoder takes the reply body of one command (after
//! [`classify`](crate::classify)) and produces a typed value. None of them can
//! fail: malformed or unexpected text degrades to defaults, since the console
//! offers no schema and its output drifts between server versions.

pub mod entities;
pub mod memory;
pub mod roster;
pub mod time;

pub use entities::decode_entities;
pub use memory::decode_memory;
pub use roster::{
    decode_roster, decode_roster_with, detect_dialect, KeyValueDialect, RosterDialect,
    StrictDialect, KEY_VALUE, STRICT,
};
pub use time::decode_time;
