//! In-game time decoding.

/// The first body line, trimmed. The clock format is opaque.
pub fn decode_time(body: &str) -> String {
    body.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default()
        .to_string()
}
