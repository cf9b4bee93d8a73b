//! Heap/FPS report decoding.
//!
//! The `mem` reply has no fixed layout: some builds print one dense line
//! (`Time: 32.55m FPS: 14.07 Heap: 1234.5MB Max: 2345.6MB ...`), others spread
//! the figures over several lines. Each figure is located by its own label,
//! independently of the others, so field order does not matter.

use std::sync::OnceLock;

use regex_lite::Regex;

use crate::types::MemoryReport;

fn heap_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\bHeap:[ \t]*(\d+(?:\.\d+)?[ \t]*[A-Za-z]+)").expect("heap pattern is valid")
    })
}

fn max_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\bMax:[ \t]*(\d+(?:\.\d+)?[ \t]*[A-Za-z]+)").expect("max pattern is valid")
    })
}

fn fps_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bFPS:[ \t]*(\d+(?:\.\d+)?)").expect("fps pattern is valid"))
}

fn first_capture(re: &Regex, text: &str) -> String {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Extract heap used, heap max and FPS. Missing figures stay empty.
pub fn decode_memory(body: &str) -> MemoryReport {
    MemoryReport {
        heap_used: first_capture(heap_pattern(), body),
        heap_max: first_capture(max_pattern(), body),
        fps: first_capture(fps_pattern(), body),
    }
}
