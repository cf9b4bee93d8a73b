//! Line classifier - splits console output into engine log lines and reply body.
//!
//! The console interleaves asynchronous log broadcasts (chat, joins, the echo
//! of the command being executed) with the literal reply to the command that
//! was just sent. A line is a log line when it has the engine's log shape:
//!
//! ```text
//! 2025-12-10T10:35:08 1991.171 INF Executing command 'lp' by Telnet from 127.0.0.1:5431
//! ^ wall clock        ^ uptime ^ severity tag
//! ```
//!
//! or when it contains one of a few phrases only the logger produces. Every
//! other non-blank line is reply body; blank lines are dropped. Classification
//! is total and keeps the original relative order of both sequences.

use std::sync::OnceLock;

use regex_lite::Regex;

use crate::types::{LogEvent, Severity};

/// Phrases that mark a line as a log broadcast even without the log prefix.
const KNOWN_LOG_PHRASES: [&str; 2] = ["Executing command", "Telnet connection"];

fn log_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\S*\s+\d+(?:\.\d+)?\s+([A-Z]{3,4})\b")
            .expect("log shape pattern is valid")
    })
}

/// A single non-blank line after classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Log(LogEvent),
    Body(String),
}

impl Line {
    /// The line's text as it appeared in the stream (minus the line break).
    pub fn text(&self) -> &str {
        match self {
            Line::Log(ev) => &ev.line,
            Line::Body(s) => s,
        }
    }

    pub fn is_log(&self) -> bool {
        matches!(self, Line::Log(_))
    }
}

/// Output of [`classify`]: every non-blank input line, tagged, in stream order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classified {
    lines: Vec<Line>,
}

impl Classified {
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn logs(&self) -> impl Iterator<Item = &LogEvent> {
        self.lines.iter().filter_map(|l| match l {
            Line::Log(ev) => Some(ev),
            Line::Body(_) => None,
        })
    }

    pub fn body(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|l| match l {
            Line::Body(s) => Some(s.as_str()),
            Line::Log(_) => None,
        })
    }

    /// Reply body joined with `\n`, ready for a field decoder.
    pub fn body_text(&self) -> String {
        self.body().collect::<Vec<_>>().join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_parts(self) -> (Vec<LogEvent>, Vec<String>) {
        let mut logs = Vec::new();
        let mut body = Vec::new();
        for line in self.lines {
            match line {
                Line::Log(ev) => logs.push(ev),
                Line::Body(s) => body.push(s),
            }
        }
        (logs, body)
    }
}

/// Classify one line. Returns `None` for blank lines.
pub fn classify_line(line: &str) -> Option<Line> {
    let line = line.trim_end_matches('\r');
    if line.trim().is_empty() {
        return None;
    }

    if let Some(caps) = log_shape().captures(line) {
        let severity = caps.get(1).map(|m| Severity::from_tag(m.as_str()));
        return Some(Line::Log(LogEvent::new(line, severity)));
    }

    if KNOWN_LOG_PHRASES.iter().any(|p| line.contains(p)) {
        return Some(Line::Log(LogEvent::new(line, None)));
    }

    Some(Line::Body(line.to_string()))
}

/// Partition raw console output into log lines and reply body.
pub fn classify(raw: &str) -> Classified {
    Classified {
        lines: raw.lines().filter_map(classify_line).collect(),
    }
}
