//! Shared data model for the 7 Days to Die console monitor.
//!
//! Everything here is plain data: the typed values the decoders produce, the
//! snapshot handed to the presentation layer, and the constants that describe
//! the remote console (prompts, command vocabulary, default timings).
//!
//! # Console protocol constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `PASSWORD_PROMPT` | `password:` | Substring that ends the server's greeting |
//! | `LOGON_SUCCESS` | `Logon successful` | Substring that confirms authentication |
//! | `LINE_TERMINATOR` | `\r\n` | Appended to the password and every command |
//!
//! # Timing defaults
//!
//! All values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `POLL_INTERVAL_MS` | 2000 | Poll tick interval |
//! | `CONNECT_TIMEOUT_MS` | 5000 | TCP dial timeout |
//! | `HANDSHAKE_TIMEOUT_MS` | 10000 | Bound on the whole password exchange |
//! | `FIRST_READ_TIMEOUT_MS` | 2000 | Wait for the first chunk of a reply |
//! | `DRAIN_IDLE_MS` | 200 | Silence that ends a reply |
//! | `MAX_RESPONSE_MS` | 10000 | Hard cap on one reply's drain |
//!
//! # Examples
//!
//! ```
//! use sdtd_monitor_types::{ConsoleCommand, Player, POLL_SEQUENCE};
//!
//! assert_eq!(ConsoleCommand::Roster.as_str(), "lp");
//! assert_eq!(POLL_SEQUENCE.len(), 4);
//!
//! let players = vec![
//!     Player { id: "171".into(), name: "Survivor".into(), ping: 20, ..Player::default() },
//!     Player { id: "172".into(), name: "Slayer".into(), ping: 41, ..Player::default() },
//! ];
//! assert_eq!(sdtd_monitor_types::average_ping(&players), 30);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default server host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default telnet port of a dedicated server.
pub const DEFAULT_PORT: u16 = 8081;

/// Prompt substring the server sends before it accepts a password.
pub const PASSWORD_PROMPT: &str = "password:";

/// Substring the server sends once the password was accepted.
pub const LOGON_SUCCESS: &str = "Logon successful";

/// Terminator for everything written to the console.
pub const LINE_TERMINATOR: &str = "\r\n";

pub const POLL_INTERVAL_MS: u64 = 2000;
pub const CONNECT_TIMEOUT_MS: u64 = 5000;
pub const HANDSHAKE_TIMEOUT_MS: u64 = 10_000;
pub const FIRST_READ_TIMEOUT_MS: u64 = 2000;
pub const DRAIN_IDLE_MS: u64 = 200;
pub const MAX_RESPONSE_MS: u64 = 10_000;

/// Number of log lines the dashboard keeps.
pub const LOG_HISTORY_LINES: usize = 1000;

/// The informational commands issued every poll tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConsoleCommand {
    /// In-game clock (`gettime`).
    Time,
    /// Heap and FPS report (`mem`).
    Memory,
    /// Connected player roster (`lp`).
    Roster,
    /// Entity listing (`le`).
    Entities,
}

impl ConsoleCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsoleCommand::Time => "gettime",
            ConsoleCommand::Memory => "mem",
            ConsoleCommand::Roster => "lp",
            ConsoleCommand::Entities => "le",
        }
    }
}

impl fmt::Display for ConsoleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order in which one poll tick issues its commands.
pub const POLL_SEQUENCE: [ConsoleCommand; 4] = [
    ConsoleCommand::Time,
    ConsoleCommand::Memory,
    ConsoleCommand::Roster,
    ConsoleCommand::Entities,
];

/// Lifecycle of the single console connection.
///
/// `Disconnected → Authenticating → Ready → Closed`. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    Disconnected,
    Authenticating,
    Ready,
    Closed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Authenticating => "authenticating",
            SessionState::Ready => "ready",
            SessionState::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the console sent back for one command, in arrival order.
///
/// Opaque until it goes through the line classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawOutput(String);

impl RawOutput {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for RawOutput {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for RawOutput {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One connected player, decoded fresh every poll.
///
/// Numeric stats default to 0 when the console omitted them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    /// Server-assigned entity id. Not guaranteed numeric.
    pub id: String,
    /// Display name. Never empty for a decoded player.
    pub name: String,
    pub level: i32,
    pub health: i32,
    pub deaths: i32,
    pub zombie_kills: i32,
    pub player_kills: i32,
    pub score: i32,
    pub ping: i32,
    pub steam_id: String,
    pub ip: String,
}

/// Integer mean ping over `players`, 0 for an empty roster.
pub fn average_ping(players: &[Player]) -> i32 {
    if players.is_empty() {
        return 0;
    }
    let total: i64 = players.iter().map(|p| p.ping as i64).sum();
    (total / players.len() as i64) as i32
}

/// Heap and FPS figures, kept as display strings.
///
/// The console's units drift between builds (`MB`, `MiB`, with or without a
/// space), so nothing here is normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryReport {
    pub heap_used: String,
    pub heap_max: String,
    pub fps: String,
}

/// Aggregate entity counts from the entity listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCounts {
    pub zombies: u32,
    pub animals: u32,
    pub other: u32,
}

/// Consolidated server statistics for one poll tick.
///
/// Rebuilt wholesale every tick; the four underlying replies are only
/// consistent with each other to within one command round-trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSnapshot {
    pub host: String,
    pub port: u16,
    pub game_time: String,
    pub fps: String,
    pub heap_used: String,
    pub heap_max: String,
    pub player_count: usize,
    pub entities: EntityCounts,
    pub average_ping: i32,
    pub players: Vec<Player>,
}

/// Severity tag of an engine log line (`INF`, `WRN`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Exception,
    /// Any other uppercase tag, kept verbatim.
    Other(String),
}

impl Severity {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "INF" => Severity::Info,
            "WRN" => Severity::Warning,
            "ERR" => Severity::Error,
            "EXC" => Severity::Exception,
            other => Severity::Other(other.to_string()),
        }
    }

    pub fn is_problem(&self) -> bool {
        matches!(
            self,
            Severity::Warning | Severity::Error | Severity::Exception
        )
    }
}

/// Phrases that make a log line worth showing to an operator.
const NOTABLE_PHRASES: [&str; 5] = [
    "Chat",
    "PlayerConnected",
    "PlayerDisconnected",
    "Kicked",
    "Banned",
];

/// One asynchronous engine log line, forwarded once to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub line: String,
    /// Present when the line carried the timestamp/uptime/tag prefix.
    pub severity: Option<Severity>,
}

impl LogEvent {
    pub fn new(line: impl Into<String>, severity: Option<Severity>) -> Self {
        Self {
            line: line.into(),
            severity,
        }
    }

    /// Chat, joins/leaves, kicks, bans, warnings and errors.
    pub fn is_notable(&self) -> bool {
        if self.severity.as_ref().is_some_and(Severity::is_problem) {
            return true;
        }
        NOTABLE_PHRASES.iter().any(|p| self.line.contains(p))
    }

    pub fn is_chat(&self) -> bool {
        self.line.contains("Chat")
    }
}

/// Dashboard pane that receives keyboard input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Focus {
    #[default]
    Console,
    Players,
}

impl Focus {
    pub fn toggle(self) -> Self {
        match self {
            Focus::Console => Focus::Players,
            Focus::Players => Focus::Console,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_sequence_order() {
        let names: Vec<&str> = POLL_SEQUENCE.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, vec!["gettime", "mem", "lp", "le"]);
    }

    #[test]
    fn average_ping_truncates() {
        let players = vec![
            Player {
                ping: 24,
                ..Player::default()
            },
            Player {
                ping: 45,
                ..Player::default()
            },
            Player {
                ping: 120,
                ..Player::default()
            },
        ];
        assert_eq!(average_ping(&players), 63);
        assert_eq!(average_ping(&[]), 0);
    }

    #[test]
    fn severity_tags() {
        assert_eq!(Severity::from_tag("INF"), Severity::Info);
        assert_eq!(Severity::from_tag("WRN"), Severity::Warning);
        assert_eq!(Severity::from_tag("LOG"), Severity::Other("LOG".into()));
        assert!(Severity::Error.is_problem());
        assert!(!Severity::Info.is_problem());
    }

    #[test]
    fn notable_log_lines() {
        let chat = LogEvent::new(
            "2025-12-10T10:35:08 1991.171 INF Chat (from 'Steam_1', entity id '171'): 'Bob': hi",
            Some(Severity::Info),
        );
        assert!(chat.is_notable());
        assert!(chat.is_chat());

        let warn = LogEvent::new("2025-12-10T10:35:08 1.0 WRN disk slow", Some(Severity::Warning));
        assert!(warn.is_notable());

        let exec = LogEvent::new(
            "2025-12-10T10:35:08 1991.171 INF Executing command 'mem' by Telnet",
            Some(Severity::Info),
        );
        assert!(!exec.is_notable());
    }

    #[test]
    fn snapshot_serializes_with_snake_case_fields() {
        let snap = ServerSnapshot {
            host: "localhost".into(),
            port: 8081,
            ..ServerSnapshot::default()
        };
        let v = serde_json::to_value(&snap).unwrap();
        assert_eq!(v["host"], "localhost");
        assert_eq!(v["port"], 8081);
        assert_eq!(v["entities"]["zombies"], 0);
        assert!(v["players"].as_array().unwrap().is_empty());
    }

    #[test]
    fn session_state_display() {
        assert_eq!(SessionState::Ready.to_string(), "ready");
        assert_eq!(SessionState::Closed.to_string(), "closed");
    }

    #[test]
    fn focus_toggles_between_panes() {
        assert_eq!(Focus::default(), Focus::Console);
        assert_eq!(Focus::Console.toggle(), Focus::Players);
        assert_eq!(Focus::Players.toggle().toggle(), Focus::Players);
    }
}
