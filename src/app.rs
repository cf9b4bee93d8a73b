//! Dashboard application state.
//!
//! Owns everything the view shows and folds [`MonitorEvent`]s and key actions
//! into it. No I/O happens here.

use std::collections::VecDeque;

use crate::adapter::{CommandReply, MonitorEvent};
use crate::input::{DashboardAction, LineEditor};
use crate::term::{DashboardFrame, LogLine, Tone};
use crate::types::{Focus, ServerSnapshot, SessionState, LOG_HISTORY_LINES};

pub struct App {
    snapshot: ServerSnapshot,
    session: SessionState,
    log: VecDeque<LogLine>,
    log_capacity: usize,
    focus: Focus,
    selected: Option<usize>,
    editor: LineEditor,
    status: String,
}

impl App {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self::with_log_capacity(host, port, LOG_HISTORY_LINES)
    }

    pub fn with_log_capacity(host: impl Into<String>, port: u16, log_capacity: usize) -> Self {
        Self {
            snapshot: ServerSnapshot {
                host: host.into(),
                port,
                ..ServerSnapshot::default()
            },
            session: SessionState::Disconnected,
            log: VecDeque::with_capacity(log_capacity.min(LOG_HISTORY_LINES)),
            log_capacity: log_capacity.max(1),
            focus: Focus::Console,
            selected: None,
            editor: LineEditor::new(),
            status: String::new(),
        }
    }

    pub fn snapshot(&self) -> &ServerSnapshot {
        &self.snapshot
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn log(&self) -> &VecDeque<LogLine> {
        &self.log
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn console(&self) -> &str {
        self.editor.as_str()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn frame(&self) -> DashboardFrame<'_> {
        DashboardFrame {
            snapshot: &self.snapshot,
            session: self.session,
            log: &self.log,
            focus: self.focus,
            selected: self.selected,
            console: self.editor.as_str(),
            status: &self.status,
        }
    }

    fn push_log(&mut self, line: LogLine) {
        while self.log.len() >= self.log_capacity {
            self.log.pop_front();
        }
        self.log.push_back(line);
    }

    fn push_reply(&mut self, reply: CommandReply) {
        self.push_log(LogLine::echo(&reply.command));
        for ev in &reply.logs {
            self.push_log(LogLine::from_event(ev));
        }
        for line in reply.body {
            self.push_log(LogLine::new(line, Tone::Normal));
        }
    }

    /// Fold one monitor event into the state.
    pub fn apply_event(&mut self, event: MonitorEvent) {
        match event {
            MonitorEvent::Snapshot(snapshot) => {
                self.snapshot = snapshot;
                let count = self.snapshot.players.len();
                self.selected = match (self.selected, count) {
                    (_, 0) => None,
                    (Some(i), n) => Some(i.min(n - 1)),
                    (None, _) => None,
                };
            }
            // Polled output only surfaces lines an operator cares about.
            MonitorEvent::Log(ev) => {
                if ev.is_notable() {
                    self.push_log(LogLine::from_event(&ev));
                }
            }
            MonitorEvent::Reply(reply) => self.push_reply(reply),
            MonitorEvent::CommandFailed { command, error } => {
                self.push_log(LogLine::echo(&command));
                self.push_log(LogLine::failure(&error));
            }
            MonitorEvent::SessionState(state) => {
                self.session = state;
                if state == SessionState::Closed {
                    self.status = "Connection closed".to_string();
                }
            }
        }
    }

    /// Apply a key action. Returns a command to submit, if any.
    pub fn apply_action(&mut self, action: DashboardAction) -> Option<String> {
        match action {
            DashboardAction::ToggleFocus => {
                self.focus = self.focus.toggle();
                if self.focus == Focus::Players && self.selected.is_none() {
                    self.selected = (!self.snapshot.players.is_empty()).then_some(0);
                }
            }
            DashboardAction::SelectPrev => {
                if let Some(i) = self.selected {
                    self.selected = Some(i.saturating_sub(1));
                }
            }
            DashboardAction::SelectNext => {
                let count = self.snapshot.players.len();
                self.selected = match self.selected {
                    Some(i) if i + 1 < count => Some(i + 1),
                    None if count > 0 => Some(0),
                    other => other,
                };
            }
            DashboardAction::Prefill(kind) => {
                let id = self
                    .selected
                    .and_then(|i| self.snapshot.players.get(i))
                    .map(|p| p.id.clone());
                if let Some(id) = id {
                    self.editor.set(kind.command_for(&id));
                    self.focus = Focus::Console;
                }
            }
            DashboardAction::Insert(c) => self.editor.insert(c),
            DashboardAction::Backspace => self.editor.backspace(),
            DashboardAction::Submit => {
                let command = self.editor.take()?;
                if self.session == SessionState::Closed {
                    self.push_log(LogLine::echo(&command));
                    self.push_log(LogLine::failure("connection closed"));
                    return None;
                }
                return Some(command);
            }
        }
        None
    }
}
