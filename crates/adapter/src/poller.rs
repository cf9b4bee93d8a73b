//! Fixed-interval poller.
//!
//! Each tick issues the four informational commands one after another through
//! the [`CommandQueue`], classifies and decodes the replies, and publishes one
//! consolidated snapshot. A failed command only blanks its part of that tick's
//! snapshot; the next tick tries again.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::core::{build_snapshot, classify, PollReplies};
use crate::queue::CommandQueue;
use crate::runtime::MonitorEvent;
use crate::types::{ConsoleCommand, LogEvent, ServerSnapshot, SessionState, POLL_SEQUENCE};

/// A poll command that did not produce output this tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollFailure {
    pub command: ConsoleCommand,
    pub error: String,
}

/// Everything one tick produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PollReport {
    pub snapshot: ServerSnapshot,
    /// Engine log lines seen in any of the four replies, in arrival order.
    pub logs: Vec<LogEvent>,
    pub failures: Vec<PollFailure>,
}

pub struct Poller {
    queue: CommandQueue,
    host: String,
    port: u16,
    interval: Duration,
}

impl Poller {
    pub fn new(queue: CommandQueue, host: impl Into<String>, port: u16, interval: Duration) -> Self {
        Self {
            queue,
            host: host.into(),
            port,
            interval,
        }
    }

    /// Run one tick's commands and build its snapshot.
    pub async fn poll_once(&self) -> PollReport {
        let mut replies = PollReplies::default();
        let mut logs = Vec::new();
        let mut failures = Vec::new();

        for command in POLL_SEQUENCE {
            match self.queue.execute(command.as_str()).await {
                Ok(raw) => {
                    let (mut seen, body) = classify(raw.as_str()).into_parts();
                    logs.append(&mut seen);
                    replies.set(command, body.join("\n"));
                }
                Err(e) => {
                    warn!(%command, error = %e, "poll command failed");
                    failures.push(PollFailure {
                        command,
                        error: e.to_string(),
                    });
                }
            }
        }

        let snapshot = build_snapshot(&self.host, self.port, &replies);
        debug!(
            players = snapshot.player_count,
            logs = logs.len(),
            failures = failures.len(),
            "poll tick complete"
        );
        PollReport {
            snapshot,
            logs,
            failures,
        }
    }

    /// Tick until the session closes or the event receiver goes away.
    ///
    /// Publishing never blocks: events go through an unbounded channel.
    pub async fn run(
        self,
        events: mpsc::UnboundedSender<MonitorEvent>,
        mut state: watch::Receiver<SessionState>,
    ) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = state.wait_for(|s| *s == SessionState::Closed) => break,
                _ = ticker.tick() => {}
            }

            let report = self.poll_once().await;
            if *state.borrow() == SessionState::Closed {
                break;
            }

            for log in report.logs {
                if events.send(MonitorEvent::Log(log)).is_err() {
                    return;
                }
            }
            if events.send(MonitorEvent::Snapshot(report.snapshot)).is_err() {
                return;
            }
        }

        info!("poller stopped, session closed");
        let _ = events.send(MonitorEvent::SessionState(SessionState::Closed));
    }
}
