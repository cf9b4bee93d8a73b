//! Monitor runtime integration.
//!
//! Bridges the synchronous dashboard loop with the async session, command
//! queue and poller.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::MonitorConfig;
use crate::poller::{PollReport, Poller};
use crate::queue::{CommandQueue, CommandReply};
use crate::session::Session;
use crate::types::{LogEvent, ServerSnapshot, SessionState};

const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Event delivered to the dashboard loop.
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    Snapshot(ServerSnapshot),
    Log(LogEvent),
    Reply(CommandReply),
    CommandFailed { command: String, error: String },
    SessionState(SessionState),
}

/// Running monitor instance.
pub struct Monitor {
    rt: Runtime,
    session: Arc<Session>,
    queue: CommandQueue,
    events_tx: mpsc::UnboundedSender<MonitorEvent>,
    events_rx: mpsc::UnboundedReceiver<MonitorEvent>,
}

impl Monitor {
    /// Connect, authenticate and start polling.
    ///
    /// Blocks until the session is ready or the connect fails.
    pub fn start(config: &MonitorConfig) -> Result<Self> {
        let rt = Runtime::new().context("failed to create tokio runtime")?;
        let session = Arc::new(Session::new(config.session_config()));

        rt.block_on(session.connect())
            .with_context(|| format!("could not connect to {}", session.config().address()))?;
        info!(address = %session.config().address(), "session ready");

        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let queue = {
            let _guard = rt.enter();
            let (queue, _worker) = CommandQueue::spawn(Arc::clone(&session), config.queue_capacity);
            queue
        };

        let poller = Poller::new(
            queue.clone(),
            config.host.clone(),
            config.port,
            config.poll_interval,
        );
        rt.spawn(poller.run(events_tx.clone(), session.subscribe_state()));

        let _ = events_tx.send(MonitorEvent::SessionState(session.state()));

        Ok(Self {
            rt,
            session,
            queue,
            events_tx,
            events_rx,
        })
    }

    pub fn try_recv(&mut self) -> Option<MonitorEvent> {
        self.events_rx.try_recv().ok()
    }

    /// Queue an operator command. The reply arrives later as an event.
    ///
    /// Blank input is ignored.
    pub fn submit(&self, command: &str) {
        let command = command.trim().to_string();
        if command.is_empty() {
            return;
        }

        let queue = self.queue.clone();
        let events = self.events_tx.clone();
        self.rt.spawn(async move {
            let event = match queue.run(command.clone()).await {
                Ok(reply) => MonitorEvent::Reply(reply),
                Err(e) => {
                    warn!(%command, error = %e, "operator command failed");
                    MonitorEvent::CommandFailed {
                        command,
                        error: e.to_string(),
                    }
                }
            };
            let _ = events.send(event);
        });
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn host(&self) -> &str {
        &self.session.config().host
    }

    pub fn port(&self) -> u16 {
        self.session.config().port
    }

    /// Close the session and stop every background task.
    pub fn shutdown(self) {
        let Monitor { rt, session, .. } = self;
        rt.block_on(session.close());
        rt.shutdown_timeout(SHUTDOWN_GRACE);
        info!("monitor stopped");
    }
}

/// Connect, run a single poll tick and close.
pub fn probe(config: &MonitorConfig) -> Result<PollReport> {
    let rt = Runtime::new().context("failed to create tokio runtime")?;
    rt.block_on(async {
        let session = Arc::new(Session::new(config.session_config()));
        session
            .connect()
            .await
            .with_context(|| format!("could not connect to {}", session.config().address()))?;

        let (queue, worker) = CommandQueue::spawn(Arc::clone(&session), config.queue_capacity);
        let poller = Poller::new(queue, config.host.clone(), config.port, config.poll_interval);
        let report = poller.poll_once().await;

        drop(poller);
        let _ = worker.await;
        session.close().await;
        Ok(report)
    })
}
