//! Single-worker command queue.
//!
//! The poller and the interactive console share one connection. Every command
//! goes through this queue, whose worker task is the only caller of
//! [`Session::send_command`], so replies never interleave.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::core::classify;
use crate::session::{CommandError, Session, Transport};
use crate::types::{LogEvent, RawOutput};

/// Default depth of the request channel.
pub const DEFAULT_QUEUE_CAPACITY: usize = 16;

/// Reply to an interactive command: the raw output plus its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub command: String,
    pub raw: RawOutput,
    pub logs: Vec<LogEvent>,
    pub body: Vec<String>,
}

struct Request {
    command: String,
    reply: oneshot::Sender<Result<RawOutput, CommandError>>,
}

/// Cloneable handle onto the command worker.
#[derive(Clone)]
pub struct CommandQueue {
    tx: mpsc::Sender<Request>,
}

impl CommandQueue {
    /// Spawn the worker on the current tokio runtime.
    ///
    /// The worker stops once every handle is dropped.
    pub fn spawn<S>(session: Arc<Session<S>>, capacity: usize) -> (Self, JoinHandle<()>)
    where
        S: Transport + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<Request>(capacity.max(1));
        let worker = tokio::spawn(async move {
            while let Some(req) = rx.recv().await {
                let result = session.send_command(&req.command).await;
                // Caller may have given up waiting.
                let _ = req.reply.send(result);
            }
            debug!("command worker stopped");
        });
        (Self { tx }, worker)
    }

    /// Queue `command` and wait for its raw output.
    pub async fn execute(&self, command: impl Into<String>) -> Result<RawOutput, CommandError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request {
                command: command.into(),
                reply,
            })
            .await
            .map_err(|_| CommandError::Closed)?;
        rx.await.map_err(|_| CommandError::Closed)?
    }

    /// Queue `command` and split its output into log lines and reply body.
    pub async fn run(&self, command: impl Into<String>) -> Result<CommandReply, CommandError> {
        let command = command.into();
        let raw = self.execute(command.clone()).await?;
        let (logs, body) = classify(raw.as_str()).into_parts();
        Ok(CommandReply {
            command,
            raw,
            logs,
            body,
        })
    }
}
