//! Console session - one authenticated telnet connection.
//!
//! The console has no framing: no length prefix, no terminator, no
//! correlation id. A reply is captured with an adaptive drain:
//!
//! 1. One read bounded by `first_read`. Silence here means the command
//!    produced no output and yields an empty reply, not an error.
//! 2. Then repeated reads bounded by the short `drain_idle` gap, appending
//!    every chunk, until a read times out. That silence ends the reply.
//!
//! A server that pauses mid-reply for longer than `drain_idle` will have its
//! reply cut short; the remainder shows up at the head of the next reply.
//! `max_response` caps a single drain so a chatty server cannot hold the
//! session forever.
//!
//! Only one command may be in flight. A second concurrent call is refused with
//! [`CommandError::AlreadyInFlight`]; callers serialize through
//! [`CommandQueue`](crate::queue::CommandQueue).

use std::fmt;
use std::io;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::types::{
    RawOutput, SessionState, CONNECT_TIMEOUT_MS, DRAIN_IDLE_MS, FIRST_READ_TIMEOUT_MS,
    HANDSHAKE_TIMEOUT_MS, LINE_TERMINATOR, LOGON_SUCCESS, MAX_RESPONSE_MS, PASSWORD_PROMPT,
};

/// The server repeats its prompt with this prefix after a wrong password.
const PASSWORD_REJECTED: &str = "Password incorrect";

const READ_CHUNK: usize = 4096;

/// Byte stream a session can run over.
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Transport for T {}

/// Timeouts used by the handshake and the adaptive drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub connect: Duration,
    pub handshake: Duration,
    pub first_read: Duration,
    pub drain_idle: Duration,
    pub max_response: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            connect: Duration::from_millis(CONNECT_TIMEOUT_MS),
            handshake: Duration::from_millis(HANDSHAKE_TIMEOUT_MS),
            first_read: Duration::from_millis(FIRST_READ_TIMEOUT_MS),
            drain_idle: Duration::from_millis(DRAIN_IDLE_MS),
            max_response: Duration::from_millis(MAX_RESPONSE_MS),
        }
    }
}

/// Where to connect and how to authenticate.
#[derive(Clone)]
pub struct SessionConfig {
    pub host: String,
    pub port: u16,
    /// Sent verbatim; an empty password is allowed.
    pub password: String,
    pub timings: Timings,
}

impl SessionConfig {
    pub fn new(host: impl Into<String>, port: u16, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            password: password.into(),
            timings: Timings::default(),
        }
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    /// `host:port`, bracketing IPv6 literals.
    pub fn address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &"<redacted>")
            .field("timings", &self.timings)
            .finish()
    }
}

/// Failure to bring a session to `Ready`.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("cannot reach {addr}: {source}")]
    Unreachable {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("timed out dialing {addr} after {after:?}")]
    Timeout { addr: String, after: Duration },
    #[error("authentication failed: {reason}")]
    AuthenticationFailed { reason: String },
    #[error("session is {0}, expected disconnected")]
    InvalidState(SessionState),
}

/// Failure of a single command execution.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),
    #[error("a command is already in flight")]
    AlreadyInFlight,
    #[error("session is {0}")]
    NotReady(SessionState),
    #[error("session closed")]
    Closed,
}

/// Result of one bounded read.
enum Chunk {
    Data(usize),
    Eof,
    Silent,
    Closed,
    Failed(io::Error),
}

async fn read_chunk<S: Transport>(
    stream: &mut S,
    buf: &mut [u8],
    limit: Duration,
    state: &mut watch::Receiver<SessionState>,
) -> Chunk {
    tokio::select! {
        biased;
        _ = state.wait_for(|s| *s == SessionState::Closed) => Chunk::Closed,
        res = tokio::time::timeout(limit, stream.read(buf)) => match res {
            Err(_) => Chunk::Silent,
            Ok(Ok(0)) => Chunk::Eof,
            Ok(Ok(n)) => Chunk::Data(n),
            Ok(Err(e)) => Chunk::Failed(e),
        },
    }
}

/// Write one line, giving up when the session closes or the peer stops
/// reading for longer than `limit`.
async fn write_line<S: Transport>(
    stream: &mut S,
    line: &[u8],
    limit: Duration,
    state: &mut watch::Receiver<SessionState>,
) -> Result<(), CommandError> {
    let write = async {
        stream.write_all(line).await?;
        stream.flush().await
    };
    tokio::select! {
        biased;
        _ = state.wait_for(|s| *s == SessionState::Closed) => Err(CommandError::Closed),
        res = tokio::time::timeout(limit, write) => match res {
            Ok(written) => written.map_err(CommandError::Transport),
            Err(_) => Err(CommandError::Transport(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("console write stalled for {limit:?}"),
            ))),
        },
    }
}

/// Read until `needle` shows up in everything received so far.
async fn read_until<S: Transport>(
    stream: &mut S,
    needle: &str,
    limit: Duration,
    state: &mut watch::Receiver<SessionState>,
) -> Result<String, String> {
    let mut received: Vec<u8> = Vec::new();
    let mut buf = [0u8; READ_CHUNK];
    loop {
        match read_chunk(stream, &mut buf, limit, state).await {
            Chunk::Data(n) => {
                received.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&received);
                if text.contains(needle) {
                    return Ok(text.into_owned());
                }
                if needle == LOGON_SUCCESS && text.contains(PASSWORD_REJECTED) {
                    return Err("password rejected".to_string());
                }
            }
            Chunk::Eof => return Err(format!("connection closed while waiting for {needle:?}")),
            Chunk::Silent => return Err(format!("timed out waiting for {needle:?}")),
            Chunk::Closed => return Err("session closed".to_string()),
            Chunk::Failed(e) => return Err(format!("read failed while waiting for {needle:?}: {e}")),
        }
    }
}

/// One console connection with a four-state lifecycle.
///
/// `Closed` is terminal: a dropped or rejected connection never becomes
/// `Ready` again. Reconnecting means building a new session.
pub struct Session<S = TcpStream> {
    config: SessionConfig,
    state: watch::Sender<SessionState>,
    stream: Mutex<Option<S>>,
}

impl<S: Transport> Session<S> {
    pub fn new(config: SessionConfig) -> Self {
        let (state, _) = watch::channel(SessionState::Disconnected);
        Self {
            config,
            state,
            stream: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Watch lifecycle changes.
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    fn set_state(&self, next: SessionState) {
        self.state.send_if_modified(|s| {
            if *s == SessionState::Closed || *s == next {
                return false;
            }
            *s = next;
            true
        });
    }

    fn begin_authentication(&self) -> Result<(), ConnectError> {
        let mut current = SessionState::Disconnected;
        let started = self.state.send_if_modified(|s| {
            current = *s;
            if *s != SessionState::Disconnected {
                return false;
            }
            *s = SessionState::Authenticating;
            true
        });
        if started {
            Ok(())
        } else {
            Err(ConnectError::InvalidState(current))
        }
    }

    /// Authenticate over an already-open stream and become `Ready`.
    pub async fn attach(&self, mut stream: S) -> Result<(), ConnectError> {
        self.begin_authentication()?;
        let mut state = self.state.subscribe();
        let limit = self.config.timings.handshake;

        let outcome =
            tokio::time::timeout(limit, self.handshake(&mut stream, &mut state)).await;
        let reason = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(reason)) => Some(reason),
            Err(_) => Some(format!("handshake timed out after {limit:?}")),
        };
        if let Some(reason) = reason {
            warn!(addr = %self.config.address(), %reason, "console authentication failed");
            self.set_state(SessionState::Closed);
            let _ = stream.shutdown().await;
            return Err(ConnectError::AuthenticationFailed { reason });
        }

        self.settle(&mut stream, &mut state).await;

        let mut slot = self.stream.lock().await;
        if self.state() == SessionState::Closed {
            let _ = stream.shutdown().await;
            return Err(ConnectError::AuthenticationFailed {
                reason: "session closed during handshake".to_string(),
            });
        }
        *slot = Some(stream);
        self.set_state(SessionState::Ready);
        info!(addr = %self.config.address(), "console session ready");
        Ok(())
    }

    async fn handshake(
        &self,
        stream: &mut S,
        state: &mut watch::Receiver<SessionState>,
    ) -> Result<(), String> {
        let limit = self.config.timings.handshake;
        read_until(stream, PASSWORD_PROMPT, limit, state).await?;
        debug!("password prompt received");

        let line = format!("{}{}", self.config.password, LINE_TERMINATOR);
        stream
            .write_all(line.as_bytes())
            .await
            .map_err(|e| format!("writing password failed: {e}"))?;
        stream
            .flush()
            .await
            .map_err(|e| format!("writing password failed: {e}"))?;

        read_until(stream, LOGON_SUCCESS, limit, state).await?;
        Ok(())
    }

    /// Discard whatever the server sends right after logon (banner, help hint)
    /// so it does not leak into the first command's reply.
    async fn settle(&self, stream: &mut S, state: &mut watch::Receiver<SessionState>) {
        let timings = self.config.timings;
        let deadline = Instant::now() + timings.max_response;
        let mut buf = [0u8; READ_CHUNK];
        let mut discarded = 0usize;
        while Instant::now() < deadline {
            match read_chunk(stream, &mut buf, timings.drain_idle, state).await {
                Chunk::Data(n) => discarded += n,
                _ => break,
            }
        }
        if discarded > 0 {
            debug!(bytes = discarded, "discarded post-logon banner");
        }
    }

    /// Send one command and capture its reply with the adaptive drain.
    pub async fn send_command(&self, command: &str) -> Result<RawOutput, CommandError> {
        // A close waiting on the slot must not read as a busy session.
        if self.state() == SessionState::Closed {
            return Err(CommandError::Closed);
        }
        let mut slot = self
            .stream
            .try_lock()
            .map_err(|_| CommandError::AlreadyInFlight)?;

        let current = self.state();
        match current {
            SessionState::Ready => {}
            SessionState::Closed => return Err(CommandError::Closed),
            other => return Err(CommandError::NotReady(other)),
        }
        let Some(stream) = slot.as_mut() else {
            return Err(CommandError::NotReady(current));
        };

        let command = command.trim_end_matches(['\r', '\n']);
        let started = Instant::now();
        let line = format!("{}{}", command, LINE_TERMINATOR);
        let mut state = self.state.subscribe();
        let limit = self.config.timings.max_response;
        if let Err(e) = write_line(stream, line.as_bytes(), limit, &mut state).await {
            warn!(command, error = %e, "console write failed");
            self.set_state(SessionState::Closed);
            return Err(e);
        }

        let result = self.drain(stream, &mut state).await;
        match &result {
            Ok(raw) => debug!(
                command,
                bytes = raw.as_str().len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "command completed"
            ),
            Err(e) => warn!(command, error = %e, "command failed"),
        }
        result
    }

    async fn drain(
        &self,
        stream: &mut S,
        state: &mut watch::Receiver<SessionState>,
    ) -> Result<RawOutput, CommandError> {
        let timings = self.config.timings;
        let mut buf = [0u8; READ_CHUNK];
        let mut received: Vec<u8> = Vec::new();

        match read_chunk(stream, &mut buf, timings.first_read, state).await {
            Chunk::Data(n) => received.extend_from_slice(&buf[..n]),
            Chunk::Silent => return Ok(RawOutput::empty()),
            Chunk::Closed => return Err(CommandError::Closed),
            Chunk::Eof => {
                self.set_state(SessionState::Closed);
                return Err(CommandError::Transport(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed by server",
                )));
            }
            Chunk::Failed(e) => {
                self.set_state(SessionState::Closed);
                return Err(CommandError::Transport(e));
            }
        }

        let deadline = Instant::now() + timings.max_response;
        loop {
            let now = Instant::now();
            if now >= deadline {
                warn!(
                    bytes = received.len(),
                    "reply still streaming at the response cap, returning what arrived"
                );
                break;
            }
            let limit = timings.drain_idle.min(deadline - now);
            match read_chunk(stream, &mut buf, limit, state).await {
                Chunk::Data(n) => received.extend_from_slice(&buf[..n]),
                Chunk::Silent => break,
                Chunk::Closed => return Err(CommandError::Closed),
                Chunk::Eof => {
                    self.set_state(SessionState::Closed);
                    break;
                }
                Chunk::Failed(e) => {
                    self.set_state(SessionState::Closed);
                    return Err(CommandError::Transport(e));
                }
            }
        }

        Ok(RawOutput::new(String::from_utf8_lossy(&received).into_owned()))
    }

    /// Close the connection. Any in-flight read returns promptly with
    /// [`CommandError::Closed`].
    pub async fn close(&self) {
        let previous = self.state.send_replace(SessionState::Closed);
        let mut slot = self.stream.lock().await;
        if let Some(mut stream) = slot.take() {
            let _ = stream.shutdown().await;
        }
        if previous != SessionState::Closed {
            info!(addr = %self.config.address(), "console session closed");
        }
    }
}

impl Session<TcpStream> {
    /// Dial the configured server and authenticate.
    pub async fn connect(&self) -> Result<(), ConnectError> {
        let current = self.state();
        if current != SessionState::Disconnected {
            return Err(ConnectError::InvalidState(current));
        }

        let addr = self.config.address();
        let after = self.config.timings.connect;
        info!(%addr, "dialing console");

        let dial = TcpStream::connect((self.config.host.as_str(), self.config.port));
        let stream = match tokio::time::timeout(after, dial).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                self.set_state(SessionState::Closed);
                return Err(ConnectError::Unreachable { addr, source });
            }
            Err(_) => {
                self.set_state(SessionState::Closed);
                return Err(ConnectError::Timeout { addr, after });
            }
        };
        let _ = stream.set_nodelay(true);
        self.attach(stream).await
    }
}
