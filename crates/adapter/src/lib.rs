//! Telnet side of the monitor: the authenticated console session, the command
//! queue that serializes access to it, and the poller that turns replies into
//! snapshots.
//!
//! # Protocol Overview
//!
//! The server's remote console is a plain line-oriented telnet service:
//!
//! 1. **Connection**: TCP connect to the console port (default: localhost:8081)
//! 2. **Handshake**: server prompts with `Please enter password:`, client
//!    answers with the password and `\r\n`, server replies `Logon successful.`
//! 3. **Commands**: client writes a command line terminated by `\r\n`
//! 4. **Replies**: the server writes an arbitrary number of lines and never
//!    marks the end of a reply. Engine log lines are interleaved freely.
//!
//! Because replies are unframed, [`Session::send_command`] drains the socket
//! until it stays silent for a short idle window, bounded by a total cap.
//!
//! # Polling
//!
//! Every tick the [`Poller`] runs `gettime`, `mem`, `lp` and `le`, in that
//! order, through the [`CommandQueue`]. Log lines that arrive mixed into the
//! replies are split out and forwarded as [`MonitorEvent::Log`].
//!
//! # Environment Variables
//!
//! - `SDTD_HOST`: server host (default: "localhost")
//! - `SDTD_PORT`: console port (default: 8081)
//! - `SDTD_PASSWORD`: console password (default: empty)
//! - `SDTD_POLL_INTERVAL_MS`: poll period (default: 2000)
//! - `SDTD_CONNECT_TIMEOUT_MS`, `SDTD_HANDSHAKE_TIMEOUT_MS`,
//!   `SDTD_FIRST_READ_TIMEOUT_MS`, `SDTD_DRAIN_IDLE_MS`, `SDTD_MAX_RESPONSE_MS`:
//!   drain and handshake timing
//!
//! # Testing manually
//!
//! ```bash
//! nc localhost 8081
//! # Please enter password:
//! secret
//! # Logon successful.
//! lp
//! ```

pub mod config;
pub mod poller;
pub mod queue;
pub mod runtime;
pub mod session;

pub use sdtd_monitor_core as core;
pub use sdtd_monitor_types as types;

pub use config::{ConfigError, MonitorConfig, USAGE};
pub use poller::{PollFailure, PollReport, Poller};
pub use queue::{CommandQueue, CommandReply, DEFAULT_QUEUE_CAPACITY};
pub use runtime::{probe, Monitor, MonitorEvent};
pub use session::{CommandError, ConnectError, Session, SessionConfig, Timings, Transport};
