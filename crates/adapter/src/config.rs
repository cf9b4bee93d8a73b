//! Monitor configuration from environment variables and command-line flags.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::queue::DEFAULT_QUEUE_CAPACITY;
use crate::session::{SessionConfig, Timings};
use crate::types::{
    CONNECT_TIMEOUT_MS, DEFAULT_HOST, DEFAULT_PORT, DRAIN_IDLE_MS, FIRST_READ_TIMEOUT_MS,
    HANDSHAKE_TIMEOUT_MS, MAX_RESPONSE_MS, POLL_INTERVAL_MS,
};

pub const USAGE: &str = "\
Usage: sdtd-monitor [--host HOST] [--port PORT] [--password PASSWORD] [--once]

  --host HOST          server host (env SDTD_HOST, default localhost)
  --port PORT          telnet port (env SDTD_PORT, default 8081)
  --password PASSWORD  telnet password (env SDTD_PASSWORD, default empty)
  --once               poll once, print the snapshot as JSON and exit
  -h, --help           show this help

Timing (milliseconds): SDTD_POLL_INTERVAL_MS, SDTD_CONNECT_TIMEOUT_MS,
SDTD_HANDSHAKE_TIMEOUT_MS, SDTD_FIRST_READ_TIMEOUT_MS, SDTD_DRAIN_IDLE_MS,
SDTD_MAX_RESPONSE_MS. Diagnostics: SDTD_LOG_PATH, RUST_LOG.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} requires a value")]
    MissingValue(String),
    #[error("invalid value for {flag}: {value}")]
    InvalidValue { flag: String, value: String },
    #[error("unknown argument: {0}")]
    UnknownArgument(String),
    #[error("help requested")]
    HelpRequested,
}

#[derive(Clone)]
pub struct MonitorConfig {
    pub host: String,
    pub port: u16,
    pub password: String,
    pub poll_interval: Duration,
    pub timings: Timings,
    pub queue_capacity: usize,
    /// Diagnostic log file. `None` discards diagnostics.
    pub log_path: Option<PathBuf>,
    /// Poll once and print instead of running the dashboard.
    pub once: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            password: String::new(),
            poll_interval: Duration::from_millis(POLL_INTERVAL_MS),
            timings: Timings::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            log_path: None,
            once: false,
        }
    }
}

impl std::fmt::Debug for MonitorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &"<redacted>")
            .field("poll_interval", &self.poll_interval)
            .field("timings", &self.timings)
            .field("queue_capacity", &self.queue_capacity)
            .field("log_path", &self.log_path)
            .field("once", &self.once)
            .finish()
    }
}

fn millis(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64, floor: u64) -> Duration {
    let ms = lookup(key)
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(default)
        .max(floor);
    Duration::from_millis(ms)
}

impl MonitorConfig {
    /// Read `SDTD_*` environment variables. Unparseable values fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = lookup("SDTD_HOST")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = lookup("SDTD_PORT")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let password = lookup("SDTD_PASSWORD").unwrap_or_default();

        let timings = Timings {
            connect: millis(&lookup, "SDTD_CONNECT_TIMEOUT_MS", CONNECT_TIMEOUT_MS, 100),
            handshake: millis(&lookup, "SDTD_HANDSHAKE_TIMEOUT_MS", HANDSHAKE_TIMEOUT_MS, 100),
            first_read: millis(&lookup, "SDTD_FIRST_READ_TIMEOUT_MS", FIRST_READ_TIMEOUT_MS, 10),
            drain_idle: millis(&lookup, "SDTD_DRAIN_IDLE_MS", DRAIN_IDLE_MS, 10),
            max_response: millis(&lookup, "SDTD_MAX_RESPONSE_MS", MAX_RESPONSE_MS, 100),
        };

        let log_path = lookup("SDTD_LOG_PATH")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        Self {
            host,
            port,
            password,
            poll_interval: millis(&lookup, "SDTD_POLL_INTERVAL_MS", POLL_INTERVAL_MS, 100),
            timings,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            log_path,
            once: false,
        }
    }

    /// Apply command-line flags on top of the current values.
    ///
    /// `args` excludes the program name.
    pub fn apply_args<I>(mut self, args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut it = args.into_iter();
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--host" => {
                    let v = it.next().ok_or_else(|| ConfigError::MissingValue(arg.clone()))?;
                    if v.trim().is_empty() {
                        return Err(ConfigError::InvalidValue {
                            flag: arg,
                            value: v,
                        });
                    }
                    self.host = v.trim().to_string();
                }
                "--port" => {
                    let v = it.next().ok_or_else(|| ConfigError::MissingValue(arg.clone()))?;
                    self.port = v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                        flag: arg.clone(),
                        value: v.clone(),
                    })?;
                }
                "--password" => {
                    self.password = it.next().ok_or_else(|| ConfigError::MissingValue(arg.clone()))?;
                }
                "--once" => self.once = true,
                "-h" | "--help" => return Err(ConfigError::HelpRequested),
                _ => return Err(ConfigError::UnknownArgument(arg)),
            }
        }
        Ok(self)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(self.host.clone(), self.port, self.password.clone())
            .with_timings(self.timings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = MonitorConfig::from_lookup(|_| None);
        assert_eq!(cfg.host, "localhost");
        assert_eq!(cfg.port, 8081);
        assert_eq!(cfg.password, "");
        assert_eq!(cfg.poll_interval, Duration::from_millis(2000));
        assert_eq!(cfg.timings, Timings::default());
        assert!(cfg.log_path.is_none());
    }

    #[test]
    fn environment_overrides() {
        let cfg = MonitorConfig::from_lookup(lookup(&[
            ("SDTD_HOST", "game.example"),
            ("SDTD_PORT", "9000"),
            ("SDTD_PASSWORD", "pw"),
            ("SDTD_DRAIN_IDLE_MS", "300"),
            ("SDTD_LOG_PATH", "/tmp/monitor.log"),
        ]));
        assert_eq!(cfg.host, "game.example");
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.password, "pw");
        assert_eq!(cfg.timings.drain_idle, Duration::from_millis(300));
        assert_eq!(cfg.log_path, Some(PathBuf::from("/tmp/monitor.log")));
    }

    #[test]
    fn bad_numbers_fall_back_and_floors_apply() {
        let cfg = MonitorConfig::from_lookup(lookup(&[
            ("SDTD_PORT", "not-a-port"),
            ("SDTD_POLL_INTERVAL_MS", "1"),
            ("SDTD_DRAIN_IDLE_MS", "x"),
        ]));
        assert_eq!(cfg.port, 8081);
        assert_eq!(cfg.poll_interval, Duration::from_millis(100));
        assert_eq!(cfg.timings.drain_idle, Duration::from_millis(200));
    }

    #[test]
    fn flags_override_environment() {
        let cfg = MonitorConfig::from_lookup(lookup(&[("SDTD_HOST", "env-host")]))
            .apply_args(args(&["--host", "flag-host", "--port", "26900", "--password", "", "--once"]))
            .unwrap();
        assert_eq!(cfg.host, "flag-host");
        assert_eq!(cfg.port, 26900);
        assert_eq!(cfg.password, "");
        assert!(cfg.once);
    }

    #[test]
    fn flag_errors() {
        let base = MonitorConfig::default;
        assert_eq!(
            base().apply_args(args(&["--port"])).unwrap_err(),
            ConfigError::MissingValue("--port".into())
        );
        assert!(matches!(
            base().apply_args(args(&["--port", "99999"])).unwrap_err(),
            ConfigError::InvalidValue { .. }
        ));
        assert_eq!(
            base().apply_args(args(&["--verbose"])).unwrap_err(),
            ConfigError::UnknownArgument("--verbose".into())
        );
        assert_eq!(
            base().apply_args(args(&["-h"])).unwrap_err(),
            ConfigError::HelpRequested
        );
    }

    #[test]
    fn session_config_carries_timings() {
        let mut cfg = MonitorConfig::default();
        cfg.timings.drain_idle = Duration::from_millis(250);
        let session = cfg.session_config();
        assert_eq!(session.timings.drain_idle, Duration::from_millis(250));
        assert_eq!(session.address(), "localhost:8081");
    }
}
