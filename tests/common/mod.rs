//! Loopback stand-in for a dedicated server's telnet console.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use sdtd_monitor::adapter::{MonitorConfig, SessionConfig, Timings};

pub const ROSTER: &str = "Total of 3 in the game\r\n\
1. id=171, Survivor (PL), pos=(-1050.5, 65.0, 890.3), rot=(0.0, -135.0, 0.0), remote=True, health=150, deaths=2, zombies=0, players=0, score=15, level=13, steamid=76561198012345678, ip=127.0.0.1, ping=24\r\n\
2. id=172, ZombieSlayer, pos=(-1040.1, 65.0, 895.1), rot=(0.0, 45.0, 0.0), remote=True, health=80, deaths=5, zombies=12, players=1, score=55, level=24, steamid=76561198087654321, ip=192.168.0.5, ping=45\r\n\
3. id=175, Newbie, pos=(-1060.0, 64.0, 880.0), rot=(0.0, 0.0, 0.0), remote=True, health=100, deaths=0, zombies=0, players=0, score=0, level=1, steamid=76561199000000001, ip=10.0.0.99, ping=120\r\n";

pub const MEMORY: &str = "Heap: 2500.5 MB, Max: 3500.0 MB, Objects: 150000\r\nGC: 120.5 MB\r\nFPS: 58.4\r\n";

pub const ENTITIES: &str = "Total of 5 entities in the game\r\n\
1. id=171, name=Survivor (PL), ... type=Player\r\n\
2. id=801, name=Zombie Boe, ... type=Zombie\r\n\
3. id=802, name=Zombie Joe, ... type=Zombie\r\n\
4. id=803, name=Stag, ... type=Animal\r\n\
5. id=804, name=Bear, ... type=Animal\r\n";

pub const TIME: &str = "Day 7, 21:45\r\n";

/// One thing the fixture does in answer to a command.
#[derive(Debug, Clone)]
pub enum Step {
    Send(String),
    Pause(Duration),
    Hangup,
}

pub fn send(text: impl Into<String>) -> Step {
    Step::Send(text.into())
}

pub fn pause_ms(ms: u64) -> Step {
    Step::Pause(Duration::from_millis(ms))
}

/// The log line a real server broadcasts before running a telnet command.
pub fn executing(command: &str) -> String {
    format!("2025-12-10T10:35:08 1991.171 INF Executing command '{command}' by Telnet from 127.0.0.1:5431\r\n")
}

/// Canned replies modelled on a live server.
pub fn canned(command: &str) -> Vec<Step> {
    let reply = match command {
        "lp" | "lpi" | "listplayers" => ROSTER.to_string(),
        "mem" => MEMORY.to_string(),
        "le" | "listents" => ENTITIES.to_string(),
        "gettime" | "gt" => TIME.to_string(),
        "exit" | "quit" => return vec![send("Goodbye.\r\n"), Step::Hangup],
        other => format!("*** Unknown command: {other}\r\n"),
    };
    vec![send(executing(command)), send(reply), send("\r\n")]
}

pub type Responder = Arc<dyn Fn(&str) -> Vec<Step> + Send + Sync>;

pub struct MockServer {
    pub addr: SocketAddr,
    /// Every command line received, across all connections.
    pub commands: Arc<Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

impl MockServer {
    /// Accept any password and answer with [`canned`] replies.
    pub async fn start() -> Self {
        Self::with_responder(None, canned).await
    }

    /// `password: None` accepts anything.
    pub async fn with_responder<F>(password: Option<&str>, responder: F) -> Self
    where
        F: Fn(&str) -> Vec<Step> + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let commands = Arc::new(Mutex::new(Vec::new()));
        let responder: Responder = Arc::new(responder);
        let password = password.map(str::to_string);

        let seen = Arc::clone(&commands);
        let task = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let responder = Arc::clone(&responder);
                let seen = Arc::clone(&seen);
                let password = password.clone();
                tokio::spawn(async move {
                    let (read_half, mut write_half) = stream.into_split();
                    let mut lines = BufReader::new(read_half).lines();

                    if write_half
                        .write_all(b"*** Connected with 7DTD server.\r\nPlease enter password:\r\n")
                        .await
                        .is_err()
                    {
                        return;
                    }

                    loop {
                        let Ok(Some(given)) = lines.next_line().await else {
                            return;
                        };
                        match &password {
                            Some(expected) if given.trim() != expected => {
                                let _ = write_half
                                    .write_all(b"Password incorrect, please enter password:\r\n")
                                    .await;
                            }
                            _ => break,
                        }
                    }
                    let _ = write_half.write_all(b"Logon successful.\r\n\r\n").await;

                    while let Ok(Some(line)) = lines.next_line().await {
                        let command = line.trim().to_string();
                        seen.lock().unwrap().push(command.clone());
                        for step in responder(&command) {
                            match step {
                                Step::Send(text) => {
                                    if write_half.write_all(text.as_bytes()).await.is_err() {
                                        return;
                                    }
                                    let _ = write_half.flush().await;
                                }
                                Step::Pause(d) => tokio::time::sleep(d).await,
                                Step::Hangup => return,
                            }
                        }
                    }
                });
            }
        });

        Self {
            addr,
            commands,
            task,
        }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    pub fn session_config(&self, password: &str) -> SessionConfig {
        SessionConfig::new("127.0.0.1", self.port(), password).with_timings(fast_timings())
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            host: "127.0.0.1".to_string(),
            port: self.port(),
            password: "secret".to_string(),
            poll_interval: Duration::from_millis(200),
            timings: fast_timings(),
            ..MonitorConfig::default()
        }
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Short drain windows so tests stay quick.
pub fn fast_timings() -> Timings {
    Timings {
        connect: Duration::from_secs(1),
        handshake: Duration::from_secs(2),
        first_read: Duration::from_millis(500),
        drain_idle: Duration::from_millis(80),
        max_response: Duration::from_secs(2),
    }
}

/// Port with nothing listening on it.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}
