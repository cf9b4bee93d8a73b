//! Snapshot assembly from the four decoded poll replies.

use crate::decode::{decode_entities, decode_memory, decode_roster, decode_time};
use crate::types::{average_ping, ConsoleCommand, ServerSnapshot};

/// Reply bodies gathered during one poll tick.
///
/// A command that failed leaves its body empty; decoding then yields
/// defaults for that part of the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollReplies {
    pub time: String,
    pub memory: String,
    pub roster: String,
    pub entities: String,
}

impl PollReplies {
    pub fn set(&mut self, command: ConsoleCommand, body: String) {
        match command {
            ConsoleCommand::Time => self.time = body,
            ConsoleCommand::Memory => self.memory = body,
            ConsoleCommand::Roster => self.roster = body,
            ConsoleCommand::Entities => self.entities = body,
        }
    }
}

/// Decode every reply and build a fresh snapshot.
pub fn build_snapshot(host: &str, port: u16, replies: &PollReplies) -> ServerSnapshot {
    let memory = decode_memory(&replies.memory);
    let players = decode_roster(&replies.roster);

    ServerSnapshot {
        host: host.to_string(),
        port,
        game_time: decode_time(&replies.time),
        fps: memory.fps,
        heap_used: memory.heap_used,
        heap_max: memory.heap_max,
        player_count: players.len(),
        entities: decode_entities(&replies.entities),
        average_ping: average_ping(&players),
        players,
    }
}
