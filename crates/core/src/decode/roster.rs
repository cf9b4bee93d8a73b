//! Player roster decoding.
//!
//! The roster reply comes in two dialects:
//!
//! - **Key/value**: comma-separated fields, mostly `key=value`, with the
//!   player name as a bare positional field right after `id=`:
//!   `1. id=171, Survivor (PL), pos=(...), health=150, ..., ping=24`
//! - **Strict**: the same layout matched as a whole by one fixed-shape
//!   pattern (id, name, health, deaths, zombies, score, level, steamid, ip,
//!   ping in that relative order). It tolerates commas inside names, which the
//!   key/value split cannot.
//!
//! [`detect_dialect`] picks the strict dialect only when every candidate line
//! matches it, otherwise the key/value scan.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex_lite::{Captures, Regex};

use crate::types::Player;

/// Token every roster line carries.
const ID_TOKEN: &str = "id=";

/// A decoding strategy for one roster dialect.
pub trait RosterDialect: Sync {
    fn name(&self) -> &'static str;

    /// Whether `line` is in this dialect.
    fn accepts(&self, line: &str) -> bool;

    /// Decode one line. `None` when the line carries no `id`.
    ///
    /// Name filtering is left to [`decode_roster_with`].
    fn decode_line(&self, line: &str) -> Option<Player>;
}

/// Loose comma/`key=value` scan.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyValueDialect;

/// Whole-line fixed-shape pattern.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictDialect;

pub static KEY_VALUE: KeyValueDialect = KeyValueDialect;
pub static STRICT: StrictDialect = StrictDialect;

fn parse_stat(value: Option<&str>) -> i32 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

fn normalize_key(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    lower
        .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == ' ')
        .to_string()
}

impl RosterDialect for KeyValueDialect {
    fn name(&self) -> &'static str {
        "key-value"
    }

    fn accepts(&self, line: &str) -> bool {
        line.contains(ID_TOKEN)
    }

    fn decode_line(&self, line: &str) -> Option<Player> {
        let mut fields: HashMap<String, String> = HashMap::new();
        let mut positional_name: Option<String> = None;

        for (i, part) in line.trim().split(',').enumerate() {
            let part = part.trim();
            match part.split_once('=') {
                Some((key, value)) => {
                    fields.insert(normalize_key(key), value.trim().to_string());
                }
                None if i == 1 => positional_name = Some(part.to_string()),
                None => {}
            }
        }

        let id = fields.get("id").filter(|v| !v.is_empty())?.clone();
        let field = |key: &str| fields.get(key).map(String::as_str);

        let name = positional_name
            .filter(|n| !n.is_empty())
            .or_else(|| field("name").map(str::to_string))
            .unwrap_or_default();
        let steam_id = field("steamid")
            .or_else(|| field("pltfmid"))
            .unwrap_or_default()
            .to_string();

        Some(Player {
            id,
            name,
            level: parse_stat(field("level")),
            health: parse_stat(field("health")),
            deaths: parse_stat(field("deaths")),
            zombie_kills: parse_stat(field("zombies")),
            player_kills: parse_stat(field("players")),
            score: parse_stat(field("score")),
            ping: parse_stat(field("ping")),
            steam_id,
            ip: field("ip").unwrap_or_default().to_string(),
        })
    }
}

fn strict_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"^\s*(?:\d+\.\s*)?id=(?P<id>[^,\s]+),\s*(?P<name>[^,=\s][^=]*?),\s*\w+=",
            r".*?health=(?P<health>-?\d+)",
            r".*?deaths=(?P<deaths>-?\d+)",
            r".*?zombies=(?P<zombies>-?\d+)",
            r".*?(?:players=(?P<players>-?\d+).*?)?score=(?P<score>-?\d+)",
            r".*?level=(?P<level>-?\d+)",
            r".*?steamid=(?P<steamid>[^,\s]*)",
            r".*?ip=(?P<ip>[^,\s]*)",
            r".*?ping=(?P<ping>-?\d+)",
        ))
        .expect("strict roster pattern is valid")
    })
}

fn capture<'a>(caps: &'a Captures<'_>, group: &str) -> Option<&'a str> {
    caps.name(group).map(|m| m.as_str())
}

impl RosterDialect for StrictDialect {
    fn name(&self) -> &'static str {
        "strict"
    }

    fn accepts(&self, line: &str) -> bool {
        strict_shape().is_match(line)
    }

    fn decode_line(&self, line: &str) -> Option<Player> {
        let caps = strict_shape().captures(line)?;
        Some(Player {
            id: capture(&caps, "id")?.to_string(),
            name: capture(&caps, "name").unwrap_or_default().trim().to_string(),
            level: parse_stat(capture(&caps, "level")),
            health: parse_stat(capture(&caps, "health")),
            deaths: parse_stat(capture(&caps, "deaths")),
            zombie_kills: parse_stat(capture(&caps, "zombies")),
            player_kills: parse_stat(capture(&caps, "players")),
            score: parse_stat(capture(&caps, "score")),
            ping: parse_stat(capture(&caps, "ping")),
            steam_id: capture(&caps, "steamid").unwrap_or_default().to_string(),
            ip: capture(&caps, "ip").unwrap_or_default().to_string(),
        })
    }
}

fn candidate_lines(body: &str) -> impl Iterator<Item = &str> {
    body.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && l.contains(ID_TOKEN))
}

/// Pick the dialect the reply is written in.
pub fn detect_dialect(body: &str) -> &'static dyn RosterDialect {
    let mut any = false;
    for line in candidate_lines(body) {
        any = true;
        if !STRICT.accepts(line) {
            return &KEY_VALUE;
        }
    }
    if any {
        &STRICT
    } else {
        &KEY_VALUE
    }
}

/// Decode a roster reply with an explicit dialect.
///
/// Lines without an `id` are skipped; records with an empty name are console
/// observers (telnet connections), not players, and are dropped.
pub fn decode_roster_with(dialect: &dyn RosterDialect, body: &str) -> Vec<Player> {
    candidate_lines(body)
        .filter_map(|line| dialect.decode_line(line))
        .filter(|p| !p.name.is_empty())
        .collect()
}

/// Decode a roster reply in whichever dialect it uses.
pub fn decode_roster(body: &str) -> Vec<Player> {
    decode_roster_with(detect_dialect(body), body)
}
