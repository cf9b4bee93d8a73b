//! Entity listing decoding.

use crate::types::EntityCounts;

const ZOMBIE_MARKERS: [&str; 2] = ["type=zombie", "type=entityzombie"];
const ANIMAL_MARKERS: [&str; 2] = ["type=animal", "type=entityanimal"];
const PLAYER_MARKERS: [&str; 2] = ["type=player", "type=entityplayer"];

/// Count zombies, animals and other entities in an `le` reply.
///
/// Player entities are skipped; players come from the roster so they are not
/// counted twice. Any remaining line with an `id=` is an "other" entity.
pub fn decode_entities(body: &str) -> EntityCounts {
    let mut counts = EntityCounts::default();
    for line in body.lines() {
        let lower = line.to_ascii_lowercase();
        let has = |markers: &[&str]| markers.iter().any(|m| lower.contains(m));

        if has(&ZOMBIE_MARKERS) {
            counts.zombies += 1;
        } else if has(&ANIMAL_MARKERS) {
            counts.animals += 1;
        } else if has(&PLAYER_MARKERS) {
            // Counted by the roster.
        } else if lower.contains("id=") {
            counts.other += 1;
        }
    }
    counts
}
