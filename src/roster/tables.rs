//! Authoritative slot-plan and flex-eligibility tables from §6.
//!
//! Table-driven rather than a runtime-constructed match tree, so each plan is
//! a `'static` description built once per lookup.

use crate::model::{Platform, PositionRequirements, Sport, SlotRequirement};

fn req(tag: &str, count: u8) -> SlotRequirement {
    SlotRequirement {
        slot_tag: tag.to_string(),
        count,
    }
}

/// Returns the ordered slot plan, or `None` if the combination is
/// unsupported. Base slots are listed before flex slots so the optimizer's
/// fail-fast ordering works without re-sorting.
pub fn lookup(sport: Sport, platform: Platform) -> Option<PositionRequirements> {
    use Platform::*;
    use Sport::*;
    let slots = match (sport, platform) {
        (Nba, DraftKings) => vec![
            req("PG", 1),
            req("SG", 1),
            req("SF", 1),
            req("PF", 1),
            req("C", 1),
            req("G", 1),
            req("F", 1),
            req("UTIL", 1),
        ],
        (Nba, FanDuel) => vec![
            req("PG", 2),
            req("SG", 2),
            req("SF", 2),
            req("PF", 2),
            req("C", 1),
        ],
        (Nfl, DraftKings) => vec![
            req("QB", 1),
            req("RB", 2),
            req("WR", 3),
            req("TE", 1),
            req("FLEX", 1),
            req("DST", 1),
        ],
        (Nfl, FanDuel) => vec![
            req("QB", 1),
            req("RB", 2),
            req("WR", 3),
            req("TE", 1),
            req("FLEX", 1),
            req("D/ST", 1),
        ],
        (Mlb, DraftKings) => vec![
            req("P", 2),
            req("C", 1),
            req("1B", 1),
            req("2B", 1),
            req("3B", 1),
            req("SS", 1),
            req("OF", 3),
        ],
        (Mlb, FanDuel) => vec![
            req("P", 1),
            req("C/1B", 1),
            req("2B", 1),
            req("3B", 1),
            req("SS", 1),
            req("OF", 3),
            req("UTIL", 1),
        ],
        (Nhl, DraftKings) => vec![
            req("C", 2),
            req("W", 3),
            req("D", 2),
            req("G", 1),
            req("UTIL", 1),
        ],
        (Nhl, FanDuel) => vec![req("C", 2), req("W", 4), req("D", 2), req("G", 1)],
        (Golf, DraftKings) | (Golf, FanDuel) => vec![req("G", 6)],
    };
    Some(PositionRequirements(slots))
}

/// Base positions eligible for `slot_tag` under `sport`'s rules. Base slots
/// map to themselves; flex slots expand to the union the §6 table specifies.
pub fn eligibility(slot_tag: &str, sport: Sport) -> Vec<String> {
    use Sport::*;
    let set: &[&str] = match (sport, slot_tag) {
        (Nba, "G") => &["PG", "SG"],
        (Nba, "F") => &["SF", "PF"],
        (Nba, "UTIL") => &["PG", "SG", "SF", "PF", "C"],
        (Nfl, "FLEX") => &["RB", "WR", "TE"],
        (Mlb, "C/1B") => &["C", "1B"],
        (Mlb, "UTIL") => &["C", "1B", "2B", "3B", "SS", "OF"],
        (Nhl, "UTIL") => &["C", "W", "D"],
        (Golf, "G") => &["G"],
        _ => &[],
    };
    if !set.is_empty() {
        return set.iter().map(|s| s.to_string()).collect();
    }
    // Base slot: eligible only for players tagged with exactly this position.
    vec![slot_tag.to_string()]
}
