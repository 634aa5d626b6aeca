//! Contest schema: sport, platform, salary cap, and payout shape.

use serde::{Deserialize, Serialize};

/// Supported sports. Sport/platform combinations not present in the §6 table
/// are rejected by [`crate::roster::requirements_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sport {
    Nba,
    Nfl,
    Mlb,
    Nhl,
    Golf,
}

/// Supported DFS platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    DraftKings,
    FanDuel,
}

/// Cash game vs guaranteed prize pool tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContestType {
    Cash,
    Gpp,
}

/// One slot in the position plan: a tag ("PG", "FLEX", "UTIL", ...) and how
/// many lineup slots carry that tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRequirement {
    pub slot_tag: String,
    pub count: u8,
}

/// Ordered position plan for a contest. Order matters: the optimizer visits
/// mandatory base slots (fewest eligible players first) before flex slots,
/// per the roster model's fail-fast design note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PositionRequirements(pub Vec<SlotRequirement>);

impl PositionRequirements {
    pub fn total_slots(&self) -> usize {
        self.0.iter().map(|s| s.count as usize).sum()
    }
}

/// Contest rules. Immutable for the duration of an optimize/simulate call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contest {
    pub sport: Sport,
    pub platform: Platform,
    pub salary_cap: u32,
    pub position_requirements: PositionRequirements,
    pub contest_type: ContestType,
    pub total_entries: u32,
    pub entry_fee: f64,
    pub prize_pool: f64,
}
