//! Player identity, pricing, and projection data.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque player identifier, unique within a single optimize/simulate call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque team identifier (e.g. "BOS", "LAL"). Shared across players on the
/// same team; compared by value, not interned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(pub String);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single roster entry: identity, pricing, and per-sport projection data.
///
/// Immutable during optimization and simulation. `ownership` is always in
/// `[0, 1]`; callers ingesting a `[0, 100]` feed should go through
/// [`Player::with_ownership_percent`] so the conversion happens exactly once,
/// at ingress, per the unification rule in the design notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub external_id: String,
    pub name: String,
    pub team: TeamId,
    pub opponent: TeamId,
    /// Base position tag, e.g. "PG", "WR", "C/1B" is never a base tag (that's
    /// a flex slot); base tags are the atomic positions from §6.
    pub position: String,
    pub salary: u32,
    pub projected_points: f64,
    pub floor_points: f64,
    pub ceiling_points: f64,
    /// Projected ownership, unit interval.
    pub ownership: f64,
    pub is_injured: bool,
    /// Batting order slot, 1-indexed; `None` when unknown. MLB-only, used by
    /// the adjacency correlation override in §4.2.
    pub batting_order: Option<u8>,
}

impl Player {
    /// Value density used by the optimizer's per-slot candidate ordering:
    /// projection per dollar of salary. Salary is never zero for a rostered
    /// player; guard anyway so a malformed fixture can't divide by zero.
    pub fn value(&self) -> f64 {
        if self.salary == 0 {
            self.projected_points
        } else {
            self.projected_points / self.salary as f64
        }
    }

    /// Construct a player from an ownership feed expressed as `[0, 100]`.
    pub fn with_ownership_percent(mut self, percent: f64) -> Self {
        self.ownership = percent / 100.0;
        self
    }
}
