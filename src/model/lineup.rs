//! A complete lineup: one player assigned to every slot.

use crate::model::player::PlayerId;
use serde::{Deserialize, Serialize};

/// A single slot assignment within a lineup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAssignment {
    pub slot_tag: String,
    pub player_id: PlayerId,
}

/// A complete, ordered lineup: one player per slot, in slot-plan order.
///
/// `Lineup` itself does not enforce the five invariants in §3 — construction
/// happens inside the optimizer's backtracking search, which only ever
/// produces invariant-satisfying lineups by construction, and
/// [`crate::roster::validate`] is the independent checker used by tests and
/// by callers handed a `Lineup` from elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lineup {
    pub assignments: Vec<SlotAssignment>,
    pub total_salary: u32,
    pub total_projection: f64,
    /// Optional objective value as scored by the optimizer (projection plus
    /// any correlation bonus); `None` for lineups built outside the
    /// optimizer (e.g. test fixtures).
    pub objective: Option<f64>,
}

impl Lineup {
    /// Players in this lineup, in slot order. May contain duplicates only if
    /// the lineup violates invariant 1; callers needing a true set should
    /// intersect/diff via [`Lineup::player_ids`] after validation.
    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.assignments.iter().map(|a| a.player_id).collect()
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.assignments.iter().any(|a| a.player_id == player)
    }

    /// Symmetric difference in player ids between two lineups, used by the
    /// diversity post-pass and by the §8 diversity property test.
    pub fn symmetric_difference_count(&self, other: &Lineup) -> usize {
        let a = self.player_ids();
        let b = other.player_ids();
        let only_a = a.iter().filter(|p| !b.contains(p)).count();
        let only_b = b.iter().filter(|p| !a.contains(p)).count();
        only_a + only_b
    }

    /// Tie-break key: (salary ascending, sorted player-id list ascending).
    /// Used whenever two lineups compare equal on objective.
    pub fn tie_break_key(&self) -> (u32, Vec<PlayerId>) {
        let mut ids = self.player_ids();
        ids.sort_unstable();
        (self.total_salary, ids)
    }
}
