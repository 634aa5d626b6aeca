//! Value types shared by every component: players, contests, lineups, and the
//! per-request player arena.
//!
//! These are plain data, owned per optimize/simulate call. There are no
//! back-pointers: a [`Lineup`] references players by [`PlayerId`] and looks
//! them up in a [`PlayerPool`] when it needs the underlying [`Player`].

pub mod contest;
pub mod lineup;
pub mod player;
pub mod stacking;

pub use contest::{Contest, ContestType, Platform, PositionRequirements, SlotRequirement, Sport};
pub use lineup::{Lineup, SlotAssignment};
pub use player::{Player, PlayerId, TeamId};
pub use stacking::{StackingRule, StackingRuleType};

use rustc_hash::FxHashMap;

/// Arena owning every player instance for the duration of one
/// optimize/simulate call. Grounded on `RegretStorage`'s use of
/// `rustc_hash::FxHashMap` for hot-path id-keyed lookups.
#[derive(Debug, Clone, Default)]
pub struct PlayerPool {
    players: FxHashMap<PlayerId, Player>,
}

impl PlayerPool {
    pub fn new(players: Vec<Player>) -> Self {
        let mut map = FxHashMap::default();
        for p in players {
            map.insert(p.id, p);
        }
        Self { players: map }
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// Players eligible for a slot's base-position set and not excluded or
    /// injured.
    pub fn eligible_for<'a>(
        &'a self,
        base_positions: &'a [String],
        excluded: &'a FxHashMap<PlayerId, ()>,
    ) -> impl Iterator<Item = &'a Player> + 'a {
        self.players.values().filter(move |p| {
            !p.is_injured
                && !excluded.contains_key(&p.id)
                && base_positions.iter().any(|bp| bp == &p.position)
        })
    }
}
