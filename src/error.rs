//! Crate-wide error types.
//!
//! Every error is a plain enum with a hand-written `Display`/`Error` impl,
//! matching `cfr::config::ConfigError` in the crate this engine is grounded
//! on: no `thiserror`, no `anyhow`. `Cancelled` and `Timeout` are not part of
//! this enum — per the propagation policy they ride along with a partial
//! result as a status variant, not as an error.

use crate::model::{Platform, PlayerId, Sport};
use std::fmt;

/// Roster-model errors (C1).
#[derive(Debug, Clone, PartialEq)]
pub enum RosterError {
    /// The (sport, platform) pair has no entry in the §6 slot-plan table.
    UnsupportedCombination { sport: Sport, platform: Platform },
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RosterError::UnsupportedCombination { sport, platform } => write!(
                f,
                "no slot plan for sport {:?} on platform {:?}",
                sport, platform
            ),
        }
    }
}

impl std::error::Error for RosterError {}

/// A single lineup-invariant violation, in the order §3 enumerates them.
#[derive(Debug, Clone, PartialEq)]
pub enum ViolationKind {
    DuplicateOrMissingSlot { slot_tag: String },
    IneligiblePlayer { slot_tag: String, player: PlayerId },
    SalaryOverCap { total: u32, cap: u32 },
    StackingRuleViolated { detail: String },
    ExcludedPlayerPresent { player: PlayerId },
    LockedPlayerMissing { player: PlayerId },
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::DuplicateOrMissingSlot { slot_tag } => {
                write!(f, "slot {} is not filled exactly once", slot_tag)
            }
            ViolationKind::IneligiblePlayer { slot_tag, player } => {
                write!(f, "player {} is not eligible for slot {}", player, slot_tag)
            }
            ViolationKind::SalaryOverCap { total, cap } => {
                write!(f, "total salary {} exceeds cap {}", total, cap)
            }
            ViolationKind::StackingRuleViolated { detail } => {
                write!(f, "stacking rule violated: {}", detail)
            }
            ViolationKind::ExcludedPlayerPresent { player } => {
                write!(f, "excluded player {} appears in lineup", player)
            }
            ViolationKind::LockedPlayerMissing { player } => {
                write!(f, "locked player {} is missing from lineup", player)
            }
        }
    }
}

impl std::error::Error for ViolationKind {}

/// Config validation errors shared by the optimizer and simulator, mirroring
/// `cfr::config::ConfigError`.
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidConfig {
    NumLineupsBelowOne,
    NegativeSalaryCap,
    ExposureBoundsInverted { player: PlayerId, min: f64, max: f64 },
    SimulationCountOutOfRange { value: u32 },
    MalformedPayoutStructure { detail: String },
}

impl fmt::Display for InvalidConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidConfig::NumLineupsBelowOne => write!(f, "numLineups must be at least 1"),
            InvalidConfig::NegativeSalaryCap => write!(f, "salaryCap must be positive"),
            InvalidConfig::ExposureBoundsInverted { player, min, max } => write!(
                f,
                "minExposure[{}] ({}) exceeds maxExposure[{}] ({})",
                player, min, player, max
            ),
            InvalidConfig::SimulationCountOutOfRange { value } => write!(
                f,
                "numSimulations {} is outside the supported range [100, 100000]",
                value
            ),
            InvalidConfig::MalformedPayoutStructure { detail } => {
                write!(f, "malformed payout structure: {}", detail)
            }
        }
    }
}

impl std::error::Error for InvalidConfig {}

/// Why the optimizer concluded no lineup exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Infeasible {
    /// The first slot or rule that made the search dead-end, in human terms.
    pub reason: String,
}

impl fmt::Display for Infeasible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no feasible lineup: {}", self.reason)
    }
}

impl std::error::Error for Infeasible {}

/// Simulator-only failure: numerical trouble in the correlation pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationFailed {
    pub offending_pair: (PlayerId, PlayerId),
    pub detail: String,
}

impl fmt::Display for SimulationFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "simulation failed for pair ({}, {}): {}",
            self.offending_pair.0, self.offending_pair.1, self.detail
        )
    }
}

impl std::error::Error for SimulationFailed {}
