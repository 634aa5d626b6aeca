//! Optimizer configuration, stats, and result types.
//!
//! Mirrors `cfr::config::CFRConfig`/`CFRStats`: a plain `Serialize +
//! Deserialize` struct with a `Default` impl, chained builder methods, and a
//! hand-rolled `validate`.

use crate::correlation::Stack;
use crate::model::{Lineup, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::InvalidConfig;

/// Re-exported from `model::stacking` so existing callers of
/// `optimizer::config::StackingRule` keep working; the type itself lives in
/// `model` so [`crate::roster::validate`] can check it too.
pub use crate::model::stacking::{StackingRule, StackingRuleType};

/// Exactly one correlation-bonus policy is used per call; mixing the
/// pairwise-matrix and closed-form stack-bonus models within a single
/// objective evaluation is the bug the source exhibited, and is not
/// representable here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObjectiveMode {
    Projections,
    PairwiseMatrix { weight: f64 },
    StackBonus { weight: f64 },
}

impl Default for ObjectiveMode {
    fn default() -> Self {
        ObjectiveMode::Projections
    }
}

/// Configuration for [`crate::optimizer::optimize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub salary_cap_override: Option<u32>,
    pub num_lineups: u32,
    pub min_different_players: u32,
    pub objective_mode: ObjectiveMode,
    pub stacking_rules: Vec<StackingRule>,
    pub locked_players: Vec<PlayerId>,
    pub excluded_players: Vec<PlayerId>,
    pub max_exposure: HashMap<PlayerId, f64>,
    pub min_exposure: HashMap<PlayerId, f64>,
    /// Oversampling multiplier for the candidate max-heap (`numLineups * D`).
    pub oversample_factor: u32,
    pub deadline: Option<Duration>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            salary_cap_override: None,
            num_lineups: 1,
            min_different_players: 0,
            objective_mode: ObjectiveMode::default(),
            stacking_rules: Vec::new(),
            locked_players: Vec::new(),
            excluded_players: Vec::new(),
            max_exposure: HashMap::new(),
            min_exposure: HashMap::new(),
            oversample_factor: 10,
            deadline: None,
        }
    }
}

impl OptimizerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_num_lineups(mut self, n: u32) -> Self {
        self.num_lineups = n;
        self
    }

    pub fn with_min_different_players(mut self, n: u32) -> Self {
        self.min_different_players = n;
        self
    }

    pub fn with_objective_mode(mut self, mode: ObjectiveMode) -> Self {
        self.objective_mode = mode;
        self
    }

    pub fn with_locked(mut self, players: Vec<PlayerId>) -> Self {
        self.locked_players = players;
        self
    }

    pub fn with_excluded(mut self, players: Vec<PlayerId>) -> Self {
        self.excluded_players = players;
        self
    }

    pub fn with_stacking_rules(mut self, rules: Vec<StackingRule>) -> Self {
        self.stacking_rules = rules;
        self
    }

    pub fn with_deadline(mut self, d: Duration) -> Self {
        self.deadline = Some(d);
        self
    }

    /// Validate config invariants, mirroring `CFRConfig::validate`.
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        if self.num_lineups < 1 {
            return Err(InvalidConfig::NumLineupsBelowOne);
        }
        if let Some(cap) = self.salary_cap_override {
            if cap == 0 {
                return Err(InvalidConfig::NegativeSalaryCap);
            }
        }
        for (player, &min) in &self.min_exposure {
            if let Some(&max) = self.max_exposure.get(player) {
                if min > max {
                    return Err(InvalidConfig::ExposureBoundsInverted {
                        player: *player,
                        min,
                        max,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigLoadError> {
        let text = fs::read_to_string(path).map_err(ConfigLoadError::Io)?;
        serde_json::from_str(&text).map_err(ConfigLoadError::Parse)
    }
}

/// Errors loading a config file from disk.
#[derive(Debug)]
pub enum ConfigLoadError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl std::fmt::Display for ConfigLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigLoadError::Io(e) => write!(f, "could not read config file: {}", e),
            ConfigLoadError::Parse(e) => write!(f, "could not parse config file: {}", e),
        }
    }
}

impl std::error::Error for ConfigLoadError {}

/// Statistics from one `optimize()` call, mirroring `CFRStats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptimizeStats {
    pub valid_combinations: u64,
    pub nodes_pruned: u64,
    pub elapsed_ms: f64,
}

pub use crate::warning::Warning;

/// Terminal status of an `optimize()` call. `UnsupportedCombination` and
/// `InvalidConfig` are pre-flight failures returned as `Err` before any
/// search starts (see [`crate::optimizer::OptimizeError`]); everything here
/// is a status reached *after* attempting the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizeStatus {
    Ok,
    Partial,
    Timeout,
    Cancelled,
    Infeasible,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeResult {
    pub lineups: Vec<Lineup>,
    pub stats: OptimizeStats,
    pub status: OptimizeStatus,
    pub warnings: Vec<Warning>,
    /// Set when `status == Infeasible`: the first slot/rule that made the
    /// search dead-end, in human terms (§4.3 edge cases).
    pub infeasible_reason: Option<String>,
    /// Informational stacks [`crate::correlation::candidates`] found in the
    /// player pool, independent of whether `objective_mode` used them to
    /// score lineups. Empty when no correlation matrix was built for this
    /// call.
    pub suggested_stacks: Vec<Stack>,
}
