//! Simulation configuration, status, and result types.
//!
//! Mirrors `optimizer::config`'s shape (itself grounded on `CFRConfig`):
//! `Serialize + Deserialize`, `Default`, chained builders, hand-rolled
//! `validate`.

use crate::error::InvalidConfig;
use crate::model::PlayerId;
use crate::warning::Warning;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// One payout interval: `minRank..=maxRank` all receive `payout`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoutTier {
    pub min_rank: u32,
    pub max_rank: u32,
    pub payout: f64,
}

/// Which built-in payout shape [`crate::simulator::payout::normalize`] should
/// derive when the caller doesn't supply an explicit structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayoutKind {
    Gpp,
    Cash,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub num_simulations: u32,
    pub use_correlations: bool,
    pub contest_size: u32,
    pub payout_kind: PayoutKind,
    /// Explicit tiers, bypassing the default GPP/cash derivation. Normalised
    /// the same way either way (§9 Design Decision 2).
    pub payout_structure: Option<Vec<PayoutTier>>,
    pub entry_fee: f64,
    pub prize_pool: f64,
    pub field_ownership_override: Option<HashMap<PlayerId, f64>>,
    pub master_seed: u64,
    /// Number of chunks `masterSeed`-driven work is partitioned into. `None`
    /// uses a fixed default rather than the live thread pool size, so chunk
    /// partitioning — and therefore the final result — doesn't depend on the
    /// machine a run happens to execute on.
    pub num_threads: Option<usize>,
    pub deadline: Option<Duration>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_simulations: 10_000,
            use_correlations: true,
            contest_size: 100,
            payout_kind: PayoutKind::Gpp,
            payout_structure: None,
            entry_fee: 5.0,
            prize_pool: 400.0,
            field_ownership_override: None,
            master_seed: 0,
            num_threads: None,
            deadline: None,
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_num_simulations(mut self, n: u32) -> Self {
        self.num_simulations = n;
        self
    }

    pub fn with_contest_size(mut self, n: u32) -> Self {
        self.contest_size = n;
        self
    }

    pub fn with_use_correlations(mut self, v: bool) -> Self {
        self.use_correlations = v;
        self
    }

    pub fn with_payout_kind(mut self, kind: PayoutKind) -> Self {
        self.payout_kind = kind;
        self
    }

    pub fn with_master_seed(mut self, seed: u64) -> Self {
        self.master_seed = seed;
        self
    }

    pub fn with_deadline(mut self, d: Duration) -> Self {
        self.deadline = Some(d);
        self
    }

    pub fn with_field_ownership_override(mut self, ownership: HashMap<PlayerId, f64>) -> Self {
        self.field_ownership_override = Some(ownership);
        self
    }

    pub fn validate(&self) -> Result<(), InvalidConfig> {
        if !(100..=100_000).contains(&self.num_simulations) {
            return Err(InvalidConfig::SimulationCountOutOfRange { value: self.num_simulations });
        }
        if self.contest_size == 0 {
            return Err(InvalidConfig::MalformedPayoutStructure {
                detail: "contestSize must be positive".to_string(),
            });
        }
        if let Some(tiers) = &self.payout_structure {
            for tier in tiers {
                if tier.min_rank == 0 || tier.min_rank > tier.max_rank {
                    return Err(InvalidConfig::MalformedPayoutStructure {
                        detail: format!("tier {}..={} is not a valid rank range", tier.min_rank, tier.max_rank),
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

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationStats {
    pub iterations_completed: u64,
    pub elapsed_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationStatus {
    Ok,
    Partial,
    Timeout,
    Cancelled,
}

/// Aggregated outcome distribution for one submitted lineup across every
/// completed iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineupSimulationResult {
    pub lineup_index: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub p01: f64,
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
    pub p99: f64,
    pub cash_probability: f64,
    pub win_probability: f64,
    pub top_1_percent_probability: f64,
    pub expected_roi: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub per_lineup: Vec<LineupSimulationResult>,
    pub stats: SimulationStats,
    pub status: SimulationStatus,
    pub warnings: Vec<Warning>,
}
