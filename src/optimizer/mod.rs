//! Lineup Optimizer (C3): constraint-satisfaction lineup generation with
//! stacking, exposure, and diversity controls.
//!
//! [`optimize`] is the single public entry point; everything else in this
//! module is an implementation detail reachable through it.

mod backtrack;
pub mod config;
mod diversity;
mod heap;
mod objective;

pub use backtrack::StopReason;
pub use config::{ObjectiveMode, OptimizeResult, OptimizeStats, OptimizeStatus, OptimizerConfig, StackingRule, StackingRuleType, Warning};

use crate::cancel::CancellationHandle;
use crate::correlation::{self, CorrelationMatrix};
use crate::error::{InvalidConfig, RosterError};
use crate::model::{Contest, Player, PlayerPool};
use crate::progress::{ProgressEvent, ProgressHub, ProgressKind};
use crate::roster;
use std::fmt;
use std::time::Instant;

/// Pre-flight failures that prevent the search from starting at all.
/// `Infeasible` (a search was attempted and no lineup exists) is a status on
/// the success path instead, not a variant here — see
/// [`config::OptimizeStatus`].
#[derive(Debug, Clone, PartialEq)]
pub enum OptimizeError {
    UnsupportedCombination(RosterError),
    InvalidConfig(InvalidConfig),
}

impl fmt::Display for OptimizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizeError::UnsupportedCombination(e) => write!(f, "{}", e),
            OptimizeError::InvalidConfig(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for OptimizeError {}

impl From<RosterError> for OptimizeError {
    fn from(e: RosterError) -> Self {
        OptimizeError::UnsupportedCombination(e)
    }
}

impl From<InvalidConfig> for OptimizeError {
    fn from(e: InvalidConfig) -> Self {
        OptimizeError::InvalidConfig(e)
    }
}

/// Generate up to `config.num_lineups` ranked, diversified lineups for
/// `contest` from `pool`. `progress`, when given, receives a heartbeat at the
/// start and end of the search on the named topic.
pub fn optimize(
    contest: &Contest,
    pool: &PlayerPool,
    config: &OptimizerConfig,
    cancel: &CancellationHandle,
    progress: Option<(&ProgressHub, &str)>,
) -> Result<OptimizeResult, OptimizeError> {
    config.validate()?;
    roster::requirements_for(contest.sport, contest.platform)?;

    let started = Instant::now();
    let players: Vec<&Player> = pool.iter().collect();
    let uses_correlation = matches!(
        config.objective_mode,
        ObjectiveMode::PairwiseMatrix { .. } | ObjectiveMode::StackBonus { .. }
    );
    let matrix = if uses_correlation {
        correlation::build_matrix(&players, contest)
    } else {
        CorrelationMatrix::new()
    };
    // Informational only: independent of whether `objective_mode` scores
    // lineups with these stacks, surfaced so callers can inspect what the
    // pool supports. Golf needs tournament metadata this data model doesn't
    // carry, so its dispatch arm always sees `None` here.
    let suggested_stacks = if uses_correlation {
        correlation::candidates(contest.sport, &players, &matrix, None)
    } else {
        Vec::new()
    };

    publish_heartbeat(progress, 0, 1);

    let outcome = backtrack::search(contest, pool, config, &matrix, cancel);
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    if let Some(reason) = outcome.infeasible_reason {
        publish_heartbeat(progress, 1, 1);
        return Ok(OptimizeResult {
            lineups: Vec::new(),
            stats: OptimizeStats {
                valid_combinations: 0,
                nodes_pruned: 0,
                elapsed_ms,
            },
            status: OptimizeStatus::Infeasible,
            warnings: Vec::new(),
            infeasible_reason: Some(reason),
            suggested_stacks,
        });
    }

    let ranked = outcome.heap.into_sorted_vec();
    let stats = OptimizeStats {
        valid_combinations: outcome.valid_combinations,
        nodes_pruned: outcome.nodes_pruned,
        elapsed_ms,
    };

    if ranked.is_empty() {
        publish_heartbeat(progress, 1, 1);
        return Ok(OptimizeResult {
            lineups: Vec::new(),
            stats,
            status: OptimizeStatus::Infeasible,
            warnings: Vec::new(),
            infeasible_reason: Some(
                "no complete lineup satisfies the salary cap and stacking rules".to_string(),
            ),
            suggested_stacks,
        });
    }

    let diversity::DiversityOutcome { accepted, warnings } = diversity::enforce(ranked, config);

    let status = match outcome.stop_reason {
        Some(StopReason::Cancelled) => OptimizeStatus::Cancelled,
        Some(StopReason::Timeout) => OptimizeStatus::Timeout,
        None if accepted.len() < config.num_lineups as usize => OptimizeStatus::Partial,
        None => OptimizeStatus::Ok,
    };

    publish_heartbeat(progress, 1, 1);

    Ok(OptimizeResult {
        lineups: accepted,
        stats,
        status,
        warnings,
        infeasible_reason: None,
        suggested_stacks,
    })
}

fn publish_heartbeat(progress: Option<(&ProgressHub, &str)>, completed: u64, total: u64) {
    if let Some((hub, topic)) = progress {
        hub.publish(ProgressEvent {
            kind: ProgressKind::OptimizeHeartbeat,
            topic: topic.to_string(),
            completed,
            total,
            estimated_remaining_ms: 0.0,
            lineup_id: None,
        });
    }
}
