//! Contest Simulator (C4): Monte Carlo outcome simulation for a set of
//! submitted lineups against a synthetic field.
//!
//! [`simulate`] is the single public entry point. Iterations are split into
//! chunks and run on `rayon`'s pool; each chunk owns an independently seeded
//! `StdRng` so results are reproducible given the same `masterSeed` and
//! thread count, and chunks fold into the final per-lineup statistics with
//! an associative merge so scheduling order never leaks into the numbers.

pub mod aggregate;
pub mod config;
pub mod copula;
pub mod distribution;
pub mod field;
pub mod payout;

pub use config::{
    LineupSimulationResult, PayoutKind, PayoutTier, SimulationConfig, SimulationResult, SimulationStats, SimulationStatus,
};

use crate::cancel::CancellationHandle;
use crate::correlation;
use crate::error::{InvalidConfig, SimulationFailed};
use crate::model::{Contest, Lineup, PlayerId, PlayerPool};
use crate::optimizer::StopReason;
use crate::progress::{ProgressEvent, ProgressHub, ProgressKind};
use aggregate::ChunkAccumulator;
use copula::CorrelatedSampler;
use distribution::PlayerDistribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

const PROGRESS_BATCH: u64 = 100;
const PUBLISH_INTERVAL_MS: u128 = 100;

/// Chunk count used when `config.num_threads` is unset. A fixed constant
/// rather than `rayon::current_num_threads()` so that `masterSeed`'s chunk
/// partitioning — and therefore the final `SimulationResult` — doesn't vary
/// with the machine a run happens to execute on.
const DEFAULT_SIMULATION_WORKERS: usize = 8;

/// Failures that can prevent [`simulate`] from producing a result.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulateError {
    InvalidConfig(InvalidConfig),
    NumericalFailure(SimulationFailed),
}

impl fmt::Display for SimulateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulateError::InvalidConfig(e) => write!(f, "{}", e),
            SimulateError::NumericalFailure(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SimulateError {}

impl From<InvalidConfig> for SimulateError {
    fn from(e: InvalidConfig) -> Self {
        SimulateError::InvalidConfig(e)
    }
}

impl From<SimulationFailed> for SimulateError {
    fn from(e: SimulationFailed) -> Self {
        SimulateError::NumericalFailure(e)
    }
}

/// Run `config.numSimulations` Monte Carlo iterations scoring every lineup
/// in `lineups` against a synthetic field drawn from `pool`.
pub fn simulate(
    contest: &Contest,
    lineups: &[Lineup],
    pool: &PlayerPool,
    config: &SimulationConfig,
    cancel: &CancellationHandle,
    progress: Option<(&ProgressHub, &str)>,
) -> Result<SimulationResult, SimulateError> {
    config.validate()?;
    let started = Instant::now();

    let distributions: FxHashMap<PlayerId, PlayerDistribution> = pool
        .iter()
        .map(|p| (p.id, PlayerDistribution::new(p.projected_points, p.floor_points, p.ceiling_points)))
        .collect();

    let ownership: FxHashMap<PlayerId, f64> = match &config.field_ownership_override {
        Some(map) => map.iter().map(|(&k, &v)| (k, v)).collect(),
        None => pool.iter().map(|p| (p.id, p.ownership)).collect(),
    };

    let sampler = if config.use_correlations {
        let players: Vec<&crate::model::Player> = pool.iter().collect();
        let matrix = correlation::build_matrix(&players, contest);
        let order: Vec<PlayerId> = pool.iter().map(|p| p.id).collect();
        Some(CorrelatedSampler::build(order, &matrix)?)
    } else {
        None
    };

    let tiers = payout::normalize(
        config.payout_structure.clone().unwrap_or_else(|| match config.payout_kind {
            PayoutKind::Gpp => payout::default_gpp(config.contest_size, config.prize_pool, config.entry_fee),
            PayoutKind::Cash => payout::default_cash(config.contest_size, config.entry_fee),
        }),
        config.contest_size,
    );

    let num_workers = config.num_threads.unwrap_or(DEFAULT_SIMULATION_WORKERS).max(1);
    let ranges = chunk_ranges(config.num_simulations, num_workers);

    let total_completed = Arc::new(AtomicU64::new(0));
    let last_publish = Arc::new(Mutex::new(Instant::now()));

    let chunk_results: Vec<(Vec<ChunkAccumulator>, u64, u64, Option<StopReason>)> = ranges
        .into_par_iter()
        .enumerate()
        .map(|(chunk_index, (start, end))| {
            run_chunk(
                chunk_index as u64,
                start,
                end,
                contest,
                lineups,
                pool,
                &distributions,
                &ownership,
                sampler.as_ref(),
                &tiers,
                config,
                cancel,
                started,
                &total_completed,
                &last_publish,
                progress,
            )
        })
        .collect();

    let mut totals: Vec<ChunkAccumulator> = (0..lineups.len()).map(|_| ChunkAccumulator::new()).collect();
    let mut dropped_total = 0u64;
    let mut completed_total = 0u64;
    let mut stop_reason: Option<StopReason> = None;
    for (accumulators, dropped, completed, chunk_stop) in chunk_results {
        for (acc, lineup_acc) in accumulators.into_iter().zip(totals.iter_mut()) {
            lineup_acc.merge(acc);
        }
        dropped_total += dropped;
        completed_total += completed;
        stop_reason = match (stop_reason, chunk_stop) {
            (Some(StopReason::Cancelled), _) | (_, Some(StopReason::Cancelled)) => Some(StopReason::Cancelled),
            (Some(r), None) | (None, Some(r)) => Some(r),
            (Some(a), Some(_)) => Some(a),
            (None, None) => None,
        };
    }

    let mut warnings = Vec::new();
    if let Some(w) = sampler.as_ref().and_then(|s| s.warning()) {
        warnings.push(w);
    }
    if dropped_total > 0 {
        warnings.push(crate::warning::Warning::FieldAttrition { dropped: dropped_total as u32 });
    }

    let per_lineup: Vec<LineupSimulationResult> = totals
        .into_iter()
        .enumerate()
        .map(|(i, acc)| acc.finish(i, config.entry_fee))
        .collect();

    let status = match stop_reason {
        Some(StopReason::Cancelled) => SimulationStatus::Cancelled,
        Some(StopReason::Timeout) => SimulationStatus::Timeout,
        None if completed_total < config.num_simulations as u64 => SimulationStatus::Partial,
        None => SimulationStatus::Ok,
    };

    if let Some((hub, topic)) = progress {
        publish(hub, topic, config.num_simulations as u64, config.num_simulations as u64, 0.0);
    }

    Ok(SimulationResult {
        per_lineup,
        stats: SimulationStats { iterations_completed: completed_total, elapsed_ms: started.elapsed().as_secs_f64() * 1000.0 },
        status,
        warnings,
    })
}

#[allow(clippy::too_many_arguments)]
fn run_chunk(
    chunk_index: u64,
    start: u32,
    end: u32,
    contest: &Contest,
    lineups: &[Lineup],
    pool: &PlayerPool,
    distributions: &FxHashMap<PlayerId, PlayerDistribution>,
    ownership: &FxHashMap<PlayerId, f64>,
    sampler: Option<&CorrelatedSampler>,
    tiers: &[PayoutTier],
    config: &SimulationConfig,
    cancel: &CancellationHandle,
    started: Instant,
    total_completed: &Arc<AtomicU64>,
    last_publish: &Arc<Mutex<Instant>>,
    progress: Option<(&ProgressHub, &str)>,
) -> (Vec<ChunkAccumulator>, u64, u64, Option<StopReason>) {
    let mut rng = StdRng::seed_from_u64(config.master_seed ^ chunk_index);
    let mut local: Vec<ChunkAccumulator> = (0..lineups.len()).map(|_| ChunkAccumulator::new()).collect();
    let deadline = config.deadline.map(|d| started + d);
    let mut dropped = 0u64;
    let mut completed = 0u64;
    let mut stop_reason = None;
    let mut since_publish = 0u64;

    for _ in start..end {
        if cancel.is_cancelled() {
            stop_reason = Some(StopReason::Cancelled);
            break;
        }
        if let Some(dl) = deadline {
            if Instant::now() >= dl {
                stop_reason = Some(StopReason::Timeout);
                break;
            }
        }

        let outcomes = sample_outcomes(sampler, distributions, &mut rng);
        let field_needed = (config.contest_size as usize).saturating_sub(lineups.len());
        let mut entries: Vec<ScoredEntry> = Vec::with_capacity(config.contest_size as usize);
        for (i, lineup) in lineups.iter().enumerate() {
            let score: f64 = lineup.player_ids().iter().map(|id| outcomes.get(id).copied().unwrap_or(0.0)).sum();
            entries.push(ScoredEntry { index: i, is_user: true, salary: lineup.total_salary, score });
        }
        for field_index in 0..field_needed {
            match field::generate_one(contest, pool, ownership, contest.salary_cap, &mut rng) {
                Some(field_lineup) => {
                    let score: f64 = field_lineup
                        .assignments
                        .iter()
                        .map(|a| outcomes.get(&a.player_id).copied().unwrap_or(0.0))
                        .sum();
                    entries.push(ScoredEntry {
                        index: lineups.len() + field_index,
                        is_user: false,
                        salary: field_lineup.total_salary,
                        score,
                    });
                }
                None => dropped += 1,
            }
        }

        entries.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.salary.cmp(&b.salary))
                .then(a.index.cmp(&b.index))
        });
        let field_size = entries.len() as u32;
        for (rank0, entry) in entries.iter().enumerate() {
            if entry.is_user {
                let rank = rank0 as u32 + 1;
                let payout = payout::payout_for_rank(tiers, rank);
                local[entry.index].record(entry.score, payout, rank, field_size);
            }
        }

        completed += 1;
        since_publish += 1;
        if since_publish >= PROGRESS_BATCH {
            let total = total_completed.fetch_add(since_publish, Ordering::Relaxed) + since_publish;
            since_publish = 0;
            maybe_publish(last_publish, progress, total, config.num_simulations as u64, started);
        }
    }

    if since_publish > 0 {
        let total = total_completed.fetch_add(since_publish, Ordering::Relaxed) + since_publish;
        maybe_publish(last_publish, progress, total, config.num_simulations as u64, started);
    }

    (local, dropped, completed, stop_reason)
}

struct ScoredEntry {
    index: usize,
    is_user: bool,
    salary: u32,
    score: f64,
}

fn sample_outcomes(
    sampler: Option<&CorrelatedSampler>,
    distributions: &FxHashMap<PlayerId, PlayerDistribution>,
    rng: &mut impl Rng,
) -> FxHashMap<PlayerId, f64> {
    match sampler {
        Some(sampler) => {
            let z = sampler.sample(rng);
            sampler
                .order()
                .iter()
                .zip(z.iter())
                .filter_map(|(&id, &zi)| distributions.get(&id).map(|dist| (id, dist.inverse_from_standard_normal(zi))))
                .collect()
        }
        None => distributions.iter().map(|(&id, dist)| (id, dist.sample(rng))).collect(),
    }
}

fn chunk_ranges(total: u32, chunks: usize) -> Vec<(u32, u32)> {
    let chunks = chunks.max(1);
    let base = total / chunks as u32;
    let rem = total % chunks as u32;
    let mut out = Vec::with_capacity(chunks);
    let mut start = 0u32;
    for i in 0..chunks {
        let size = base + u32::from((i as u32) < rem);
        if size == 0 {
            continue;
        }
        out.push((start, start + size));
        start += size;
    }
    out
}

fn maybe_publish(last: &Mutex<Instant>, progress: Option<(&ProgressHub, &str)>, completed: u64, total: u64, started: Instant) {
    let Some((hub, topic)) = progress else { return };
    let mut guard = last.lock().unwrap();
    if guard.elapsed().as_millis() < PUBLISH_INTERVAL_MS {
        return;
    }
    *guard = Instant::now();
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    let remaining = if completed > 0 {
        elapsed_ms * (total.saturating_sub(completed)) as f64 / completed as f64
    } else {
        0.0
    };
    publish(hub, topic, completed, total, remaining);
}

fn publish(hub: &ProgressHub, topic: &str, completed: u64, total: u64, estimated_remaining_ms: f64) {
    hub.publish(ProgressEvent {
        kind: ProgressKind::SimulationChunk,
        topic: topic.to_string(),
        completed,
        total,
        estimated_remaining_ms,
        lineup_id: None,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContestType, Platform, Player, SlotAssignment, Sport, TeamId};
    use std::collections::HashMap;

    fn contest() -> Contest {
        Contest {
            sport: Sport::Golf,
            platform: Platform::DraftKings,
            salary_cap: 50_000,
            position_requirements: crate::roster::requirements_for(Sport::Golf, Platform::DraftKings).unwrap(),
            contest_type: ContestType::Gpp,
            total_entries: 100,
            entry_fee: 5.0,
            prize_pool: 400.0,
        }
    }

    fn player(id: u32, proj: f64) -> Player {
        Player {
            id: PlayerId(id),
            external_id: id.to_string(),
            name: format!("P{id}"),
            team: TeamId("T".to_string()),
            opponent: TeamId("OPP".to_string()),
            position: "G".to_string(),
            salary: 6_000,
            projected_points: proj,
            floor_points: proj * 0.5,
            ceiling_points: proj * 1.5,
            ownership: 0.15,
            is_injured: false,
            batting_order: None,
        }
    }

    fn pool() -> PlayerPool {
        PlayerPool::new((0..12).map(|i| player(i, 10.0 + i as f64)).collect())
    }

    fn lineup(ids: &[u32], salary: u32) -> Lineup {
        Lineup {
            assignments: ids
                .iter()
                .map(|&id| SlotAssignment { slot_tag: "G".to_string(), player_id: PlayerId(id) })
                .collect(),
            total_salary: salary,
            total_projection: 0.0,
            objective: None,
        }
    }

    #[test]
    fn simulate_completes_every_iteration_and_reports_ok() {
        let contest = contest();
        let pool = pool();
        let lineups = vec![lineup(&[0, 1, 2, 3, 4, 5], 36_000)];
        let config = SimulationConfig::new().with_num_simulations(200).with_contest_size(20);
        let cancel = CancellationHandle::new();
        let result = simulate(&contest, &lineups, &pool, &config, &cancel, None).unwrap();
        assert_eq!(result.status, SimulationStatus::Ok);
        assert_eq!(result.stats.iterations_completed, 200);
        assert_eq!(result.per_lineup.len(), 1);
        assert!(result.per_lineup[0].mean > 0.0);
    }

    #[test]
    fn cancelling_mid_run_yields_cancelled_status_with_partial_progress() {
        let contest = contest();
        let pool = pool();
        let lineups = vec![lineup(&[0, 1, 2, 3, 4, 5], 36_000)];
        let config = SimulationConfig::new().with_num_simulations(5_000).with_contest_size(20);
        let cancel = CancellationHandle::new();
        cancel.cancel();
        let result = simulate(&contest, &lineups, &pool, &config, &cancel, None).unwrap();
        assert_eq!(result.status, SimulationStatus::Cancelled);
        assert!(result.stats.iterations_completed < 5_000);
    }

    #[test]
    fn invalid_config_is_rejected_before_simulating() {
        let contest = contest();
        let pool = pool();
        let config = SimulationConfig::new().with_num_simulations(1);
        let cancel = CancellationHandle::new();
        let err = simulate(&contest, &[], &pool, &config, &cancel, None).unwrap_err();
        assert!(matches!(err, SimulateError::InvalidConfig(InvalidConfig::SimulationCountOutOfRange { .. })));
    }

    /// Cash-game contest where floor == ceiling == projection: every draw is
    /// deterministic, so the user's rank (and thus cash/no-cash) is knowable
    /// analytically ahead of time, independent of `masterSeed`.
    fn deterministic_player(id: u32, proj: f64) -> Player {
        Player {
            id: PlayerId(id),
            external_id: id.to_string(),
            name: format!("P{id}"),
            team: TeamId("T".to_string()),
            opponent: TeamId("OPP".to_string()),
            position: "G".to_string(),
            salary: 6_000,
            projected_points: proj,
            floor_points: proj,
            ceiling_points: proj,
            ownership: 0.15,
            is_injured: false,
            batting_order: None,
        }
    }

    #[test]
    fn cash_game_with_best_lineup_always_cashes() {
        let contest = contest();
        // The user's lineup has a strictly higher per-player projection than
        // every field candidate, so with zero variance it wins every
        // iteration outright and must cash under a top-half cash structure.
        let mut players: Vec<Player> = (0..12).map(|i| deterministic_player(i, 5.0)).collect();
        for p in players.iter_mut().take(6) {
            p.projected_points = 50.0;
            p.floor_points = 50.0;
            p.ceiling_points = 50.0;
        }
        let pool = PlayerPool::new(players);
        let lineups = vec![lineup(&[0, 1, 2, 3, 4, 5], 36_000)];
        let config = SimulationConfig::new()
            .with_num_simulations(10_000)
            .with_contest_size(10)
            .with_payout_kind(PayoutKind::Cash)
            .with_master_seed(7);
        let cancel = CancellationHandle::new();
        let result = simulate(&contest, &lineups, &pool, &config, &cancel, None).unwrap();
        assert_eq!(result.status, SimulationStatus::Ok);
        assert_eq!(result.per_lineup[0].cash_probability, 1.0);
    }

    #[test]
    fn cash_game_with_worst_lineup_never_cashes() {
        let contest = contest();
        // The user's lineup draws the 6 lowest-projected players; every other
        // player in the pool scores far higher and is weighted so heavily in
        // field generation that the field overwhelms the user's score on
        // every iteration, keeping the user out of the top half.
        let mut players: Vec<Player> = (0..12).map(|i| deterministic_player(i, 50.0)).collect();
        let mut ownership = HashMap::new();
        for p in players.iter_mut().take(6) {
            p.projected_points = 5.0;
            p.floor_points = 5.0;
            p.ceiling_points = 5.0;
            ownership.insert(p.id, 0.0001);
        }
        for p in players.iter().skip(6) {
            ownership.insert(p.id, 1.0);
        }
        let pool = PlayerPool::new(players);
        let lineups = vec![lineup(&[0, 1, 2, 3, 4, 5], 36_000)];
        let config = SimulationConfig::new()
            .with_num_simulations(10_000)
            .with_contest_size(10)
            .with_payout_kind(PayoutKind::Cash)
            .with_master_seed(7)
            .with_field_ownership_override(ownership);
        let cancel = CancellationHandle::new();
        let result = simulate(&contest, &lineups, &pool, &config, &cancel, None).unwrap();
        assert_eq!(result.status, SimulationStatus::Ok);
        assert_eq!(result.per_lineup[0].cash_probability, 0.0);
    }

    #[test]
    fn correlated_pair_has_higher_variance_than_independent_pair() {
        let contest = Contest {
            sport: Sport::Nfl,
            platform: Platform::DraftKings,
            salary_cap: 50_000,
            position_requirements: crate::roster::requirements_for(Sport::Nfl, Platform::DraftKings).unwrap(),
            contest_type: ContestType::Gpp,
            total_entries: 100,
            entry_fee: 5.0,
            prize_pool: 400.0,
        };
        let make_players = |same_team: bool| {
            let qb = Player {
                id: PlayerId(0),
                external_id: "0".to_string(),
                name: "QB".to_string(),
                team: TeamId("BUF".to_string()),
                opponent: TeamId("MIA".to_string()),
                position: "QB".to_string(),
                salary: 7000,
                projected_points: 20.0,
                floor_points: 10.0,
                ceiling_points: 30.0,
                ownership: 0.2,
                is_injured: false,
                batting_order: None,
            };
            let wr = Player {
                id: PlayerId(1),
                external_id: "1".to_string(),
                name: "WR".to_string(),
                team: TeamId(if same_team { "BUF".to_string() } else { "NE".to_string() }),
                opponent: TeamId("MIA".to_string()),
                position: "WR".to_string(),
                salary: 6000,
                projected_points: 15.0,
                floor_points: 5.0,
                ceiling_points: 25.0,
                ownership: 0.15,
                is_injured: false,
                batting_order: None,
            };
            vec![qb, wr]
        };
        let lineup = Lineup {
            assignments: vec![
                SlotAssignment { slot_tag: "QB".to_string(), player_id: PlayerId(0) },
                SlotAssignment { slot_tag: "WR".to_string(), player_id: PlayerId(1) },
            ],
            total_salary: 13_000,
            total_projection: 35.0,
            objective: None,
        };
        let run = |same_team: bool| {
            let pool = PlayerPool::new(make_players(same_team));
            let config = SimulationConfig::new()
                .with_num_simulations(5_000)
                .with_contest_size(2)
                .with_use_correlations(true)
                .with_master_seed(11);
            simulate(&contest, &[lineup.clone()], &pool, &config, &CancellationHandle::new(), None).unwrap()
        };
        let correlated = run(true);
        let independent = run(false);
        assert!(correlated.per_lineup[0].std_dev > independent.per_lineup[0].std_dev);
    }

    #[test]
    fn same_seed_and_config_produce_bit_identical_results() {
        let contest = contest();
        let pool = pool();
        let lineups = vec![lineup(&[0, 1, 2, 3, 4, 5], 36_000)];
        let config = SimulationConfig::new().with_num_simulations(500).with_contest_size(20).with_master_seed(99);
        let a = simulate(&contest, &lineups, &pool, &config, &CancellationHandle::new(), None).unwrap();
        let b = simulate(&contest, &lineups, &pool, &config, &CancellationHandle::new(), None).unwrap();
        assert_eq!(a.stats.iterations_completed, b.stats.iterations_completed);
        assert_eq!(a.per_lineup.len(), b.per_lineup.len());
        for (x, y) in a.per_lineup.iter().zip(b.per_lineup.iter()) {
            assert_eq!(x.mean, y.mean);
            assert_eq!(x.std_dev, y.std_dev);
            assert_eq!(x.p01, y.p01);
            assert_eq!(x.p50, y.p50);
            assert_eq!(x.p99, y.p99);
            assert_eq!(x.cash_probability, y.cash_probability);
            assert_eq!(x.expected_roi, y.expected_roi);
        }
    }
}
