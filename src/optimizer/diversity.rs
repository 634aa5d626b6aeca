//! Diversity & exposure post-pass (§4.3 point 7): walk the oversampled
//! candidate heap in descending objective order, accepting lineups that
//! respect the Hamming-distance floor and per-player exposure ceiling, then
//! greedily repair any unmet exposure floor.
//!
//! Exposure is measured against the running accepted count at the moment
//! each candidate is considered, not a final count fixed in advance — the
//! set being built is exactly what "current" means in an online accept/reject
//! pass over a single ranked candidate stream.

use crate::model::{Lineup, PlayerId};
use crate::optimizer::config::{OptimizerConfig, Warning};
use rustc_hash::FxHashMap;
use std::collections::HashSet;

pub struct DiversityOutcome {
    pub accepted: Vec<Lineup>,
    pub warnings: Vec<Warning>,
}

/// `candidates` must already be sorted best-objective-first (the shape
/// [`crate::optimizer::heap::BoundedLineupHeap::into_sorted_vec`] returns).
pub fn enforce(candidates: Vec<Lineup>, config: &OptimizerConfig) -> DiversityOutcome {
    let target = config.num_lineups as usize;
    let mut accepted: Vec<Lineup> = Vec::with_capacity(target);
    let mut remaining: Vec<Lineup> = Vec::new();
    let mut exposure: FxHashMap<PlayerId, u32> = FxHashMap::default();

    for candidate in candidates {
        if accepted.len() >= target {
            remaining.push(candidate);
            continue;
        }
        if !passes_diversity(&candidate, &accepted, config.min_different_players) {
            remaining.push(candidate);
            continue;
        }
        if !passes_max_exposure(&candidate, &exposure, accepted.len() as u32 + 1, config) {
            remaining.push(candidate);
            continue;
        }
        record_exposure(&mut exposure, &candidate, 1);
        accepted.push(candidate);
    }

    let mut warnings = Vec::new();
    if !config.min_exposure.is_empty() {
        repair_min_exposure(&mut accepted, &mut exposure, &mut remaining, config, &mut warnings);
    }

    DiversityOutcome { accepted, warnings }
}

fn record_exposure(exposure: &mut FxHashMap<PlayerId, u32>, lineup: &Lineup, delta: i32) {
    for pid in lineup.player_ids() {
        let entry = exposure.entry(pid).or_insert(0);
        if delta >= 0 {
            *entry += delta as u32;
        } else {
            *entry = entry.saturating_sub((-delta) as u32);
        }
    }
}

fn passes_diversity(candidate: &Lineup, accepted: &[Lineup], min_different: u32) -> bool {
    if min_different == 0 {
        return true;
    }
    let new_ids: HashSet<PlayerId> = candidate.player_ids().into_iter().collect();
    accepted.iter().all(|prev| {
        let prev_ids: HashSet<PlayerId> = prev.player_ids().into_iter().collect();
        new_ids.difference(&prev_ids).count() as u32 >= min_different
    })
}

fn passes_max_exposure(
    candidate: &Lineup,
    exposure: &FxHashMap<PlayerId, u32>,
    prospective_total: u32,
    config: &OptimizerConfig,
) -> bool {
    if config.max_exposure.is_empty() {
        return true;
    }
    candidate.player_ids().iter().all(|pid| match config.max_exposure.get(pid) {
        Some(&max) => {
            let count = exposure.get(pid).copied().unwrap_or(0) + 1;
            count as f64 / prospective_total as f64 <= max + 1e-9
        }
        None => true,
    })
}

/// Bounded greedy repair: up to three rounds, each round tries to swap in a
/// leftover candidate carrying an under-exposed player in place of the
/// lowest-objective accepted lineup that doesn't carry that player.
fn repair_min_exposure(
    accepted: &mut Vec<Lineup>,
    exposure: &mut FxHashMap<PlayerId, u32>,
    remaining: &mut Vec<Lineup>,
    config: &OptimizerConfig,
    warnings: &mut Vec<Warning>,
) {
    let total = accepted.len().max(1) as f64;
    for _round in 0..3 {
        let mut swapped = false;
        for (&player, &target) in config.min_exposure.iter() {
            let achieved = exposure.get(&player).copied().unwrap_or(0) as f64 / total;
            if achieved + 1e-9 >= target {
                continue;
            }
            let Some(pos) = remaining.iter().position(|l| l.contains(player)) else {
                continue;
            };
            let Some(evict_pos) = accepted.iter().rposition(|l| !l.contains(player)) else {
                continue;
            };
            let swap_in = remaining.remove(pos);
            let evicted = accepted.remove(evict_pos);
            record_exposure(exposure, &evicted, -1);
            record_exposure(exposure, &swap_in, 1);
            accepted.push(swap_in);
            remaining.push(evicted);
            swapped = true;
        }
        if !swapped {
            break;
        }
    }

    for (&player, &target) in config.min_exposure.iter() {
        let achieved = exposure.get(&player).copied().unwrap_or(0) as f64 / total;
        if achieved + 1e-9 < target {
            warnings.push(Warning::MinExposureUnsatisfied {
                player,
                achieved,
                target,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SlotAssignment;
    use std::collections::HashMap;

    fn lineup(ids: &[u32], objective: f64) -> Lineup {
        Lineup {
            assignments: ids
                .iter()
                .map(|&id| SlotAssignment {
                    slot_tag: "S".to_string(),
                    player_id: PlayerId(id),
                })
                .collect(),
            total_salary: 1000,
            total_projection: objective,
            objective: Some(objective),
        }
    }

    #[test]
    fn rejects_candidates_too_similar_to_an_accepted_lineup() {
        let candidates = vec![lineup(&[1, 2, 3], 30.0), lineup(&[1, 2, 4], 28.0), lineup(&[5, 6, 7], 20.0)];
        let config = OptimizerConfig::new().with_num_lineups(2).with_min_different_players(2);
        let outcome = enforce(candidates, &config);
        assert_eq!(outcome.accepted.len(), 2);
        assert_eq!(outcome.accepted[0].player_ids(), vec![PlayerId(1), PlayerId(2), PlayerId(3)]);
        assert_eq!(outcome.accepted[1].player_ids(), vec![PlayerId(5), PlayerId(6), PlayerId(7)]);
    }

    #[test]
    fn max_exposure_caps_how_often_a_player_is_accepted() {
        let candidates = vec![
            lineup(&[1, 2], 30.0),
            lineup(&[1, 3], 29.0),
            lineup(&[1, 4], 28.0),
            lineup(&[5, 6], 10.0),
        ];
        let mut max_exposure = HashMap::new();
        max_exposure.insert(PlayerId(1), 0.5);
        let config = OptimizerConfig {
            num_lineups: 3,
            min_different_players: 0,
            max_exposure,
            ..OptimizerConfig::new()
        };
        let outcome = enforce(candidates, &config);
        let player_one_count = outcome.accepted.iter().filter(|l| l.contains(PlayerId(1))).count();
        assert!((player_one_count as f64 / outcome.accepted.len() as f64) <= 0.5 + 1e-9);
    }

    #[test]
    fn unsatisfiable_min_exposure_produces_a_warning_not_an_error() {
        let candidates = vec![lineup(&[1, 2], 30.0), lineup(&[1, 3], 29.0)];
        let mut min_exposure = HashMap::new();
        min_exposure.insert(PlayerId(9), 1.0); // player 9 never appears in any candidate
        let config = OptimizerConfig {
            num_lineups: 2,
            min_exposure,
            ..OptimizerConfig::new()
        };
        let outcome = enforce(candidates, &config);
        assert!(outcome.warnings.iter().any(|w| matches!(w, Warning::MinExposureUnsatisfied { player, .. } if *player == PlayerId(9))));
    }
}
