//! Bucketed backtracking search (§4.3 points 1-6): pre-filter, slot
//! ordering, per-slot descending-value iteration with salary/objective
//! pruning, incremental stacking validation, and leaf scoring into a bounded
//! candidate heap. The diversity/exposure post-pass lives in
//! [`crate::optimizer::diversity`] and runs over this search's output.
//!
//! Design decision (teams-unscoped stacking rules): a rule with an empty
//! `teams` list caps every team/game it observes at `maxPlayers` but never
//! enforces `minPlayers` — there is no single team to measure a minimum
//! against without a concrete scope. A rule with `teams` set sums players
//! across exactly those teams and enforces the full `[min, max]` range
//! against that sum, which is what the QB-stack scenario needs.

use crate::cancel::CancellationHandle;
use crate::correlation::CorrelationMatrix;
use crate::model::stacking::rule_key;
use crate::model::{Contest, Lineup, Player, PlayerId, PlayerPool, SlotAssignment};
use crate::optimizer::config::{ObjectiveMode, OptimizerConfig, StackingRule};
use crate::optimizer::heap::BoundedLineupHeap;
use crate::optimizer::objective;
use crate::roster;
use rustc_hash::FxHashMap;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    Continue,
    Stop(StopReason),
}

#[derive(Default)]
struct SearchStats {
    valid_combinations: u64,
    nodes_pruned: u64,
}

pub struct SearchOutcome {
    pub heap: BoundedLineupHeap,
    pub valid_combinations: u64,
    pub nodes_pruned: u64,
    pub stop_reason: Option<StopReason>,
    /// Set when the search could not even attempt a full lineup (locks with
    /// no room, a slot with zero eligible candidates).
    pub infeasible_reason: Option<String>,
}

impl SearchOutcome {
    fn infeasible(reason: String) -> Self {
        Self {
            heap: BoundedLineupHeap::new(1),
            valid_combinations: 0,
            nodes_pruned: 0,
            stop_reason: None,
            infeasible_reason: Some(reason),
        }
    }
}

struct SlotInstance {
    tag: String,
    base_positions: Vec<String>,
}

/// Flatten the slot plan into one entry per physical slot, ordered per §4.3
/// point 2: mandatory base slots with fewest eligible players first, flex
/// slots last (also ascending by eligible count among themselves).
fn ordered_slots(contest: &Contest, pool: &PlayerPool, excluded: &FxHashMap<PlayerId, ()>) -> Vec<SlotInstance> {
    let mut flat: Vec<(bool, usize, SlotInstance)> = Vec::new();
    for req in &contest.position_requirements.0 {
        let base_positions = roster::eligibility(&req.slot_tag, contest.sport);
        let is_flex = !(base_positions.len() == 1 && base_positions[0] == req.slot_tag);
        let eligible_count = pool.eligible_for(&base_positions, excluded).count();
        for _ in 0..req.count {
            flat.push((
                is_flex,
                eligible_count,
                SlotInstance {
                    tag: req.slot_tag.clone(),
                    base_positions: base_positions.clone(),
                },
            ));
        }
    }
    flat.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
    flat.into_iter().map(|(_, _, slot)| slot).collect()
}

fn rule_would_exceed_max(rule: &StackingRule, counts: &FxHashMap<String, u32>, key: &str) -> bool {
    if rule.teams.is_empty() {
        counts.get(key).copied().unwrap_or(0) + 1 > rule.max_players as u32
    } else {
        let total: u32 = counts.values().sum();
        total + 1 > rule.max_players as u32
    }
}

fn rule_min_still_reachable(rule: &StackingRule, counts: &FxHashMap<String, u32>, remaining_slots: usize) -> bool {
    if rule.teams.is_empty() {
        return true;
    }
    let total: u32 = counts.values().sum();
    total as usize + remaining_slots >= rule.min_players as usize
}

/// Final check a completed lineup must pass; the incremental push-time check
/// only ever rejects max violations, so `minPlayers` is enforced here.
fn validate_stacking_rules_at_leaf(rules: &[StackingRule], rule_counts: &[FxHashMap<String, u32>]) -> Option<String> {
    for (rule, counted) in rules.iter().zip(rule_counts.iter()) {
        if rule.teams.is_empty() {
            if let Some((_, &c)) = counted.iter().find(|(_, &c)| c > rule.max_players as u32) {
                return Some(format!("more than {} players from one team/game (found {})", rule.max_players, c));
            }
        } else {
            let total: u32 = counted.values().sum();
            if total < rule.min_players as u32 || total > rule.max_players as u32 {
                return Some(format!(
                    "stacking rule for {:?} requires {}-{} players, found {}",
                    rule.teams, rule.min_players, rule.max_players, total
                ));
            }
        }
    }
    None
}

/// Run the backtracking search and return every candidate it found, bounded
/// by the oversampled heap.
pub fn search(
    contest: &Contest,
    pool: &PlayerPool,
    config: &OptimizerConfig,
    matrix: &CorrelationMatrix,
    cancel: &CancellationHandle,
) -> SearchOutcome {
    let cap = config.salary_cap_override.unwrap_or(contest.salary_cap);
    let excluded: FxHashMap<PlayerId, ()> = config.excluded_players.iter().map(|&p| (p, ())).collect();
    let slots = ordered_slots(contest, pool, &excluded);

    // Point 1: seed locked players into their base slot, earliest-available
    // eligible slot first.
    let mut preassigned: Vec<Option<PlayerId>> = vec![None; slots.len()];
    let mut locked_salary = 0u32;
    let mut used: FxHashMap<PlayerId, ()> = FxHashMap::default();
    let mut locks = config.locked_players.clone();
    locks.sort_unstable();
    for lid in locks {
        let player = match pool.get(lid) {
            Some(p) => p,
            None => return SearchOutcome::infeasible(format!("locked player {} is not in the pool", lid)),
        };
        let mut placed = false;
        for (i, slot) in slots.iter().enumerate() {
            if preassigned[i].is_some() {
                continue;
            }
            if slot.base_positions.iter().any(|bp| bp == &player.position) {
                preassigned[i] = Some(lid);
                used.insert(lid, ());
                locked_salary += player.salary;
                placed = true;
                break;
            }
        }
        if !placed {
            return SearchOutcome::infeasible(format!(
                "locked player {} has no available slot for position {}",
                lid, player.position
            ));
        }
    }
    if locked_salary > cap {
        return SearchOutcome::infeasible(format!(
            "locked players' combined salary {} exceeds the {} cap",
            locked_salary, cap
        ));
    }

    // Suffix lower/upper bounds for pruning, computed once over the full
    // pool. They're deliberately loose (ignoring cross-slot player reuse) —
    // a loose bound is still sound for pruning, just less aggressive.
    let mut min_salary_suffix = vec![0u32; slots.len() + 1];
    let mut max_proj_suffix = vec![0.0f64; slots.len() + 1];
    for i in (0..slots.len()).rev() {
        let (min_salary, max_proj) = if let Some(lid) = preassigned[i] {
            let p = pool.get(lid).expect("preassigned player exists");
            (p.salary, p.projected_points)
        } else {
            let mut min_s = u32::MAX;
            let mut max_p = f64::MIN;
            let mut any = false;
            for p in pool.eligible_for(&slots[i].base_positions, &excluded) {
                any = true;
                min_s = min_s.min(p.salary);
                max_p = max_p.max(p.projected_points);
            }
            if !any {
                return SearchOutcome::infeasible(format!("no eligible players remain for slot {}", slots[i].tag));
            }
            (min_s, max_p)
        };
        min_salary_suffix[i] = min_salary_suffix[i + 1] + min_salary;
        max_proj_suffix[i] = max_proj_suffix[i + 1] + max_proj;
    }

    let heap_capacity = (config.num_lineups as usize).max(1) * (config.oversample_factor.max(1) as usize);
    let mut heap = BoundedLineupHeap::new(heap_capacity);
    let mut rule_counts: Vec<FxHashMap<String, u32>> = config.stacking_rules.iter().map(|_| FxHashMap::default()).collect();
    let mut assigned: Vec<SlotAssignment> = Vec::with_capacity(slots.len());
    let mut stats = SearchStats::default();
    let deadline = config.deadline.map(|d| Instant::now() + d);

    let signal = recurse(
        &slots,
        0,
        &preassigned,
        pool,
        &mut assigned,
        &mut used,
        0,
        0.0,
        cap,
        &min_salary_suffix,
        &max_proj_suffix,
        &config.stacking_rules,
        &mut rule_counts,
        matrix,
        config.objective_mode,
        &mut heap,
        &mut stats,
        cancel,
        deadline,
        &excluded,
    );

    SearchOutcome {
        heap,
        valid_combinations: stats.valid_combinations,
        nodes_pruned: stats.nodes_pruned,
        stop_reason: match signal {
            Signal::Stop(reason) => Some(reason),
            Signal::Continue => None,
        },
        infeasible_reason: None,
    }
}

#[allow(clippy::too_many_arguments)]
fn recurse(
    slots: &[SlotInstance],
    idx: usize,
    preassigned: &[Option<PlayerId>],
    pool: &PlayerPool,
    assigned: &mut Vec<SlotAssignment>,
    used: &mut FxHashMap<PlayerId, ()>,
    salary_so_far: u32,
    proj_so_far: f64,
    cap: u32,
    min_salary_suffix: &[u32],
    max_proj_suffix: &[f64],
    rules: &[StackingRule],
    rule_counts: &mut Vec<FxHashMap<String, u32>>,
    matrix: &CorrelationMatrix,
    mode: ObjectiveMode,
    heap: &mut BoundedLineupHeap,
    stats: &mut SearchStats,
    cancel: &CancellationHandle,
    deadline: Option<Instant>,
    excluded: &FxHashMap<PlayerId, ()>,
) -> Signal {
    if cancel.is_cancelled() {
        return Signal::Stop(StopReason::Cancelled);
    }
    if let Some(dl) = deadline {
        if Instant::now() >= dl {
            return Signal::Stop(StopReason::Timeout);
        }
    }

    if idx == slots.len() {
        if validate_stacking_rules_at_leaf(rules, rule_counts).is_some() {
            stats.nodes_pruned += 1;
            return Signal::Continue;
        }
        let refs: Vec<&Player> = assigned.iter().filter_map(|a| pool.get(a.player_id)).collect();
        let objective = objective::score(mode, proj_so_far, &refs, matrix);
        heap.offer(Lineup {
            assignments: assigned.clone(),
            total_salary: salary_so_far,
            total_projection: proj_so_far,
            objective: Some(objective),
        });
        stats.valid_combinations += 1;
        return Signal::Continue;
    }

    if let Some(lid) = preassigned[idx] {
        let player = pool.get(lid).expect("preassigned player exists in pool");
        return place_and_recurse(
            slots,
            idx,
            preassigned,
            pool,
            assigned,
            used,
            salary_so_far,
            proj_so_far,
            cap,
            min_salary_suffix,
            max_proj_suffix,
            rules,
            rule_counts,
            matrix,
            mode,
            heap,
            stats,
            cancel,
            deadline,
            excluded,
            player,
        );
    }

    let mut candidates: Vec<&Player> = pool
        .eligible_for(&slots[idx].base_positions, excluded)
        .filter(|p| !used.contains_key(&p.id))
        .collect();
    candidates.sort_by(|a, b| b.value().partial_cmp(&a.value()).unwrap_or(std::cmp::Ordering::Equal));

    // The objective bound only holds when the objective is projections alone
    // (no correlation bonus the suffix sum doesn't account for).
    let worst_objective = if mode == ObjectiveMode::Projections {
        heap.worst_objective_if_full()
    } else {
        None
    };

    for player in candidates {
        if salary_so_far + player.salary + min_salary_suffix[idx + 1] > cap {
            stats.nodes_pruned += 1;
            continue;
        }
        if let Some(threshold) = worst_objective {
            if proj_so_far + player.projected_points + max_proj_suffix[idx + 1] <= threshold {
                stats.nodes_pruned += 1;
                continue;
            }
        }
        let signal = place_and_recurse(
            slots,
            idx,
            preassigned,
            pool,
            assigned,
            used,
            salary_so_far,
            proj_so_far,
            cap,
            min_salary_suffix,
            max_proj_suffix,
            rules,
            rule_counts,
            matrix,
            mode,
            heap,
            stats,
            cancel,
            deadline,
            excluded,
            player,
        );
        if signal != Signal::Continue {
            return signal;
        }
    }
    Signal::Continue
}

#[allow(clippy::too_many_arguments)]
fn place_and_recurse(
    slots: &[SlotInstance],
    idx: usize,
    preassigned: &[Option<PlayerId>],
    pool: &PlayerPool,
    assigned: &mut Vec<SlotAssignment>,
    used: &mut FxHashMap<PlayerId, ()>,
    salary_so_far: u32,
    proj_so_far: f64,
    cap: u32,
    min_salary_suffix: &[u32],
    max_proj_suffix: &[f64],
    rules: &[StackingRule],
    rule_counts: &mut Vec<FxHashMap<String, u32>>,
    matrix: &CorrelationMatrix,
    mode: ObjectiveMode,
    heap: &mut BoundedLineupHeap,
    stats: &mut SearchStats,
    cancel: &CancellationHandle,
    deadline: Option<Instant>,
    excluded: &FxHashMap<PlayerId, ()>,
    player: &Player,
) -> Signal {
    let keys: Vec<Option<String>> = rules.iter().map(|r| rule_key(r, player)).collect();
    for (i, key) in keys.iter().enumerate() {
        if let Some(key) = key {
            if rule_would_exceed_max(&rules[i], &rule_counts[i], key) {
                stats.nodes_pruned += 1;
                return Signal::Continue;
            }
        }
    }
    let mut touched: Vec<(usize, String)> = Vec::new();
    for (i, key) in keys.into_iter().enumerate() {
        if let Some(key) = key {
            *rule_counts[i].entry(key.clone()).or_insert(0) += 1;
            touched.push((i, key));
        }
    }

    let remaining_after = slots.len() - idx - 1;
    let feasible = rules
        .iter()
        .enumerate()
        .all(|(i, rule)| rule_min_still_reachable(rule, &rule_counts[i], remaining_after));

    assigned.push(SlotAssignment {
        slot_tag: slots[idx].tag.clone(),
        player_id: player.id,
    });
    used.insert(player.id, ());

    let signal = if feasible {
        recurse(
            slots,
            idx + 1,
            preassigned,
            pool,
            assigned,
            used,
            salary_so_far + player.salary,
            proj_so_far + player.projected_points,
            cap,
            min_salary_suffix,
            max_proj_suffix,
            rules,
            rule_counts,
            matrix,
            mode,
            heap,
            stats,
            cancel,
            deadline,
            excluded,
        )
    } else {
        stats.nodes_pruned += 1;
        Signal::Continue
    };

    assigned.pop();
    used.remove(&player.id);
    for (i, key) in touched {
        if let Some(c) = rule_counts[i].get_mut(&key) {
            *c -= 1;
            if *c == 0 {
                rule_counts[i].remove(&key);
            }
        }
    }
    signal
}
