//! Ownership-weighted synthetic field generation for one simulation
//! iteration (the contest entries other than the lineups being evaluated).

use crate::model::{Contest, Player, PlayerId, PlayerPool, SlotAssignment};
use crate::roster;
use rand::Rng;
use rustc_hash::FxHashMap;

pub struct FieldLineup {
    pub assignments: Vec<SlotAssignment>,
    pub total_salary: u32,
}

struct SlotPlanEntry {
    tag: String,
    base_positions: Vec<String>,
}

fn flatten_slots(contest: &Contest) -> Vec<SlotPlanEntry> {
    let mut out = Vec::new();
    for req in &contest.position_requirements.0 {
        let base_positions = roster::eligibility(&req.slot_tag, contest.sport);
        for _ in 0..req.count {
            out.push(SlotPlanEntry { tag: req.slot_tag.clone(), base_positions: base_positions.clone() });
        }
    }
    out
}

/// Build one ownership-weighted synthetic lineup, retrying up to 100 times
/// before giving up on this entry (dropped field lineups are reported as
/// attrition, not an error).
pub fn generate_one(
    contest: &Contest,
    pool: &PlayerPool,
    ownership: &FxHashMap<PlayerId, f64>,
    cap: u32,
    rng: &mut impl Rng,
) -> Option<FieldLineup> {
    let slots = flatten_slots(contest);
    let no_excludes: FxHashMap<PlayerId, ()> = FxHashMap::default();
    for _attempt in 0..100 {
        if let Some(lineup) = try_build(&slots, pool, ownership, cap, &no_excludes, rng) {
            return Some(lineup);
        }
    }
    None
}

fn try_build(
    slots: &[SlotPlanEntry],
    pool: &PlayerPool,
    ownership: &FxHashMap<PlayerId, f64>,
    cap: u32,
    no_excludes: &FxHashMap<PlayerId, ()>,
    rng: &mut impl Rng,
) -> Option<FieldLineup> {
    let mut used: FxHashMap<PlayerId, ()> = FxHashMap::default();
    let mut assignments = Vec::with_capacity(slots.len());
    let mut total_salary: u32 = 0;
    for slot in slots {
        let candidates: Vec<&Player> = pool
            .eligible_for(&slot.base_positions, no_excludes)
            .filter(|p| !used.contains_key(&p.id))
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let weights: Vec<f64> = candidates
            .iter()
            .map(|p| ownership.get(&p.id).copied().unwrap_or(0.01).max(0.001))
            .collect();
        let pick = weighted_pick(&candidates, &weights, rng)?;
        if total_salary + pick.salary > cap {
            return None;
        }
        total_salary += pick.salary;
        used.insert(pick.id, ());
        assignments.push(SlotAssignment { slot_tag: slot.tag.clone(), player_id: pick.id });
    }
    Some(FieldLineup { assignments, total_salary })
}

fn weighted_pick<'a>(candidates: &[&'a Player], weights: &[f64], rng: &mut impl Rng) -> Option<&'a Player> {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return candidates.first().copied();
    }
    let mut target = rng.gen::<f64>() * total;
    for (player, &w) in candidates.iter().zip(weights.iter()) {
        if target < w {
            return Some(*player);
        }
        target -= w;
    }
    candidates.last().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContestType, Platform, Sport, TeamId};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

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

    fn player(id: u32, salary: u32) -> Player {
        Player {
            id: PlayerId(id),
            external_id: id.to_string(),
            name: format!("P{id}"),
            team: TeamId("T".to_string()),
            opponent: TeamId("OPP".to_string()),
            position: "G".to_string(),
            salary,
            projected_points: 10.0,
            floor_points: 5.0,
            ceiling_points: 15.0,
            ownership: 0.2,
            is_injured: false,
            batting_order: None,
        }
    }

    #[test]
    fn generates_a_complete_lineup_under_cap() {
        let contest = contest();
        let players: Vec<Player> = (0..12).map(|i| player(i, 6_000)).collect();
        let pool = PlayerPool::new(players);
        let ownership: FxHashMap<PlayerId, f64> = FxHashMap::default();
        let mut rng = StdRng::seed_from_u64(1);
        let lineup = generate_one(&contest, &pool, &ownership, contest.salary_cap, &mut rng).unwrap();
        assert_eq!(lineup.assignments.len(), 6);
        assert!(lineup.total_salary <= contest.salary_cap);
    }

    #[test]
    fn too_few_players_for_the_slot_plan_yields_none() {
        let contest = contest();
        let players: Vec<Player> = (0..3).map(|i| player(i, 6_000)).collect();
        let pool = PlayerPool::new(players);
        let ownership: FxHashMap<PlayerId, f64> = FxHashMap::default();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate_one(&contest, &pool, &ownership, contest.salary_cap, &mut rng).is_none());
    }
}
