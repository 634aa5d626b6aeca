//! Objective scoring, computed once at each completed leaf (§9: the source's
//! mid-recursion double-accounting bug is explicitly not reproduced here).

use crate::correlation::CorrelationMatrix;
use crate::model::{Player, TeamId};
use crate::optimizer::config::ObjectiveMode;
use rustc_hash::FxHashMap;

/// Score a complete candidate lineup's player set under the configured
/// objective mode. `base_projection` is `Σ projection` over the assigned
/// players.
pub fn score(
    mode: ObjectiveMode,
    base_projection: f64,
    players: &[&Player],
    matrix: &CorrelationMatrix,
) -> f64 {
    match mode {
        ObjectiveMode::Projections => base_projection,
        ObjectiveMode::PairwiseMatrix { weight } => {
            base_projection + pairwise_bonus(players, matrix) * weight
        }
        ObjectiveMode::StackBonus { weight } => base_projection + stack_bonus(players, weight),
    }
}

fn pairwise_bonus(players: &[&Player], matrix: &CorrelationMatrix) -> f64 {
    let mut bonus = 0.0;
    for i in 0..players.len() {
        for j in (i + 1)..players.len() {
            bonus += matrix.get(players[i].id, players[j].id);
        }
    }
    bonus
}

/// Closed-form stack bonus: `log(k) * weight * 2` per team with `k >= 2`
/// players, `log(k) * weight * 3` per game with `k >= 3` players.
fn stack_bonus(players: &[&Player], weight: f64) -> f64 {
    let mut by_team: FxHashMap<&TeamId, u32> = FxHashMap::default();
    for p in players {
        *by_team.entry(&p.team).or_insert(0) += 1;
    }
    let mut bonus = 0.0;
    for &count in by_team.values() {
        if count >= 2 {
            bonus += (count as f64).ln() * weight * 2.0;
        }
    }

    // A "game" groups players whose (team, opponent) pair matches; TeamId
    // isn't Copy, so key on a small canonical string instead.
    let mut by_game_key: FxHashMap<String, u32> = FxHashMap::default();
    for p in players {
        let key = if p.team.0 <= p.opponent.0 {
            format!("{}|{}", p.team.0, p.opponent.0)
        } else {
            format!("{}|{}", p.opponent.0, p.team.0)
        };
        *by_game_key.entry(key).or_insert(0) += 1;
    }
    for &count in by_game_key.values() {
        if count >= 3 {
            bonus += (count as f64).ln() * weight * 3.0;
        }
    }
    bonus
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PlayerId, TeamId};

    fn player(id: u32, team: &str, opp: &str) -> Player {
        Player {
            id: PlayerId(id),
            external_id: id.to_string(),
            name: format!("P{id}"),
            team: TeamId(team.to_string()),
            opponent: TeamId(opp.to_string()),
            position: "X".to_string(),
            salary: 1000,
            projected_points: 10.0,
            floor_points: 5.0,
            ceiling_points: 15.0,
            ownership: 0.1,
            is_injured: false,
            batting_order: None,
        }
    }

    #[test]
    fn projections_mode_ignores_correlation() {
        let a = player(1, "BOS", "NYK");
        let b = player(2, "BOS", "NYK");
        let matrix = CorrelationMatrix::new();
        let s = score(ObjectiveMode::Projections, 20.0, &[&a, &b], &matrix);
        assert_eq!(s, 20.0);
    }

    #[test]
    fn stack_bonus_rewards_team_concentration() {
        let players: Vec<Player> = (0..3).map(|i| player(i, "BOS", "NYK")).collect();
        let refs: Vec<&Player> = players.iter().collect();
        let s = score(ObjectiveMode::StackBonus { weight: 1.0 }, 30.0, &refs, &CorrelationMatrix::new());
        assert!(s > 30.0);
    }
}
