//! Stack enumeration (§4.2): sport-dispatched candidate generation, scored
//! and truncated to the top-N per kind.

use crate::correlation::pairwise::CorrelationMatrix;
use crate::model::{Player, PlayerId, Sport, TeamId};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Kind tag for a [`Stack`], mirroring the multiset-with-kind shape in §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StackKind {
    Team,
    Game,
    QbStack,
    Mini,
    Line,
    Country,
    OwnershipLeverage,
    StarsAndScrubs,
}

/// A candidate stack: a multiset of players with aggregate salary,
/// projection, and correlation score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stack {
    pub kind: StackKind,
    pub players: Vec<PlayerId>,
    pub total_salary: u32,
    pub total_projection: f64,
    pub correlation_score: f64,
}

impl Stack {
    fn score(&self, alpha: f64) -> f64 {
        self.total_projection + alpha * self.correlation_score
    }
}

fn alpha_for(kind: StackKind) -> f64 {
    match kind {
        StackKind::Team => 10.0,
        StackKind::Game => 15.0,
        StackKind::QbStack => 20.0,
        _ => 10.0,
    }
}

fn build_stack(kind: StackKind, players: &[&Player], matrix: &CorrelationMatrix) -> Stack {
    let total_salary = players.iter().map(|p| p.salary).sum();
    let total_projection = players.iter().map(|p| p.projected_points).sum();
    let mut correlation_score = 0.0;
    for i in 0..players.len() {
        for j in (i + 1)..players.len() {
            correlation_score += matrix.get(players[i].id, players[j].id);
        }
    }
    Stack {
        kind,
        players: players.iter().map(|p| p.id).collect(),
        total_salary,
        total_projection,
        correlation_score,
    }
}

/// Sort candidates by `projection + alpha * correlation` descending and keep
/// only the top `n` per kind.
fn top_n(mut candidates: Vec<Stack>, n: usize) -> Vec<Stack> {
    candidates.sort_by(|a, b| {
        b.score(alpha_for(b.kind))
            .partial_cmp(&a.score(alpha_for(a.kind)))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates.truncate(n);
    candidates
}

fn subsets_of_size<'a>(items: &[&'a Player], k: usize) -> Vec<Vec<&'a Player>> {
    if k == 0 || k > items.len() {
        return Vec::new();
    }
    let mut result = Vec::new();
    let mut combo = Vec::with_capacity(k);
    fn rec<'a>(items: &[&'a Player], start: usize, k: usize, combo: &mut Vec<&'a Player>, out: &mut Vec<Vec<&'a Player>>) {
        if combo.len() == k {
            out.push(combo.clone());
            return;
        }
        for i in start..items.len() {
            combo.push(items[i]);
            rec(items, i + 1, k, combo, out);
            combo.pop();
        }
    }
    rec(items, 0, k, &mut combo, &mut result);
    result
}

/// Team stacks: all size-`k` subsets of a team's players, `k` in
/// `[min_size, max_size]`, default top 20.
pub fn team_stacks(
    players: &[&Player],
    matrix: &CorrelationMatrix,
    min_size: usize,
    max_size: usize,
    top_n_per_kind: usize,
) -> Vec<Stack> {
    let mut by_team: FxHashMap<&TeamId, Vec<&Player>> = FxHashMap::default();
    for p in players {
        by_team.entry(&p.team).or_default().push(p);
    }
    let mut candidates = Vec::new();
    for team_players in by_team.values() {
        for k in min_size..=max_size.min(team_players.len()) {
            for subset in subsets_of_size(team_players, k) {
                candidates.push(build_stack(StackKind::Team, &subset, matrix));
            }
        }
    }
    top_n(candidates, top_n_per_kind)
}

/// Game stacks: subsets drawn from both teams in a game, requiring at least
/// one player from each side, default top 15.
pub fn game_stacks(
    players: &[&Player],
    matrix: &CorrelationMatrix,
    min_size: usize,
    max_size: usize,
    top_n_per_kind: usize,
) -> Vec<Stack> {
    let mut games: FxHashMap<(TeamId, TeamId), Vec<&Player>> = FxHashMap::default();
    for p in players {
        let key = if p.team.0 <= p.opponent.0 {
            (p.team.clone(), p.opponent.clone())
        } else {
            (p.opponent.clone(), p.team.clone())
        };
        games.entry(key).or_default().push(p);
    }
    let mut candidates = Vec::new();
    for ((team_a, _team_b), game_players) in games.iter() {
        for k in min_size..=max_size.min(game_players.len()) {
            for subset in subsets_of_size(game_players, k) {
                let has_a = subset.iter().any(|p| &p.team == team_a);
                let has_b = subset.iter().any(|p| &p.team != team_a);
                if has_a && has_b {
                    candidates.push(build_stack(StackKind::Game, &subset, matrix));
                }
            }
        }
    }
    top_n(candidates, top_n_per_kind)
}

/// NFL QB-stacks: `{QB} ∪ S` for `S ⊆ same-team {WR, TE}`, optionally with a
/// single bring-back player from the opposing team.
pub fn qb_stacks(players: &[&Player], matrix: &CorrelationMatrix, top_n_per_kind: usize) -> Vec<Stack> {
    let qbs: Vec<&Player> = players.iter().filter(|p| p.position == "QB").copied().collect();
    let mut candidates = Vec::new();
    for qb in qbs {
        let pass_catchers: Vec<&Player> = players
            .iter()
            .filter(|p| p.team == qb.team && (p.position == "WR" || p.position == "TE"))
            .copied()
            .collect();
        let bring_backs: Vec<&Player> = players
            .iter()
            .filter(|p| p.team == qb.opponent)
            .copied()
            .collect();

        for k in 1..=pass_catchers.len() {
            for subset in subsets_of_size(&pass_catchers, k) {
                let mut group = vec![qb];
                group.extend(subset);
                candidates.push(build_stack(StackKind::QbStack, &group, matrix));

                for bring_back in &bring_backs {
                    let mut with_bb = group.clone();
                    with_bb.push(bring_back);
                    candidates.push(build_stack(StackKind::QbStack, &with_bb, matrix));
                }
            }
        }
    }
    top_n(candidates, top_n_per_kind)
}

/// NHL line stacks: `{C, W1, W2}` tuples per team.
pub fn nhl_line_stacks(players: &[&Player], matrix: &CorrelationMatrix, top_n_per_kind: usize) -> Vec<Stack> {
    let mut by_team: FxHashMap<&TeamId, Vec<&Player>> = FxHashMap::default();
    for p in players {
        by_team.entry(&p.team).or_default().push(p);
    }
    let mut candidates = Vec::new();
    for team_players in by_team.values() {
        let centers: Vec<&Player> = team_players.iter().filter(|p| p.position == "C").copied().collect();
        let wingers: Vec<&Player> = team_players.iter().filter(|p| p.position == "W").copied().collect();
        for c in &centers {
            for pair in subsets_of_size(&wingers, 2) {
                let group = vec![*c, pair[0], pair[1]];
                candidates.push(build_stack(StackKind::Line, &group, matrix));
            }
        }
    }
    top_n(candidates, top_n_per_kind)
}

/// Tournament metadata `golf_stacks` needs and the base `Player`/`Contest`
/// model doesn't carry: tee-time wave and country per player, which players
/// are flagged as strong wind performers, and whether this tournament's
/// conditions make the wind bonus applicable.
#[derive(Debug, Clone, Default)]
pub struct GolfStackMetadata {
    pub wave_of: FxHashMap<PlayerId, String>,
    pub country_of: FxHashMap<PlayerId, String>,
    pub wind_performers: Vec<PlayerId>,
    pub windy_tournament: bool,
    pub group_size: usize,
    pub top_n_per_kind: usize,
}

/// Golf stack variants: same tee-time wave, same country/region, and
/// wind-performer co-membership (tournament-conditional), each scored with
/// the sport-specific bonuses from §4.2 since golf carries no team/opponent
/// relationship for the generic pairwise matrix to key off of.
pub fn golf_stacks(
    players: &[&Player],
    wave_of: &FxHashMap<PlayerId, String>,
    country_of: &FxHashMap<PlayerId, String>,
    wind_performers: &[PlayerId],
    windy_tournament: bool,
    group_size: usize,
    top_n_per_kind: usize,
) -> Vec<Stack> {
    let mut candidates = Vec::new();
    for subset in subsets_of_size(players, group_size) {
        let mut correlation_score = 0.0;
        for i in 0..subset.len() {
            for j in (i + 1)..subset.len() {
                let a = subset[i];
                let b = subset[j];
                let mut score = 0.0;
                if wave_of.get(&a.id) == wave_of.get(&b.id) && wave_of.contains_key(&a.id) {
                    score += 0.15;
                }
                if country_of.get(&a.id) == country_of.get(&b.id) && country_of.contains_key(&a.id) {
                    score += 0.175; // midpoint of the 0.15-0.20 range
                }
                if windy_tournament
                    && wind_performers.contains(&a.id)
                    && wind_performers.contains(&b.id)
                {
                    score += 0.20;
                }
                correlation_score += score;
            }
        }
        let total_salary = subset.iter().map(|p| p.salary).sum();
        let total_projection = subset.iter().map(|p| p.projected_points).sum();
        candidates.push(Stack {
            kind: StackKind::Country,
            players: subset.iter().map(|p| p.id).collect(),
            total_salary,
            total_projection,
            correlation_score,
        });
    }
    top_n(candidates, top_n_per_kind)
}

/// Single dispatch entry point: enumerate every stack kind applicable to a
/// sport. Callers wanting one specific kind should call the sport-specific
/// function directly instead. `golf_metadata` is only consulted for
/// `Sport::Golf`; pass `None` when tee-time/country/wind data isn't
/// available, which degrades to no golf stacks rather than a panic.
pub fn candidates(
    sport: Sport,
    players: &[&Player],
    matrix: &CorrelationMatrix,
    golf_metadata: Option<&GolfStackMetadata>,
) -> Vec<Stack> {
    match sport {
        Sport::Nfl => {
            let mut out = team_stacks(players, matrix, 2, 4, 20);
            out.extend(game_stacks(players, matrix, 2, 5, 15));
            out.extend(qb_stacks(players, matrix, 15));
            out
        }
        Sport::Nhl => {
            let mut out = team_stacks(players, matrix, 2, 4, 20);
            out.extend(nhl_line_stacks(players, matrix, 15));
            out
        }
        Sport::Nba | Sport::Mlb => {
            let mut out = team_stacks(players, matrix, 2, 4, 20);
            out.extend(game_stacks(players, matrix, 2, 5, 15));
            out
        }
        Sport::Golf => match golf_metadata {
            Some(meta) => golf_stacks(
                players,
                &meta.wave_of,
                &meta.country_of,
                &meta.wind_performers,
                meta.windy_tournament,
                meta.group_size,
                meta.top_n_per_kind,
            ),
            None => Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TeamId;

    fn player(id: u32, team: &str, opp: &str, pos: &str) -> Player {
        Player {
            id: PlayerId(id),
            external_id: id.to_string(),
            name: format!("P{id}"),
            team: TeamId(team.to_string()),
            opponent: TeamId(opp.to_string()),
            position: pos.to_string(),
            salary: 5000,
            projected_points: 20.0,
            floor_points: 10.0,
            ceiling_points: 30.0,
            ownership: 0.1,
            is_injured: false,
            batting_order: None,
        }
    }

    #[test]
    fn qb_stack_includes_qb_and_pass_catcher() {
        let qb = player(1, "BUF", "MIA", "QB");
        let wr1 = player(2, "BUF", "MIA", "WR");
        let wr2 = player(3, "BUF", "MIA", "WR");
        let filler = player(4, "NE", "NYJ", "RB");
        let pool = vec![&qb, &wr1, &wr2, &filler];
        let matrix = crate::correlation::pairwise::build_matrix(
            &pool,
            &crate::model::Contest {
                sport: Sport::Nfl,
                platform: crate::model::Platform::DraftKings,
                salary_cap: 50_000,
                position_requirements: Default::default(),
                contest_type: crate::model::ContestType::Gpp,
                total_entries: 100,
                entry_fee: 5.0,
                prize_pool: 400.0,
            },
        );
        let stacks = qb_stacks(&pool, &matrix, 15);
        assert!(!stacks.is_empty());
        assert!(stacks.iter().all(|s| s.players.contains(&qb.id)));
    }

    #[test]
    fn team_stack_respects_size_bounds() {
        let players: Vec<Player> = (0..5).map(|i| player(i, "BOS", "NYK", "PG")).collect();
        let refs: Vec<&Player> = players.iter().collect();
        let matrix = CorrelationMatrix::new();
        let stacks = team_stacks(&refs, &matrix, 2, 3, 100);
        assert!(stacks.iter().all(|s| s.players.len() >= 2 && s.players.len() <= 3));
    }

    #[test]
    fn golf_stack_rewards_shared_wave_and_country() {
        let players: Vec<Player> = (0..4).map(|i| player(i, "G", "G", "G")).collect();
        let refs: Vec<&Player> = players.iter().collect();

        let mut wave_of = FxHashMap::default();
        wave_of.insert(PlayerId(0), "AM".to_string());
        wave_of.insert(PlayerId(1), "AM".to_string());
        let mut country_of = FxHashMap::default();
        country_of.insert(PlayerId(0), "USA".to_string());
        country_of.insert(PlayerId(1), "USA".to_string());

        let stacks = golf_stacks(&refs, &wave_of, &country_of, &[], false, 2, 10);
        let shared_wave = stacks
            .iter()
            .find(|s| s.players.contains(&PlayerId(0)) && s.players.contains(&PlayerId(1)))
            .expect("pair with shared wave and country present");
        let unrelated = stacks
            .iter()
            .find(|s| s.players.contains(&PlayerId(2)) && s.players.contains(&PlayerId(3)))
            .expect("pair with no shared metadata present");
        assert!(shared_wave.correlation_score > unrelated.correlation_score);
    }

    #[test]
    fn dispatch_reaches_golf_stacks_via_metadata() {
        let players: Vec<Player> = (0..3).map(|i| player(i, "G", "G", "G")).collect();
        let refs: Vec<&Player> = players.iter().collect();
        let matrix = CorrelationMatrix::new();

        assert!(candidates(Sport::Golf, &refs, &matrix, None).is_empty());

        let meta = GolfStackMetadata {
            group_size: 2,
            top_n_per_kind: 10,
            ..Default::default()
        };
        let stacks = candidates(Sport::Golf, &refs, &matrix, Some(&meta));
        assert!(!stacks.is_empty());
        assert!(stacks.iter().all(|s| s.players.len() == 2));
    }
}
