//! Pairwise correlation scoring (§4.2) and the symmetric correlation matrix.

use crate::model::{Contest, Player, PlayerId, Sport};
use rustc_hash::FxHashMap;

/// Canonicalized unordered pair, used as a map key so `(a, b)` and `(b, a)`
/// collide. Grounded on `RegretStorage`'s flat-map-over-string-key shape,
/// adapted to a numeric pair key instead of a hot-path hash-of-hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PairKey(PlayerId, PlayerId);

impl PairKey {
    fn new(a: PlayerId, b: PlayerId) -> Self {
        if a <= b {
            PairKey(a, b)
        } else {
            PairKey(b, a)
        }
    }
}

/// Symmetric mapping from unordered player-id pair to a correlation in
/// `[-1, 1]`, with an implicit diagonal of `1`.
#[derive(Debug, Clone, Default)]
pub struct CorrelationMatrix {
    values: FxHashMap<PairKey, f64>,
}

impl CorrelationMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, a: PlayerId, b: PlayerId, value: f64) {
        if a == b {
            return; // diagonal is implicitly 1, never stored
        }
        self.values.insert(PairKey::new(a, b), value.clamp(-1.0, 1.0));
    }

    /// Correlation between two players; `1.0` on the diagonal, `0.0` for any
    /// unrelated pair that was never scored.
    pub fn get(&self, a: PlayerId, b: PlayerId) -> f64 {
        if a == b {
            return 1.0;
        }
        self.values.get(&PairKey::new(a, b)).copied().unwrap_or(0.0)
    }

    pub fn pairs(&self) -> impl Iterator<Item = (PlayerId, PlayerId, f64)> + '_ {
        self.values.iter().map(|(k, &v)| (k.0, k.1, v))
    }
}

/// Build the full correlation matrix for a player pool under a contest's
/// sport, applying the generic policy plus the sport-specific overrides.
pub fn build_matrix(players: &[&Player], contest: &Contest) -> CorrelationMatrix {
    let mut matrix = CorrelationMatrix::new();
    for i in 0..players.len() {
        for j in (i + 1)..players.len() {
            let a = players[i];
            let b = players[j];
            let score = pairwise_score(a, b, contest.sport);
            if score != 0.0 {
                matrix.set(a.id, b.id, score);
            }
        }
    }
    matrix
}

/// Score a single unordered pair. Sport-specific overrides, when they match
/// a pair, replace the generic team/opponent/defensive-pairing score rather
/// than adding to it; otherwise the generic policy applies. Symmetric in
/// `(a, b)`.
pub fn pairwise_score(a: &Player, b: &Player, sport: Sport) -> f64 {
    let same_team = a.team == b.team;
    let opponents = a.team == b.opponent && b.team == a.opponent;

    if let Some(overridden) = sport_override(a, b, sport, same_team, opponents) {
        return overridden.clamp(-1.0, 1.0);
    }

    let mut score = 0.0f64;
    if same_team {
        score += 0.25;
        if a.position == b.position {
            score += 0.10;
        }
        score = score.min(0.35);
    }
    score.clamp(-1.0, 1.0)
}

fn sport_override(
    a: &Player,
    b: &Player,
    sport: Sport,
    same_team: bool,
    opponents: bool,
) -> Option<f64> {
    match sport {
        Sport::Nfl => nfl_override(a, b, same_team, opponents),
        Sport::Mlb => mlb_override(a, b, same_team, opponents),
        Sport::Nhl => nhl_override(a, b, same_team),
        Sport::Golf => None,
        Sport::Nba => None,
    }
}

fn is_pos(p: &Player, tag: &str) -> bool {
    p.position == tag
}

fn nfl_override(a: &Player, b: &Player, same_team: bool, opponents: bool) -> Option<f64> {
    if same_team {
        let other_if_qb = if is_pos(a, "QB") {
            Some(b)
        } else if is_pos(b, "QB") {
            Some(a)
        } else {
            None
        };
        if let Some(other) = other_if_qb {
            if is_pos(other, "WR") || is_pos(other, "TE") {
                return Some(0.45);
            }
            if is_pos(other, "RB") {
                return Some(0.20);
            }
        }
        if (is_pos(a, "RB") && is_pos(b, "WR")) || (is_pos(a, "WR") && is_pos(b, "RB")) {
            return Some(-0.10);
        }
        if (is_pos(a, "RB") && is_pos(b, "DST")) || (is_pos(a, "DST") && is_pos(b, "RB")) {
            return Some(0.30);
        }
        return None;
    }
    if opponents {
        let qb_bring_back = (is_pos(a, "QB") && (is_pos(b, "WR") || is_pos(b, "TE") || is_pos(b, "RB")))
            || (is_pos(b, "QB") && (is_pos(a, "WR") || is_pos(a, "TE") || is_pos(a, "RB")));
        if qb_bring_back {
            return Some(0.15); // bring-back
        }
    }
    None
}

fn mlb_override(a: &Player, b: &Player, same_team: bool, opponents: bool) -> Option<f64> {
    let a_pitcher = is_pos(a, "P");
    let b_pitcher = is_pos(b, "P");
    if same_team {
        if a_pitcher || b_pitcher {
            return Some(0.0); // pitcher and own-team hitters: no bonus
        }
        return Some(match (a.batting_order, b.batting_order) {
            (Some(oa), Some(ob)) if (oa as i16 - ob as i16).abs() == 1 => 0.35,
            (Some(_), Some(_)) => 0.0,
            _ => 0.20, // order unknown, assume plausible adjacency
        });
    }
    if opponents && (a_pitcher || b_pitcher) {
        return Some(-0.20);
    }
    None
}

fn nhl_override(a: &Player, b: &Player, same_team: bool) -> Option<f64> {
    if !same_team {
        return None;
    }
    let is_skater = |p: &Player| p.position == "C" || p.position == "W" || p.position == "D";
    if is_skater(a) && is_skater(b) {
        Some(0.15)
    } else {
        None
    }
}
