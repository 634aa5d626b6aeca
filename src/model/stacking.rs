//! Stacking rule definitions (§4.3) shared by the roster validator and the
//! optimizer's incremental search — lives in `model` rather than
//! `optimizer::config` so [`crate::roster::validate`] can check invariant 4
//! without depending downward on C3.

use crate::model::player::Player;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A hard stacking constraint. `teams` restricts which teams the rule
/// applies to; empty means "any team/game observed in the lineup".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackingRule {
    pub rule_type: StackingRuleType,
    pub min_players: u8,
    pub max_players: u8,
    #[serde(default)]
    pub teams: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackingRuleType {
    Team,
    Game,
    Mini,
}

/// The counting key a player contributes to `rule`, or `None` if the player
/// is outside the rule's declared `teams` scope.
pub fn rule_key(rule: &StackingRule, player: &Player) -> Option<String> {
    if !rule.teams.is_empty() && !rule.teams.iter().any(|t| t == &player.team.0) {
        return None;
    }
    match rule.rule_type {
        StackingRuleType::Team | StackingRuleType::Mini => Some(player.team.0.clone()),
        StackingRuleType::Game => {
            let (a, b) = (&player.team.0, &player.opponent.0);
            Some(if a <= b { format!("{a}|{b}") } else { format!("{b}|{a}") })
        }
    }
}

/// Full structural check over a completed player set: the first violated
/// rule's human-readable detail, or `None` if every rule is satisfied. Used
/// both by [`crate::roster::validate`] (invariant 4) and by the optimizer's
/// leaf-level re-check once incremental counting completes a lineup.
pub fn check(rules: &[StackingRule], players: &[&Player]) -> Option<String> {
    for rule in rules {
        let mut counts: FxHashMap<String, u32> = FxHashMap::default();
        for p in players {
            if let Some(key) = rule_key(rule, p) {
                *counts.entry(key).or_insert(0) += 1;
            }
        }
        if rule.teams.is_empty() {
            if let Some((_, &c)) = counts.iter().find(|(_, &c)| c > rule.max_players as u32) {
                return Some(format!("more than {} players from one team/game (found {})", rule.max_players, c));
            }
        } else {
            let total: u32 = counts.values().sum();
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
