//! Combat System
//!
//! Pairwise attack resolution. Damage is half the attacker's current
//! health; only the defender is affected.

use serde::{Deserialize, Serialize};

use crate::game::movement::TokenMap;
use crate::game::token::{Token, TokenId};

/// How an attack ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatResult {
    /// Defender took damage and survived.
    Hit,
    /// Defender died.
    Killed,
    /// Attack was not legal; nothing changed.
    Invalid,
}

/// Record of one attack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatOutcome {
    /// Outcome kind.
    pub result: CombatResult,
    /// Damage applied.
    pub damage_dealt: u8,
    /// Attacker.
    pub attacker_id: TokenId,
    /// Defender.
    pub defender_id: TokenId,
    /// Defender died from this attack.
    pub defender_killed: bool,
    /// Defender health afterwards.
    pub defender_health: u8,
}

/// Both alive, different owners, adjacent.
pub fn can_attack(attacker: &Token, defender: &Token) -> bool {
    attacker.is_alive
        && defender.is_alive
        && attacker.player_id != defender.player_id
        && attacker.is_adjacent_to(defender.position)
}

/// Resolve an attack, mutating only the defender.
pub fn resolve_combat(attacker: &Token, defender: &mut Token) -> CombatOutcome {
    if !can_attack(attacker, defender) {
        return CombatOutcome {
            result: CombatResult::Invalid,
            damage_dealt: 0,
            attacker_id: attacker.id,
            defender_id: defender.id,
            defender_killed: false,
            defender_health: defender.health,
        };
    }

    let damage = attacker.attack_power();
    let killed = defender.take_damage(damage);

    CombatOutcome {
        result: if killed { CombatResult::Killed } else { CombatResult::Hit },
        damage_dealt: damage,
        attacker_id: attacker.id,
        defender_id: defender.id,
        defender_killed: killed,
        defender_health: defender.health,
    }
}

/// Enemy tokens this attacker could hit right now, ascending by id.
pub fn get_attackable_targets(attacker: &Token, tokens: &TokenMap) -> Vec<TokenId> {
    tokens
        .values()
        .filter(|t| t.is_deployed && can_attack(attacker, t))
        .map(|t| t.id)
        .collect()
}

/// Damage an attack would deal, `None` if it is not legal.
pub fn calculate_damage_preview(attacker: &Token, defender: &Token) -> Option<u8> {
    can_attack(attacker, defender).then(|| attacker.attack_power())
}

/// Would this attack kill the defender?
pub fn would_kill(attacker: &Token, defender: &Token) -> bool {
    calculate_damage_preview(attacker, defender)
        .map_or(false, |damage| defender.health <= damage)
}

// =============================================================================
// TESTS
// =============================================================================
