//! Target scoring for computer-controlled units.
//!
//! # Score Formula
//!
//! ```text
//! value = is_possible × situation × modifier / 100
//! ```
//!
//! `situation` ranks the target for the attack kind (see [`score_target`]);
//! `modifier` is 100 unless protections make the attack likely to be wasted.

use crate::attack::AttackTarget;
use crate::config::BattleConfig;
use crate::state::{
    AttackKind, AttackReach, BattleState, ProtectionCategory, ProtectionTarget, TargetSide, Unit,
    UnitAttack,
};

/// Situation of a finishing blow, above any hit point based ranking.
const KILL_BONUS: u32 = 20_000;
/// Upper bound of hit point and threat based situations.
const SCALE: u32 = 10_000;

/// Score of one attack on one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    /// The attack has something to do on the target.
    pub is_possible: bool,

    /// How good the target is for this attack kind.
    pub situation: u32,

    /// Contextual adjustment (0-200, typically 100).
    ///
    /// A ward on the target halves it; an immunity makes the score impossible.
    pub modifier: u32,
}

impl Score {
    pub const fn new(is_possible: bool, situation: u32, modifier: u32) -> Self {
        Self {
            is_possible,
            situation,
            modifier,
        }
    }

    pub const fn possible(situation: u32) -> Self {
        Self::new(true, situation, 100)
    }

    pub const fn impossible() -> Self {
        Self {
            is_possible: false,
            situation: 0,
            modifier: 0,
        }
    }

    pub const fn value(&self) -> u32 {
        if !self.is_possible {
            return 0;
        }
        self.situation * self.modifier / 100
    }
}

/// Damage the attack is expected to deal, ignoring the random roll.
pub fn expected_damage(attack: &UnitAttack, attacker: &Unit, target: &Unit, config: &BattleConfig) -> u32 {
    let power = attack.power * attacker.damage_percent() / 100;
    let armor = target.armor().min(config.max_armor);
    let mut damage = power * 100u32.saturating_sub(armor) / 100;
    if target.is_defended() {
        damage /= 2;
    }
    damage
}

/// Scores `target` for `attack`.
///
/// - damage: a finishing blow first (strongest victim among them), then the
///   lowest hit points
/// - damage over time: lowest hit points
/// - disables and debuffs: strongest threat
/// - heal: most missing hit points
/// - revive: highest level
/// - cure: most curable effects
/// - buffs and protections: strongest ally
/// - summon: front cells before back cells
/// - doppelganger: strongest unit
pub fn score_target(
    attack: &UnitAttack,
    attacker: &Unit,
    target: AttackTarget,
    state: &BattleState,
    config: &BattleConfig,
) -> Score {
    let unit = match target {
        AttackTarget::Unit(id) => state.get(id),
        AttackTarget::Cell { position, .. } => {
            return match attack.kind {
                AttackKind::Summon { .. } if position.is_front() => Score::possible(2),
                AttackKind::Summon { .. } => Score::possible(1),
                _ => Score::impossible(),
            };
        }
    };
    let Some(unit) = unit else {
        return Score::impossible();
    };

    let threat = unit.unit_type.threat().min(SCALE - 1);
    let low_hit_points = SCALE - unit.hit_points.min(SCALE - 1);
    let situation = match &attack.kind {
        AttackKind::Damage | AttackKind::DrainLife | AttackKind::DrainLifeOverflow => {
            if attack.reach != AttackReach::All
                && expected_damage(attack, attacker, unit, config) >= unit.hit_points
            {
                KILL_BONUS + threat
            } else {
                low_hit_points
            }
        }
        AttackKind::Poison { .. } | AttackKind::Frostbite { .. } | AttackKind::Blister { .. } => {
            low_hit_points
        }
        AttackKind::Paralyze { .. }
        | AttackKind::Petrify { .. }
        | AttackKind::Fear
        | AttackKind::ReduceDamage { .. }
        | AttackKind::ReduceInitiative { .. }
        | AttackKind::ReduceArmor { .. }
        | AttackKind::TransformEnemy { .. }
        | AttackKind::ReduceLevel { .. }
        | AttackKind::Doppelganger => threat,
        AttackKind::Heal => unit.missing_hit_points(),
        AttackKind::Revive => unit.unit_type.level,
        AttackKind::Cure => unit
            .effects
            .iter()
            .filter(|e| e.effect_type.is_curable())
            .count() as u32,
        AttackKind::IncreaseDamage { .. }
        | AttackKind::GiveAdditionalAttack
        | AttackKind::GiveProtection { .. } => threat,
        AttackKind::TransformSelf { .. } => 1,
        AttackKind::Summon { .. } => return Score::impossible(),
    };

    if attack.kind.target_side() != TargetSide::Enemy {
        return Score::possible(situation.max(1));
    }
    match protection_against(attack, unit) {
        Some(ProtectionCategory::Immunity) => Score::impossible(),
        Some(ProtectionCategory::Ward) => Score::new(true, situation.max(1), 50),
        None => Score::possible(situation.max(1)),
    }
}

/// Strongest protection the target has against the attack's type or source.
fn protection_against(attack: &UnitAttack, target: &Unit) -> Option<ProtectionCategory> {
    let targets = [
        ProtectionTarget::Type(attack.attack_type()),
        ProtectionTarget::Source(attack.source),
    ];
    let has = |category| {
        targets
            .iter()
            .any(|t| target.find_protection(category, *t).is_some())
    };
    if has(ProtectionCategory::Immunity) {
        Some(ProtectionCategory::Immunity)
    } else if has(ProtectionCategory::Ward) {
        Some(ProtectionCategory::Ward)
    } else {
        None
    }
}
