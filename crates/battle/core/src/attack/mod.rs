//! Attack kinds: legality, calculation, and application.
//!
//! Every kind is processed in two steps:
//!
//! 1. [`calculate`] reads the battle through an [`AttackProcessorContext`],
//!    draws from the random source, and returns a [`CalculatedAttackResult`].
//!    It never mutates state.
//! 2. [`apply`] commits a calculated result to the battle state.
//!
//! [`can_attack`] decides whether a kind has anything to do on a target.
//! Dispatch is an exhaustive `match` over [`AttackKind`], so adding a kind is
//! a compile error until every step handles it.

mod context;
mod damage;
mod restore;
mod result;
mod status;
mod summon;
mod transform;

pub use context::AttackProcessorContext;
pub use result::{AttackOutcome, AttackTarget, CalculatedAttackResult, UnitHeal};

use crate::accuracy;
use crate::error::{BattleError, Result};
use crate::random::BattleRandom;
use crate::state::{
    AttackDuration, AttackKind, BattleState, EffectDuration, TargetSide, UnitAttack, UnitId,
};
use crate::turn::UnitTurnQueue;

/// Returns true if `attack` has an effect on the context's target.
pub fn can_attack(attack: &UnitAttack, ctx: &AttackProcessorContext<'_>) -> bool {
    if !matches_target_side(attack, ctx) {
        return false;
    }
    match &attack.kind {
        AttackKind::Damage | AttackKind::DrainLife | AttackKind::DrainLifeOverflow => {
            damage::can_attack(ctx)
        }
        AttackKind::Paralyze { .. } | AttackKind::Petrify { .. } => status::can_disable(ctx),
        AttackKind::Fear => status::can_fear(ctx),
        AttackKind::Heal => restore::can_heal(ctx),
        AttackKind::Revive => restore::can_revive(ctx),
        AttackKind::Cure => restore::can_cure(ctx),
        AttackKind::IncreaseDamage { .. } => status::can_increase_damage(ctx),
        AttackKind::ReduceDamage { .. } | AttackKind::ReduceInitiative { .. } => {
            status::can_add_modifier(attack, ctx)
        }
        AttackKind::ReduceArmor { .. } => status::can_reduce_armor(ctx),
        AttackKind::Poison { .. } | AttackKind::Frostbite { .. } | AttackKind::Blister { .. } => {
            status::can_add_damage_over_time(ctx)
        }
        AttackKind::Summon { unit_types, .. } => summon::can_summon(unit_types, ctx),
        AttackKind::TransformEnemy { into, .. } => transform::can_transform_enemy(*into, ctx),
        AttackKind::TransformSelf { into } => transform::can_transform_self(*into, ctx),
        AttackKind::ReduceLevel { .. } => transform::can_reduce_level(ctx),
        AttackKind::Doppelganger => transform::can_copy(ctx),
        AttackKind::GiveAdditionalAttack => status::can_give_attack(ctx),
        AttackKind::GiveProtection { protections, .. } => {
            status::can_give_protection(protections, ctx)
        }
    }
}

/// Calculates the outcome of `attack` on the context's target.
///
/// Enemy-targeting kinds go through the accuracy and protection resolver
/// first; a nullified attack yields an immune, miss or ward outcome.
pub fn calculate(
    attack: &UnitAttack,
    ctx: &AttackProcessorContext<'_>,
    random: &mut dyn BattleRandom,
) -> Result<CalculatedAttackResult> {
    let outcome = match resolve_protections(attack, ctx, random) {
        Some(nullified) => nullified,
        None => calculate_outcome(attack, ctx, random)?,
    };
    tracing::debug!(
        attacker = %ctx.attacker.id,
        target = ?ctx.target,
        attack = %attack.attack_type(),
        ?outcome,
        "attack calculated"
    );
    Ok(CalculatedAttackResult {
        attacker: ctx.attacker.id,
        target: ctx.target,
        attack_type: attack.attack_type(),
        source: attack.source,
        outcome,
    })
}

fn resolve_protections(
    attack: &UnitAttack,
    ctx: &AttackProcessorContext<'_>,
    random: &mut dyn BattleRandom,
) -> Option<AttackOutcome> {
    if attack.kind.target_side() != TargetSide::Enemy {
        return None;
    }
    let target = ctx.target_unit()?;
    accuracy::resolve(attack, ctx.attacker, target, random)
}

fn calculate_outcome(
    attack: &UnitAttack,
    ctx: &AttackProcessorContext<'_>,
    random: &mut dyn BattleRandom,
) -> Result<AttackOutcome> {
    match &attack.kind {
        AttackKind::Damage => damage::calculate_damage(attack, ctx, random),
        AttackKind::DrainLife => damage::calculate_drain(attack, ctx, random, false),
        AttackKind::DrainLifeOverflow => damage::calculate_drain(attack, ctx, random, true),
        AttackKind::Fear => Ok(AttackOutcome::Fear),
        AttackKind::Heal => restore::calculate_heal(attack, ctx),
        AttackKind::Revive => restore::calculate_revive(ctx),
        AttackKind::Cure => restore::calculate_cure(ctx),
        AttackKind::GiveAdditionalAttack => Ok(AttackOutcome::AdditionalAttack),
        AttackKind::Paralyze { duration }
        | AttackKind::Petrify { duration }
        | AttackKind::IncreaseDamage { duration }
        | AttackKind::ReduceDamage { duration }
        | AttackKind::ReduceInitiative { duration }
        | AttackKind::Poison { duration }
        | AttackKind::Frostbite { duration }
        | AttackKind::Blister { duration } => {
            status::calculate_effect(attack, *duration, attack.power, ctx, random)
        }
        AttackKind::ReduceArmor { duration } => {
            let target = ctx.require_target()?;
            let power = attack.power.min(target.armor());
            status::calculate_effect(attack, *duration, power, ctx, random)
        }
        AttackKind::GiveProtection {
            protections,
            duration,
        } => status::calculate_protection(attack, protections, *duration, ctx, random),
        AttackKind::Summon {
            unit_types,
            duration,
        } => summon::calculate(attack, unit_types, *duration, ctx, random),
        AttackKind::TransformEnemy { into, duration } => {
            transform::calculate_transform_enemy(attack, *into, *duration, ctx, random)
        }
        AttackKind::TransformSelf { into } => transform::calculate_transform_self(attack, *into, ctx),
        AttackKind::ReduceLevel { duration } => {
            transform::calculate_reduce_level(attack, *duration, ctx, random)
        }
        AttackKind::Doppelganger => transform::calculate_copy(attack, ctx),
    }
}

/// Commits a calculated attack.
///
/// Returns the id of a newly summoned unit, if any.
pub fn apply(
    result: &CalculatedAttackResult,
    state: &mut BattleState,
    queue: &mut UnitTurnQueue,
) -> Result<Option<UnitId>> {
    match &result.outcome {
        AttackOutcome::Immune(_) | AttackOutcome::Miss => {}
        AttackOutcome::Ward(ward) => {
            state.unit_mut(target_id(result)?)?.remove_protection(ward);
        }
        AttackOutcome::Damage { .. } | AttackOutcome::Drain { .. } => {
            damage::apply(result, state)?;
        }
        AttackOutcome::Heal { .. } | AttackOutcome::Revive { .. } | AttackOutcome::Cure { .. } => {
            restore::apply(result, state)?;
        }
        AttackOutcome::Fear | AttackOutcome::AdditionalAttack | AttackOutcome::Effect(_) => {
            status::apply(result, state, queue)?;
        }
        AttackOutcome::Summon { .. } => return summon::apply(result, state),
        AttackOutcome::Transform { .. } => transform::apply(result, state)?,
    }
    Ok(None)
}

fn matches_target_side(attack: &UnitAttack, ctx: &AttackProcessorContext<'_>) -> bool {
    let attacker = ctx.attacker;
    match attack.kind.target_side() {
        TargetSide::Enemy => ctx
            .target_unit()
            .is_some_and(|t| t.side == attacker.side.opposite()),
        TargetSide::Ally => ctx.target_unit().is_some_and(|t| t.side == attacker.side),
        TargetSide::AllyCell => ctx
            .target_cell()
            .is_some_and(|(side, _)| side == attacker.side),
        TargetSide::OnlySelf => ctx.targets_self(),
        TargetSide::AnySide => ctx.target_unit().is_some(),
    }
}

/// Unit the result is aimed at, or an invalid target error for cell targets.
pub(crate) fn target_id(result: &CalculatedAttackResult) -> Result<UnitId> {
    result.target_unit().ok_or(BattleError::InvalidTarget {
        attacker: result.attacker,
        target: result.target,
    })
}

/// Resolves a declared duration into turns, drawing for random ranges.
pub(crate) fn resolve_duration(
    duration: AttackDuration,
    random: &mut dyn BattleRandom,
) -> EffectDuration {
    match duration {
        AttackDuration::Fixed(turns) => EffectDuration::Turns(turns.max(1)),
        AttackDuration::Random { min, max } => {
            EffectDuration::Turns(random.get_range(min, max.saturating_add(1)).max(1))
        }
        AttackDuration::Infinite => EffectDuration::Infinite,
    }
}
