//! TransformEnemy, TransformSelf, ReduceLevel and Doppelganger.
//!
//! All four replace the unit type of their carrier while the effect lasts.
//! The carrier keeps its id, position and effects; hit points keep their ratio
//! to the maximum. Completing the effect restores the original type.

use crate::error::{BattleError, Result};
use crate::random::BattleRandom;
use crate::state::{
    AttackDuration, BattleState, EffectDuration, Unit, UnitAttack, UnitBattleEffect, UnitType,
    UnitTypeId,
};

use super::{AttackOutcome, AttackProcessorContext, CalculatedAttackResult, resolve_duration};

fn same_size(unit: &Unit, unit_type: &UnitType) -> bool {
    unit.is_large() == unit_type.is_large
}

fn lookup<'a>(ctx: &AttackProcessorContext<'a>, id: UnitTypeId) -> Result<&'a UnitType> {
    ctx.unit_types
        .unit_type(id)
        .ok_or(BattleError::UnitTypeNotFound(id))
}

pub(super) fn can_transform_enemy(into: UnitTypeId, ctx: &AttackProcessorContext<'_>) -> bool {
    let Some(into) = ctx.unit_types.unit_type(into) else {
        return false;
    };
    ctx.target_unit()
        .is_some_and(|t| t.is_active() && !t.is_transformed() && same_size(t, into))
}

pub(super) fn can_transform_self(into: UnitTypeId, ctx: &AttackProcessorContext<'_>) -> bool {
    let Some(into) = ctx.unit_types.unit_type(into) else {
        return false;
    };
    let attacker = ctx.attacker;
    ctx.targets_self() && !attacker.is_transformed() && same_size(attacker, into)
}

pub(super) fn can_reduce_level(ctx: &AttackProcessorContext<'_>) -> bool {
    ctx.target_unit().is_some_and(|t| {
        t.is_active()
            && !t.is_transformed()
            && t.unit_type
                .previous_type
                .and_then(|id| ctx.unit_types.unit_type(id))
                .is_some_and(|previous| same_size(t, previous))
    })
}

pub(super) fn can_copy(ctx: &AttackProcessorContext<'_>) -> bool {
    let attacker = ctx.attacker;
    ctx.target_unit().is_some_and(|t| {
        t.is_active()
            && t.id != attacker.id
            && t.is_large() == attacker.is_large()
            && !attacker.is_transformed()
    })
}

fn transform_outcome(
    attack: &UnitAttack,
    carrier: &Unit,
    owner: &Unit,
    into: &UnitType,
    duration: EffectDuration,
) -> AttackOutcome {
    AttackOutcome::Transform {
        carrier: carrier.id,
        into: into.clone(),
        effect: UnitBattleEffect::new(
            attack.attack_type(),
            attack.source,
            duration,
            0,
            owner.id,
        ),
    }
}

pub(super) fn calculate_transform_enemy(
    attack: &UnitAttack,
    into: UnitTypeId,
    duration: AttackDuration,
    ctx: &AttackProcessorContext<'_>,
    random: &mut dyn BattleRandom,
) -> Result<AttackOutcome> {
    let target = ctx.require_target()?;
    let into = lookup(ctx, into)?;
    let duration = resolve_duration(duration, random);
    Ok(transform_outcome(attack, target, ctx.attacker, into, duration))
}

pub(super) fn calculate_transform_self(
    attack: &UnitAttack,
    into: UnitTypeId,
    ctx: &AttackProcessorContext<'_>,
) -> Result<AttackOutcome> {
    let into = lookup(ctx, into)?;
    let attacker = ctx.attacker;
    Ok(transform_outcome(
        attack,
        attacker,
        attacker,
        into,
        EffectDuration::Infinite,
    ))
}

pub(super) fn calculate_reduce_level(
    attack: &UnitAttack,
    duration: AttackDuration,
    ctx: &AttackProcessorContext<'_>,
    random: &mut dyn BattleRandom,
) -> Result<AttackOutcome> {
    let target = ctx.require_target()?;
    let previous = target
        .unit_type
        .previous_type
        .ok_or(BattleError::InvalidTarget {
            attacker: ctx.attacker.id,
            target: ctx.target,
        })?;
    let into = lookup(ctx, previous)?;
    let duration = resolve_duration(duration, random);
    Ok(transform_outcome(attack, target, ctx.attacker, into, duration))
}

/// The attacker takes the target's current type for the rest of the battle.
pub(super) fn calculate_copy(
    attack: &UnitAttack,
    ctx: &AttackProcessorContext<'_>,
) -> Result<AttackOutcome> {
    let target = ctx.require_target()?;
    let attacker = ctx.attacker;
    Ok(transform_outcome(
        attack,
        attacker,
        attacker,
        &target.unit_type,
        EffectDuration::Infinite,
    ))
}

pub(super) fn apply(result: &CalculatedAttackResult, state: &mut BattleState) -> Result<()> {
    let AttackOutcome::Transform {
        carrier,
        into,
        effect,
    } = &result.outcome
    else {
        return Ok(());
    };
    state.transform(*carrier, into.clone())?;
    state.unit_mut(*carrier)?.put_effect(effect.clone());
    tracing::debug!(unit = %carrier, into = %into.name, attack = %result.attack_type, "unit transformed");
    Ok(())
}
