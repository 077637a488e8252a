//! Attacks that leave an effect or change a flag: disables, fear, stat
//! modifiers, damage over time, granted attacks and granted protections.

use crate::error::Result;
use crate::random::BattleRandom;
use crate::state::{
    AttackDuration, AttackKind, AttackType, BattleState, UnitAttack, UnitBattleEffect, UnitFlags,
    UnitProtection,
};
use crate::turn::{TurnKind, UnitTurnOrder, UnitTurnQueue};

use super::{
    AttackOutcome, AttackProcessorContext, CalculatedAttackResult, resolve_duration, target_id,
};

pub(super) fn can_disable(ctx: &AttackProcessorContext<'_>) -> bool {
    ctx.target_unit()
        .is_some_and(|t| t.is_active() && !t.is_disabled())
}

pub(super) fn can_fear(ctx: &AttackProcessorContext<'_>) -> bool {
    ctx.target_unit()
        .is_some_and(|t| t.is_active() && !t.is_retreating())
}

pub(super) fn can_increase_damage(ctx: &AttackProcessorContext<'_>) -> bool {
    ctx.target_unit().is_some_and(|t| {
        t.is_active()
            && t.unit_type.deals_damage()
            && !t.has_effect(AttackType::IncreaseDamage)
    })
}

/// ReduceDamage and ReduceInitiative: one modifier of each type at a time.
pub(super) fn can_add_modifier(attack: &UnitAttack, ctx: &AttackProcessorContext<'_>) -> bool {
    ctx.target_unit()
        .is_some_and(|t| t.is_active() && !t.has_effect(attack.attack_type()))
}

pub(super) fn can_reduce_armor(ctx: &AttackProcessorContext<'_>) -> bool {
    ctx.target_unit().is_some_and(|t| {
        t.is_active() && t.armor() > 0 && !t.has_effect(AttackType::ReduceArmor)
    })
}

/// A new damage-over-time effect replaces an existing one of the same type.
pub(super) fn can_add_damage_over_time(ctx: &AttackProcessorContext<'_>) -> bool {
    ctx.target_unit().is_some_and(|t| t.is_active())
}

pub(super) fn can_give_attack(ctx: &AttackProcessorContext<'_>) -> bool {
    ctx.target_unit().is_some_and(|t| {
        !ctx.targets_self()
            && t.can_act()
            && !matches!(t.unit_type.main_attack.kind, AttackKind::GiveAdditionalAttack)
    })
}

pub(super) fn can_give_protection(
    protections: &[UnitProtection],
    ctx: &AttackProcessorContext<'_>,
) -> bool {
    ctx.target_unit().is_some_and(|t| {
        t.is_active() && protections.iter().any(|p| !t.has_protection(p))
    })
}

/// Builds the effect an attack leaves on its target.
///
/// Disables and damage over time count down on the target's turns; every
/// other effect counts down on the attacker's.
pub(super) fn calculate_effect(
    attack: &UnitAttack,
    duration: AttackDuration,
    power: u32,
    ctx: &AttackProcessorContext<'_>,
    random: &mut dyn BattleRandom,
) -> Result<AttackOutcome> {
    let target = ctx.require_target()?;
    let effect_type = attack.attack_type();
    let owner = if effect_type.is_owned_by_target() {
        target.id
    } else {
        ctx.attacker.id
    };
    Ok(AttackOutcome::Effect(UnitBattleEffect::new(
        effect_type,
        attack.source,
        resolve_duration(duration, random),
        power,
        owner,
    )))
}

/// Grants only the protections the target does not have yet.
pub(super) fn calculate_protection(
    attack: &UnitAttack,
    protections: &[UnitProtection],
    duration: AttackDuration,
    ctx: &AttackProcessorContext<'_>,
    random: &mut dyn BattleRandom,
) -> Result<AttackOutcome> {
    let target = ctx.require_target()?;
    let granted: Vec<UnitProtection> = protections
        .iter()
        .copied()
        .filter(|p| !target.has_protection(p))
        .collect();
    let effect = UnitBattleEffect::new(
        attack.attack_type(),
        attack.source,
        resolve_duration(duration, random),
        attack.power,
        ctx.attacker.id,
    )
    .with_granted(granted);
    Ok(AttackOutcome::Effect(effect))
}

pub(super) fn apply(
    result: &CalculatedAttackResult,
    state: &mut BattleState,
    queue: &mut UnitTurnQueue,
) -> Result<()> {
    let target = target_id(result)?;
    match &result.outcome {
        AttackOutcome::Fear => {
            state.unit_mut(target)?.flags.insert(UnitFlags::RETREATING);
        }
        AttackOutcome::AdditionalAttack => {
            queue.insert_immediate(UnitTurnOrder::extra(target, TurnKind::AdditionalAttack));
        }
        AttackOutcome::Effect(effect) => {
            let unit = state.unit_mut(target)?;
            for protection in &effect.granted {
                if !unit.has_protection(protection) {
                    unit.protections.push(*protection);
                }
            }
            unit.put_effect(effect.clone());

            if effect.effect_type == AttackType::ReduceInitiative {
                let initiative = unit.initiative() as i32;
                queue.reorder(target, initiative);
            }
        }
        _ => {}
    }
    Ok(())
}
