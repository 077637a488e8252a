//! Heal, Revive and Cure.

use crate::error::Result;
use crate::state::{AttackType, BattleState, UnitAttack, UnitFlags};

use super::{AttackOutcome, AttackProcessorContext, CalculatedAttackResult, target_id};

pub(super) fn can_heal(ctx: &AttackProcessorContext<'_>) -> bool {
    ctx.target_unit()
        .is_some_and(|t| t.is_active() && t.hit_points < t.max_hit_points)
}

/// Only corpses on the grid that were never revived before.
pub(super) fn can_revive(ctx: &AttackProcessorContext<'_>) -> bool {
    ctx.target_unit().is_some_and(|t| {
        t.is_dead() && t.is_present() && !t.flags.contains(UnitFlags::REVIVED)
    })
}

pub(super) fn can_cure(ctx: &AttackProcessorContext<'_>) -> bool {
    ctx.target_unit().is_some_and(|t| {
        t.is_active() && t.effects.iter().any(|e| e.effect_type.is_curable())
    })
}

pub(super) fn calculate_heal(
    attack: &UnitAttack,
    ctx: &AttackProcessorContext<'_>,
) -> Result<AttackOutcome> {
    let target = ctx.require_target()?;
    Ok(AttackOutcome::Heal {
        amount: attack.power.min(target.missing_hit_points()),
    })
}

pub(super) fn calculate_revive(ctx: &AttackProcessorContext<'_>) -> Result<AttackOutcome> {
    let target = ctx.require_target()?;
    let hit_points = (target.max_hit_points * ctx.config.revive_percent / 100).max(1);
    Ok(AttackOutcome::Revive { hit_points })
}

pub(super) fn calculate_cure(ctx: &AttackProcessorContext<'_>) -> Result<AttackOutcome> {
    let target = ctx.require_target()?;
    let cured: Vec<AttackType> = target
        .effects
        .iter()
        .map(|e| e.effect_type)
        .filter(|t| t.is_curable())
        .collect();
    Ok(AttackOutcome::Cure { cured })
}

pub(super) fn apply(result: &CalculatedAttackResult, state: &mut BattleState) -> Result<()> {
    let target = target_id(result)?;
    match &result.outcome {
        AttackOutcome::Heal { amount } => {
            state.unit_mut(target)?.heal(*amount);
        }
        AttackOutcome::Revive { hit_points } => {
            let unit = state.unit_mut(target)?;
            unit.flags.remove(UnitFlags::DEAD);
            unit.flags.insert(UnitFlags::REVIVED);
            unit.hit_points = (*hit_points).min(unit.max_hit_points);
        }
        AttackOutcome::Cure { cured } => {
            for effect_type in cured {
                state.complete_effect(target, *effect_type)?;
            }
        }
        _ => {}
    }
    Ok(())
}
