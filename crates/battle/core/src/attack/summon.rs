//! Summoning units into the attacker's own squad.
//!
//! A summon targets one cell. The cell must hold no living unit; corpses in
//! it are hidden under the summoned unit and come back when the summon ends.
//! A large summoned type needs both cells of the flank.

use crate::config::BattleConfig;
use crate::error::{BattleError, Result};
use crate::random::BattleRandom;
use crate::state::{
    AttackDuration, BattleSide, BattleState, UnitAttack, UnitBattleEffect, UnitId, UnitPosition,
    UnitType, UnitTypeId,
};

use super::{
    AttackOutcome, AttackProcessorContext, AttackTarget, CalculatedAttackResult, resolve_duration,
};

/// Position a unit of `unit_type` would take when summoned into `cell`.
fn summon_position(
    state: &BattleState,
    side: BattleSide,
    cell: UnitPosition,
    unit_type: &UnitType,
) -> Option<UnitPosition> {
    if cell.is_large() {
        return None;
    }
    let position = if unit_type.is_large {
        UnitPosition::large(cell.flank)
    } else {
        cell
    };
    if !state.is_cell_free(side, position) {
        return None;
    }
    let covered = state
        .units(side)
        .filter(|u| u.position.overlaps(&position))
        .count();
    let after = state.squad(side).units.len() - covered + 1;
    (after <= BattleConfig::MAX_SQUAD_UNITS).then_some(position)
}

fn candidates<'a>(
    unit_types: &[UnitTypeId],
    ctx: &AttackProcessorContext<'a>,
) -> Vec<(&'a UnitType, UnitPosition)> {
    let Some((side, cell)) = ctx.target_cell() else {
        return Vec::new();
    };
    unit_types
        .iter()
        .filter_map(|id| ctx.unit_types.unit_type(*id))
        .filter_map(|t| summon_position(ctx.state, side, cell, t).map(|p| (t, p)))
        .collect()
}

pub(super) fn can_summon(unit_types: &[UnitTypeId], ctx: &AttackProcessorContext<'_>) -> bool {
    !candidates(unit_types, ctx).is_empty()
}

pub(super) fn calculate(
    attack: &UnitAttack,
    unit_types: &[UnitTypeId],
    duration: AttackDuration,
    ctx: &AttackProcessorContext<'_>,
    random: &mut dyn BattleRandom,
) -> Result<AttackOutcome> {
    if let Some(missing) = unit_types
        .iter()
        .find(|id| ctx.unit_types.unit_type(**id).is_none())
    {
        return Err(BattleError::UnitTypeNotFound(*missing));
    }
    let options = candidates(unit_types, ctx);
    if options.is_empty() {
        return Err(BattleError::InvalidTarget {
            attacker: ctx.attacker.id,
            target: ctx.target,
        });
    }
    let (unit_type, position) = options[random.get(options.len() as u32) as usize];
    let effect = UnitBattleEffect::new(
        attack.attack_type(),
        attack.source,
        resolve_duration(duration, random),
        0,
        ctx.attacker.id,
    );
    Ok(AttackOutcome::Summon {
        unit_type: unit_type.clone(),
        position,
        effect,
    })
}

/// Places the summoned unit and hides the corpses it covers.
pub(super) fn apply(
    result: &CalculatedAttackResult,
    state: &mut BattleState,
) -> Result<Option<UnitId>> {
    let AttackOutcome::Summon {
        unit_type,
        position,
        effect,
    } = &result.outcome
    else {
        return Ok(None);
    };
    let AttackTarget::Cell { side, .. } = result.target else {
        return Err(BattleError::InvalidTarget {
            attacker: result.attacker,
            target: result.target,
        });
    };

    let id = state.summon(side, unit_type.clone(), *position)?;
    let unit = state.unit_mut(id)?;
    unit.summoned_by = Some(result.attacker);
    unit.put_effect(effect.clone());
    tracing::debug!(summoner = %result.attacker, unit = %id, unit_type = %unit_type.name, "unit summoned");
    Ok(Some(id))
}
