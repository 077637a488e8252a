//! Turn-start effect processing and death resolution.

use crate::action::{
    AttackEffectProcessor, BattleAction, DefendCompletedProcessor, UnitDeathProcessor,
    UnitRetreatProcessor,
};
use crate::error::{BattleError, Result};
use crate::state::{AttackType, UnitFlags, UnitId};

use super::BattleProcessor;

/// One step of a unit's turn start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectProcessor {
    /// Count one turn down on an effect; damage-over-time effects hit first.
    Tick {
        carrier: UnitId,
        effect_type: AttackType,
    },
    /// The unit stops defending.
    CompleteDefend(UnitId),
    /// A retreating unit leaves the battle.
    Retreat(UnitId),
}

impl BattleProcessor {
    /// Steps to run when `unit` starts a regular turn, in order.
    ///
    /// Effects on the unit it owns come first, then effects it owns on other
    /// units, then effects on it whose owner has left the battle. Defend
    /// completion and retreat close the list.
    pub fn get_effect_processors(&self, unit: UnitId) -> Vec<EffectProcessor> {
        let Some(acting) = self.state.get(unit) else {
            return Vec::new();
        };
        let tick = |carrier: UnitId, effect_type: AttackType| EffectProcessor::Tick {
            carrier,
            effect_type,
        };

        let mut processors: Vec<EffectProcessor> = acting
            .effects
            .iter()
            .filter(|e| e.duration_owner == unit)
            .map(|e| tick(unit, e.effect_type))
            .collect();

        for other in self.state.all_units().filter(|u| u.id != unit && u.is_present()) {
            processors.extend(
                other
                    .effects
                    .iter()
                    .filter(|e| e.duration_owner == unit)
                    .map(|e| tick(other.id, e.effect_type)),
            );
        }

        processors.extend(
            acting
                .effects
                .iter()
                .filter(|e| {
                    e.duration_owner != unit
                        && !self.state.get(e.duration_owner).is_some_and(|o| o.is_active())
                })
                .map(|e| tick(unit, e.effect_type)),
        );

        if acting.is_defended() {
            processors.push(EffectProcessor::CompleteDefend(unit));
        }
        if acting.is_retreating() {
            processors.push(EffectProcessor::Retreat(unit));
        }
        processors
    }

    /// Runs one turn-start step for `acting`.
    ///
    /// Returns the committed actions and whether `acting` loses its turn.
    pub(super) fn apply_effect_processor(
        &mut self,
        processor: EffectProcessor,
        acting: UnitId,
    ) -> Result<(Vec<BattleAction>, bool)> {
        match processor {
            EffectProcessor::Tick {
                carrier,
                effect_type,
            } => self.tick_effect(carrier, effect_type, acting),
            EffectProcessor::CompleteDefend(unit) => {
                self.state.unit_mut(unit)?.flags.remove(UnitFlags::DEFENDED);
                let action = BattleAction::DefendCompleted(DefendCompletedProcessor { unit });
                Ok((vec![action], false))
            }
            EffectProcessor::Retreat(unit) => {
                let retreating = self.state.unit_mut(unit)?;
                if !retreating.is_active() {
                    return Ok((Vec::new(), false));
                }
                retreating.flags.remove(UnitFlags::RETREATING);
                retreating.flags.insert(UnitFlags::RETREATED);
                self.queue.remove(unit);
                tracing::debug!(%unit, "unit retreated");
                let action = BattleAction::Retreat(UnitRetreatProcessor { unit });
                Ok((vec![action], true))
            }
        }
    }

    fn tick_effect(
        &mut self,
        carrier: UnitId,
        effect_type: AttackType,
        acting: UnitId,
    ) -> Result<(Vec<BattleAction>, bool)> {
        let unit = self.state.unit_mut(carrier)?;
        if !unit.is_present() {
            return Ok((Vec::new(), false));
        }
        // Earlier steps may already have removed it.
        let Some(effect) = unit.effects.iter_mut().find(|e| e.effect_type == effect_type) else {
            return Ok((Vec::new(), false));
        };
        let power = effect.power;
        let exhausted = effect.duration.tick();
        let damage = if effect_type.is_damage_over_time() {
            unit.take_damage(power)
        } else {
            0
        };
        if exhausted {
            self.state
                .complete_effect(carrier, effect_type)?
                .ok_or(BattleError::EffectNotFound {
                    unit: carrier,
                    attack: effect_type,
                })?;
        }

        let skips_turn = carrier == acting && effect_type.is_disable();
        tracing::debug!(unit = %carrier, effect = %effect_type, damage, completed = exhausted, "effect ticked");
        let mut actions = vec![BattleAction::Effect(AttackEffectProcessor {
            unit: carrier,
            effect_type,
            damage,
            skips_turn,
            completed: exhausted,
            forced: false,
        })];
        actions.extend(self.resolve_deaths()?);
        Ok((actions, skips_turn))
    }

    /// Marks every unit that reached zero hit points as dead.
    ///
    /// A dead unit leaves the turn queue, loses its transient flags and has
    /// its effects completed; a dead summon is unsummoned.
    pub(super) fn resolve_deaths(&mut self) -> Result<Vec<BattleAction>> {
        let fallen: Vec<UnitId> = self
            .state
            .all_units()
            .filter(|u| u.is_present() && u.hit_points == 0 && !u.is_dead())
            .map(|u| u.id)
            .collect();

        let mut actions = Vec::new();
        for unit in fallen {
            let dead = self.state.unit_mut(unit)?;
            dead.flags.insert(UnitFlags::DEAD);
            dead.flags.remove(UnitFlags::TRANSIENT);
            self.queue.remove(unit);
            tracing::debug!(%unit, "unit died");
            actions.push(BattleAction::Death(UnitDeathProcessor { unit }));
            for effect in self.state.complete_all_effects(unit)? {
                actions.push(forced_completion(unit, effect.effect_type));
            }
        }
        Ok(actions)
    }
}

/// Effect removed before running out.
pub(super) fn forced_completion(unit: UnitId, effect_type: AttackType) -> BattleAction {
    BattleAction::Effect(AttackEffectProcessor {
        unit,
        effect_type,
        damage: 0,
        skips_turn: false,
        completed: true,
        forced: true,
    })
}
