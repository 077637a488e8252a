//! Instant resolution: a whole battle without presentation.
//!
//! Runs the same turn loop an animated consumer runs, with every unit driven
//! by [`BattleAiProcessor`]. Long battles are forced to an end:
//!
//! - after `forced_retreat_round` the attacking squad retreats
//! - after `forced_defend_round` the defending squad only defends
//! - after `max_rounds` every attacking unit leaves the field at once

use crate::action::BattleAction;
use crate::ai::BattleAiProcessor;
use crate::error::Result;
use crate::processor::{BattleCommand, BattleOutcome, BattleProcessor};
use crate::state::{BattleSide, UnitId};
use crate::turn::UnitTurnOrder;

/// Fast-forwards battles to their outcome.
#[derive(Clone, Copy, Debug, Default)]
pub struct BattleInstantProcessor;

impl BattleInstantProcessor {
    /// Resolves `battle` to its end and completes it.
    pub fn process(battle: &mut BattleProcessor) -> Result<BattleOutcome> {
        Self::process_with(battle, |_| {})
    }

    /// Like [`process`](Self::process), handing every committed action to
    /// `observe` in order.
    pub fn process_with(
        battle: &mut BattleProcessor,
        mut observe: impl FnMut(&BattleAction),
    ) -> Result<BattleOutcome> {
        while battle.winner().is_none() {
            let round_over = battle.queue().is_empty() && battle.current().is_none();
            if round_over && battle.round() >= battle.config().max_rounds {
                Self::force_attacker_retreat(battle)?;
                break;
            }
            let Some(turn) = battle.start_next_turn()? else {
                break;
            };
            turn.actions.iter().for_each(&mut observe);
            if !turn.can_act {
                continue;
            }
            let command = Self::select_command(battle, turn.order)?;
            let actions = battle.process_command(command)?;
            actions.iter().for_each(&mut observe);
        }

        let outcome = battle.complete_battle()?;
        outcome.actions.iter().for_each(&mut observe);
        tracing::info!(
            winner = %outcome.winner,
            rounds = outcome.rounds,
            "instant battle resolved"
        );
        Ok(outcome)
    }

    fn select_command(battle: &BattleProcessor, order: UnitTurnOrder) -> Result<BattleCommand> {
        let side = battle.state().unit(order.unit)?.side;
        let round = battle.round();
        let config = battle.config();
        let command = match side {
            BattleSide::Attacker if round > config.forced_retreat_round => {
                if order.kind.is_regular() {
                    BattleCommand::Retreat
                } else {
                    BattleCommand::Defend
                }
            }
            BattleSide::Defender if round > config.forced_defend_round => BattleCommand::Defend,
            _ => BattleAiProcessor::get_command(battle, order.unit)?,
        };
        Ok(command)
    }

    /// Ends a battle that ran past the round cap.
    fn force_attacker_retreat(battle: &mut BattleProcessor) -> Result<()> {
        let retreating: Vec<UnitId> = battle
            .state()
            .active_units(BattleSide::Attacker)
            .map(|u| u.id)
            .collect();
        tracing::warn!(
            round = battle.round(),
            units = retreating.len(),
            "round cap reached, attackers leave the field"
        );
        for unit in retreating {
            battle.force_retreat(unit)?;
        }
        Ok(())
    }
}
