//! Battle processor: turn flow and command resolution.
//!
//! ```text
//! TurnStart ──► ActionSelection ──► ActionResolution ──► TurnStart
//!     │                                                     ▲
//!     └──► EffectResolution (turn skipped, died, retreated) ─┘
//!
//! any phase ──► BattleEnded once one squad has no active units
//! ```
//!
//! [`BattleProcessor::start_next_turn`] pops the next unit from the turn
//! queue, resolves its turn-start effects and reports whether it can act.
//! [`BattleProcessor::process_command`] resolves the acting unit's command.
//! Both return the committed [`BattleAction`]s. The same two calls drive the
//! animated and the instant consumers, so both produce the same outcome from
//! the same random sequence.

mod effects;
mod targeting;

pub use effects::EffectProcessor;

use std::sync::Arc;

use crate::action::{
    BattleAction, CommandKind, UnitCommandProcessor, UnitExperienceProcessor,
    UnitSuccessAttackProcessor, UnitTurnSkippedProcessor,
};
use crate::attack::{self, AttackProcessorContext, AttackTarget};
use crate::config::BattleConfig;
use crate::error::{BattleError, Result};
use crate::random::BattleRandom;
use crate::state::{BattleSide, BattleState, UnitAttack, UnitFlags, UnitId, UnitTypeOracle};
use crate::turn::{TurnKind, UnitTurnOrder, UnitTurnQueue};

/// Where the processor is in the turn cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum BattlePhase {
    NotStarted,
    TurnStart,
    ActionSelection,
    ActionResolution,
    EffectResolution,
    BattleEnded,
}

/// Which of the unit's attacks a command uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackChoice {
    /// Main attack, followed by the secondary attack on a hit.
    #[default]
    Main,
    /// Alternative attack, without a secondary.
    Alternative,
}

/// Command for the unit selecting an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleCommand {
    Attack {
        target: AttackTarget,
        choice: AttackChoice,
    },
    Defend,
    /// Act again after every pending unit this round. Regular turns only, once
    /// per round.
    Wait,
    /// Leave the battle at the unit's next turn start. Regular turns only.
    Retreat,
}

impl BattleCommand {
    pub fn attack(target: impl Into<AttackTarget>) -> Self {
        Self::Attack {
            target: target.into(),
            choice: AttackChoice::Main,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Attack { .. } => "attack",
            Self::Defend => "defend",
            Self::Wait => "wait",
            Self::Retreat => "retreat",
        }
    }
}

/// A unit's turn as started by [`BattleProcessor::start_next_turn`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnStart {
    pub order: UnitTurnOrder,
    /// Effects, defend completion, retreat and deaths resolved at turn start.
    pub actions: Vec<BattleAction>,
    /// False if the unit lost its turn; no command is expected then.
    pub can_act: bool,
}

/// Result of [`BattleProcessor::complete_battle`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleOutcome {
    pub winner: BattleSide,
    pub rounds: u32,
    /// Experience awarded per unit.
    pub experience: Vec<(UnitId, u32)>,
    /// Forced effect completions and experience awards.
    pub actions: Vec<BattleAction>,
}

/// Authoritative owner of one battle.
pub struct BattleProcessor {
    state: BattleState,
    queue: UnitTurnQueue,
    config: BattleConfig,
    unit_types: Arc<dyn UnitTypeOracle>,
    random: Box<dyn BattleRandom>,
    phase: BattlePhase,
    current: Option<UnitTurnOrder>,
    completed: bool,
}

impl BattleProcessor {
    pub fn new(
        state: BattleState,
        config: BattleConfig,
        unit_types: Arc<dyn UnitTypeOracle>,
        random: Box<dyn BattleRandom>,
    ) -> Self {
        Self {
            state,
            queue: UnitTurnQueue::new(),
            config,
            unit_types,
            random,
            phase: BattlePhase::NotStarted,
            current: None,
            completed: false,
        }
    }

    // ===== accessors =====

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn queue(&self) -> &UnitTurnQueue {
        &self.queue
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn unit_types(&self) -> &dyn UnitTypeOracle {
        self.unit_types.as_ref()
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    /// Turn of the unit currently selecting an action.
    pub fn current(&self) -> Option<UnitTurnOrder> {
        self.current
    }

    pub fn round(&self) -> u32 {
        self.queue.round()
    }

    pub fn into_state(self) -> BattleState {
        self.state
    }

    /// The side that won, once the other side has no active units.
    ///
    /// If both squads are empty the defender holds the field.
    pub fn winner(&self) -> Option<BattleSide> {
        let attackers = self.state.has_active_units(BattleSide::Attacker);
        let defenders = self.state.has_active_units(BattleSide::Defender);
        match (attackers, defenders) {
            (true, true) => None,
            (true, false) => Some(BattleSide::Attacker),
            (false, _) => Some(BattleSide::Defender),
        }
    }

    // ===== turn flow =====

    /// Starts the next unit's turn.
    ///
    /// Returns `None` once the battle has a winner. Otherwise resolves
    /// turn-start effects; if the unit can still act the processor waits for
    /// a command.
    pub fn start_next_turn(&mut self) -> Result<Option<TurnStart>> {
        if self.phase == BattlePhase::BattleEnded {
            return Err(BattleError::BattleEnded);
        }
        if let Some(order) = self.current {
            return Err(BattleError::TurnInProgress(order.unit));
        }
        if self.end_if_won() {
            return Ok(None);
        }

        let order = self.next_order()?;
        self.phase = BattlePhase::TurnStart;
        tracing::debug!(unit = %order.unit, kind = %order.kind, round = self.round(), "turn started");

        let mut actions = Vec::new();
        let mut skipped = false;
        // A unit back from waiting already ran its turn start this round.
        let waited = self.state.unit(order.unit)?.flags.contains(UnitFlags::WAITED);
        if order.kind.is_regular() && !waited {
            self.phase = BattlePhase::EffectResolution;
            for processor in self.get_effect_processors(order.unit) {
                let (produced, skips) = self.apply_effect_processor(processor, order.unit)?;
                actions.extend(produced);
                skipped |= skips;
            }
        }

        let unit = self.state.unit(order.unit)?;
        let can_act = unit.can_act() && !skipped;
        if unit.is_active() && !can_act {
            actions.push(BattleAction::TurnSkipped(UnitTurnSkippedProcessor {
                unit: order.unit,
                turn: order.kind,
            }));
        }

        if can_act {
            self.phase = BattlePhase::ActionSelection;
            self.current = Some(order);
        } else {
            self.phase = BattlePhase::TurnStart;
            self.end_if_won();
        }
        Ok(Some(TurnStart {
            order,
            actions,
            can_act,
        }))
    }

    /// Resolves a command for the unit selecting an action.
    pub fn process_command(&mut self, command: BattleCommand) -> Result<Vec<BattleAction>> {
        if self.phase == BattlePhase::BattleEnded {
            return Err(BattleError::BattleEnded);
        }
        let order = match (self.phase, self.current) {
            (BattlePhase::ActionSelection, Some(order)) => order,
            _ => return Err(BattleError::NoCurrentUnit),
        };
        self.validate_command(order, &command)?;

        self.phase = BattlePhase::ActionResolution;
        let unit = order.unit;
        tracing::debug!(%unit, command = command.name(), "command");
        let actions = match command {
            BattleCommand::Attack { target, choice } => {
                self.process_attack(order, target, choice)?
            }
            BattleCommand::Defend => {
                self.state.unit_mut(unit)?.flags.insert(UnitFlags::DEFENDED);
                vec![Self::command_action(unit, CommandKind::Defend)]
            }
            BattleCommand::Wait => {
                self.state.unit_mut(unit)?.flags.insert(UnitFlags::WAITED);
                self.queue.push_waiting(order);
                vec![Self::command_action(unit, CommandKind::Wait)]
            }
            BattleCommand::Retreat => {
                self.state
                    .unit_mut(unit)?
                    .flags
                    .insert(UnitFlags::RETREATING);
                vec![Self::command_action(unit, CommandKind::Retreat)]
            }
        };

        self.current = None;
        self.phase = BattlePhase::TurnStart;
        self.end_if_won();
        Ok(actions)
    }

    fn command_action(unit: UnitId, command: CommandKind) -> BattleAction {
        BattleAction::Command(UnitCommandProcessor { unit, command })
    }

    fn validate_command(&self, order: UnitTurnOrder, command: &BattleCommand) -> Result<()> {
        let regular_only = matches!(command, BattleCommand::Wait | BattleCommand::Retreat);
        if regular_only && !order.kind.is_regular() {
            return Err(BattleError::CommandNotAllowed {
                command: command.name(),
                turn: order.kind,
            });
        }
        match command {
            BattleCommand::Wait => {
                if self
                    .state
                    .unit(order.unit)?
                    .flags
                    .contains(UnitFlags::WAITED)
                {
                    return Err(BattleError::AlreadyWaited(order.unit));
                }
            }
            BattleCommand::Attack { target, choice } => {
                if !self.can_attack(order.unit, *choice, *target)? {
                    return Err(BattleError::InvalidTarget {
                        attacker: order.unit,
                        target: *target,
                    });
                }
            }
            BattleCommand::Defend | BattleCommand::Retreat => {}
        }
        Ok(())
    }

    /// Pops the next order of a unit that is still active, starting a new
    /// round when the queue runs dry.
    fn next_order(&mut self) -> Result<UnitTurnOrder> {
        let mut fresh_round = false;
        loop {
            let Some(order) = self.queue.next() else {
                if fresh_round {
                    return Err(BattleError::NoActiveUnits);
                }
                self.start_round();
                fresh_round = true;
                continue;
            };
            if self.state.unit(order.unit)?.is_active() {
                return Ok(order);
            }
        }
    }

    fn start_round(&mut self) {
        for unit in self.state.all_units_mut() {
            unit.flags.remove(UnitFlags::WAITED);
        }
        self.queue.start_round(
            &self.state,
            self.random.as_mut(),
            self.config.initiative_jitter,
        );
        tracing::info!(round = self.queue.round(), "round started");
    }

    /// Moves to `BattleEnded` if a side has won. Returns true if it has.
    fn end_if_won(&mut self) -> bool {
        let Some(winner) = self.winner() else {
            return false;
        };
        if self.phase != BattlePhase::BattleEnded {
            self.phase = BattlePhase::BattleEnded;
            self.current = None;
            tracing::info!(%winner, round = self.round(), "battle won");
        }
        true
    }

    // ===== attacks =====

    fn process_attack(
        &mut self,
        order: UnitTurnOrder,
        target: AttackTarget,
        choice: AttackChoice,
    ) -> Result<Vec<BattleAction>> {
        let attacker = order.unit;
        let unit_type = self.state.unit(attacker)?.unit_type.clone();
        let attack = self.attack_for(attacker, choice)?.clone();
        let secondary = match choice {
            AttackChoice::Main => unit_type.secondary_attack.clone(),
            AttackChoice::Alternative => None,
        };

        let mut actions = Vec::new();
        for target in self.expand_targets(attacker, &attack, target)? {
            if self.check_attack(attacker, &attack, target)? {
                let success = self.resolve_attack(attacker, &attack, target, &mut actions)?;
                if success {
                    if let Some(secondary) = &secondary {
                        if self.check_attack(attacker, secondary, target)? {
                            self.resolve_attack(attacker, secondary, target, &mut actions)?;
                        }
                    }
                }
            } else if attack.kind.can_main_attack_be_skipped() {
                if let Some(secondary) = &secondary {
                    if self.check_attack(attacker, secondary, target)? {
                        self.resolve_attack(attacker, secondary, target, &mut actions)?;
                    }
                }
            }
        }

        let double_attack = unit_type.has_double_attack
            && matches!(order.kind, TurnKind::Regular | TurnKind::AdditionalAttack)
            && self.state.unit(attacker)?.can_act();
        if double_attack {
            self.queue
                .insert_immediate(UnitTurnOrder::extra(attacker, TurnKind::SecondAttack));
        }
        Ok(actions)
    }

    fn context(&self, attacker: UnitId, target: AttackTarget) -> Result<AttackProcessorContext<'_>> {
        Ok(AttackProcessorContext::new(
            self.state.unit(attacker)?,
            target,
            &self.state,
            &self.queue,
            &self.config,
            self.unit_types.as_ref(),
        ))
    }

    fn check_attack(&self, attacker: UnitId, attack: &UnitAttack, target: AttackTarget) -> Result<bool> {
        Ok(attack::can_attack(attack, &self.context(attacker, target)?))
    }

    /// Calculates and applies one attack, then resolves deaths it caused.
    /// Returns whether the attack landed.
    fn resolve_attack(
        &mut self,
        attacker: UnitId,
        attack: &UnitAttack,
        target: AttackTarget,
        actions: &mut Vec<BattleAction>,
    ) -> Result<bool> {
        let result = {
            let ctx = AttackProcessorContext::new(
                self.state.unit(attacker)?,
                target,
                &self.state,
                &self.queue,
                &self.config,
                self.unit_types.as_ref(),
            );
            attack::calculate(attack, &ctx, self.random.as_mut())?
        };
        let summoned = attack::apply(&result, &mut self.state, &mut self.queue)?;
        let success = result.is_success();
        actions.push(BattleAction::Attack(UnitSuccessAttackProcessor { result, summoned }));
        actions.extend(self.resolve_deaths()?);
        Ok(success)
    }

    // ===== battle end =====

    /// Takes `unit` off the field at once, outside the turn flow.
    pub(crate) fn force_retreat(&mut self, unit: UnitId) -> Result<()> {
        let retreating = self.state.unit_mut(unit)?;
        retreating.flags.remove(UnitFlags::RETREATING);
        retreating.flags.insert(UnitFlags::RETREATED);
        self.queue.remove(unit);
        Ok(())
    }

    /// Ends a won battle: completes every effect, clears transient flags and
    /// awards experience to the winners.
    ///
    /// Surviving, non-summoned winners split the kill experience of every
    /// dead enemy evenly; the remainder goes to the lowest ids.
    pub fn complete_battle(&mut self) -> Result<BattleOutcome> {
        if self.completed {
            return Err(BattleError::BattleEnded);
        }
        let winner = self.winner().ok_or(BattleError::BattleNotEnded)?;
        self.phase = BattlePhase::BattleEnded;
        self.current = None;

        let mut actions = Vec::new();
        let ids: Vec<UnitId> = self.state.all_units().map(|u| u.id).collect();
        for id in &ids {
            for effect in self.state.complete_all_effects(*id)? {
                actions.push(effects::forced_completion(*id, effect.effect_type));
            }
        }
        for unit in self.state.all_units_mut() {
            unit.flags.remove(UnitFlags::TRANSIENT);
        }

        let loser = winner.opposite();
        let total: u32 = self
            .state
            .all_units()
            .filter(|u| u.side == loser && u.is_dead() && !u.is_summoned())
            .map(|u| u.unit_type.xp_killed)
            .sum();
        let recipients: Vec<UnitId> = self
            .state
            .active_units(winner)
            .filter(|u| !u.is_summoned())
            .map(|u| u.id)
            .collect();

        let mut experience = Vec::new();
        if !recipients.is_empty() && total > 0 {
            let count = recipients.len() as u32;
            let share = total / count;
            let remainder = total % count;
            for (i, id) in recipients.into_iter().enumerate() {
                let amount = share + u32::from((i as u32) < remainder);
                if amount == 0 {
                    continue;
                }
                self.state.unit_mut(id)?.experience += amount;
                experience.push((id, amount));
                actions.push(BattleAction::Experience(UnitExperienceProcessor {
                    unit: id,
                    experience: amount,
                }));
            }
        }

        self.completed = true;
        tracing::info!(%winner, rounds = self.round(), experience = total, "battle completed");
        Ok(BattleOutcome {
            winner,
            rounds: self.round(),
            experience,
            actions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::AttackEffectProcessor;
    use crate::random::ScriptedRandom;
    use crate::state::{AttackDuration, AttackKind, AttackType, UnitFlank, UnitType};
    use crate::test_helpers::*;

    fn with_initiative(mut unit_type: UnitType, initiative: u32) -> UnitType {
        unit_type.initiative = initiative;
        unit_type
    }

    fn battle() -> TestBattle {
        let mut battle = TestBattle::new();
        battle.config = BattleConfig::without_jitter();
        battle
    }

    fn next_turn(processor: &mut BattleProcessor) -> TurnStart {
        processor.start_next_turn().unwrap().unwrap()
    }

    #[test]
    fn poison_ticks_at_carrier_turn_starts_then_expires() {
        let mut battle = battle();
        let poison = ranged(
            AttackKind::Poison {
                duration: AttackDuration::Fixed(2),
            },
            5,
        );
        let poisoner = battle.add(
            BattleSide::Attacker,
            with_initiative(unit_type(1, 100, poison), 90),
            back(UnitFlank::Center),
        );
        let victim = battle.add(BattleSide::Defender, unit_type(2, 50, melee(10)), front(UnitFlank::Center));
        let mut processor = battle.into_processor(ScriptedRandom::constant(0));

        assert_eq!(next_turn(&mut processor).order.unit, poisoner);
        processor.process_command(BattleCommand::attack(victim)).unwrap();
        assert_eq!(processor.state().unit(victim).unwrap().hit_points, 50);

        let turn = next_turn(&mut processor);
        assert_eq!(turn.order.unit, victim);
        assert!(turn.can_act);
        assert!(matches!(
            turn.actions.as_slice(),
            [BattleAction::Effect(AttackEffectProcessor { damage: 5, completed: false, .. })]
        ));
        assert_eq!(processor.state().unit(victim).unwrap().hit_points, 45);
        processor.process_command(BattleCommand::Defend).unwrap();

        next_turn(&mut processor);
        processor.process_command(BattleCommand::Defend).unwrap();
        let turn = next_turn(&mut processor);
        assert_eq!(turn.order.unit, victim);
        let victim_unit = processor.state().unit(victim).unwrap();
        assert_eq!(victim_unit.hit_points, 40);
        assert!(!victim_unit.has_effect(AttackType::Poison));
        processor.process_command(BattleCommand::Defend).unwrap();

        next_turn(&mut processor);
        processor.process_command(BattleCommand::Defend).unwrap();
        next_turn(&mut processor);
        assert_eq!(processor.state().unit(victim).unwrap().hit_points, 40);
    }

    #[test]
    fn frostbite_and_blister_tick_for_their_power_then_expire() {
        for kind in [
            AttackKind::Frostbite {
                duration: AttackDuration::Fixed(2),
            },
            AttackKind::Blister {
                duration: AttackDuration::Fixed(2),
            },
        ] {
            let effect_type = kind.attack_type();
            let mut battle = battle();
            let caster = battle.add(
                BattleSide::Attacker,
                with_initiative(unit_type(1, 100, ranged(kind, 7)), 90),
                back(UnitFlank::Center),
            );
            let victim = battle.add(BattleSide::Defender, unit_type(2, 50, melee(10)), front(UnitFlank::Center));
            let mut processor = battle.into_processor(ScriptedRandom::constant(0));

            assert_eq!(next_turn(&mut processor).order.unit, caster);
            processor.process_command(BattleCommand::attack(victim)).unwrap();
            assert!(processor.state().unit(victim).unwrap().has_effect(effect_type));

            let turn = next_turn(&mut processor);
            assert_eq!(turn.order.unit, victim);
            assert!(matches!(
                turn.actions.as_slice(),
                [BattleAction::Effect(AttackEffectProcessor { damage: 7, completed: false, .. })]
            ));
            assert_eq!(processor.state().unit(victim).unwrap().hit_points, 43);
            processor.process_command(BattleCommand::Defend).unwrap();

            next_turn(&mut processor);
            processor.process_command(BattleCommand::Defend).unwrap();
            let turn = next_turn(&mut processor);
            assert_eq!(turn.order.unit, victim);
            assert!(matches!(
                turn.actions.first(),
                Some(BattleAction::Effect(AttackEffectProcessor { damage: 7, completed: true, .. }))
            ));
            let victim_unit = processor.state().unit(victim).unwrap();
            assert_eq!(victim_unit.hit_points, 36);
            assert!(!victim_unit.has_effect(effect_type));
        }
    }

    #[test]
    fn poison_tick_kills_carrier_before_it_acts() {
        let mut battle = battle();
        let poison = ranged(
            AttackKind::Poison {
                duration: AttackDuration::Fixed(2),
            },
            5,
        );
        battle.add(
            BattleSide::Attacker,
            with_initiative(unit_type(1, 100, poison), 90),
            back(UnitFlank::Center),
        );
        let victim = battle.add(BattleSide::Defender, unit_type(2, 50, melee(10)), front(UnitFlank::Center));
        battle.state.unit_mut(victim).unwrap().hit_points = 5;
        let mut processor = battle.into_processor(ScriptedRandom::constant(0));

        next_turn(&mut processor);
        processor.process_command(BattleCommand::attack(victim)).unwrap();

        let turn = next_turn(&mut processor);
        assert_eq!(turn.order.unit, victim);
        assert!(!turn.can_act);
        assert!(matches!(
            turn.actions.first(),
            Some(BattleAction::Effect(AttackEffectProcessor { damage: 5, .. }))
        ));
        assert!(turn.actions.iter().any(|a| matches!(a, BattleAction::Death(d) if d.unit == victim)));
        assert!(!turn.actions.iter().any(|a| matches!(a, BattleAction::TurnSkipped(_))));

        let dead = processor.state().unit(victim).unwrap();
        assert!(dead.is_dead());
        assert!(!dead.has_effect(AttackType::Poison));
        assert_eq!(processor.winner(), Some(BattleSide::Attacker));
        assert_eq!(processor.phase(), BattlePhase::BattleEnded);
        assert_eq!(processor.start_next_turn(), Err(BattleError::BattleEnded));
    }

    #[test]
    fn slowed_unit_moves_later_in_current_round() {
        let mut battle = battle();
        let slow = ranged(
            AttackKind::ReduceInitiative {
                duration: AttackDuration::Fixed(2),
            },
            50,
        );
        let caster = battle.add(
            BattleSide::Attacker,
            with_initiative(unit_type(1, 100, slow), 90),
            back(UnitFlank::Center),
        );
        let ally = battle.add(
            BattleSide::Attacker,
            with_initiative(unit_type(2, 100, melee(10)), 60),
            front(UnitFlank::Left),
        );
        let runner = battle.add(
            BattleSide::Defender,
            with_initiative(unit_type(3, 100, melee(10)), 80),
            front(UnitFlank::Center),
        );
        let mut processor = battle.into_processor(ScriptedRandom::constant(0));

        assert_eq!(next_turn(&mut processor).order.unit, caster);
        processor.process_command(BattleCommand::attack(runner)).unwrap();
        assert_eq!(processor.state().unit(runner).unwrap().initiative(), 40);

        assert_eq!(next_turn(&mut processor).order.unit, ally);
        processor.process_command(BattleCommand::Defend).unwrap();
        let turn = next_turn(&mut processor);
        assert_eq!(turn.order.unit, runner);
        assert_eq!(processor.round(), 1);
    }

    #[test]
    fn paralyzed_unit_loses_its_turn() {
        let mut battle = battle();
        let paralyze = ranged(
            AttackKind::Paralyze {
                duration: AttackDuration::Fixed(1),
            },
            0,
        );
        battle.add(
            BattleSide::Attacker,
            with_initiative(unit_type(1, 100, paralyze), 90),
            back(UnitFlank::Center),
        );
        let victim = battle.add(BattleSide::Defender, unit_type(2, 50, melee(10)), front(UnitFlank::Center));
        let mut processor = battle.into_processor(ScriptedRandom::constant(0));

        next_turn(&mut processor);
        processor.process_command(BattleCommand::attack(victim)).unwrap();

        let turn = next_turn(&mut processor);
        assert_eq!(turn.order.unit, victim);
        assert!(!turn.can_act);
        assert!(matches!(turn.actions.last(), Some(BattleAction::TurnSkipped(_))));
        assert!(!processor.state().unit(victim).unwrap().is_disabled());
        assert_eq!(
            processor.process_command(BattleCommand::Defend),
            Err(BattleError::NoCurrentUnit)
        );
    }

    #[test]
    fn wait_requeues_unit_after_pending_turns() {
        let mut battle = battle();
        let first = battle.add(
            BattleSide::Attacker,
            with_initiative(unit_type(1, 100, melee(10)), 90),
            front(UnitFlank::Left),
        );
        let second = battle.add(
            BattleSide::Attacker,
            with_initiative(unit_type(2, 100, melee(10)), 70),
            front(UnitFlank::Right),
        );
        let enemy = battle.add(BattleSide::Defender, unit_type(3, 200, melee(10)), front(UnitFlank::Center));
        let mut processor = battle.into_processor(ScriptedRandom::constant(0));

        assert_eq!(next_turn(&mut processor).order.unit, first);
        processor.process_command(BattleCommand::Wait).unwrap();
        assert_eq!(next_turn(&mut processor).order.unit, second);
        processor.process_command(BattleCommand::Defend).unwrap();
        assert_eq!(next_turn(&mut processor).order.unit, enemy);
        processor.process_command(BattleCommand::Defend).unwrap();

        let turn = next_turn(&mut processor);
        assert_eq!(turn.order.unit, first);
        assert_eq!(processor.round(), 1);
        assert_eq!(
            processor.process_command(BattleCommand::Wait),
            Err(BattleError::AlreadyWaited(first))
        );
        processor.process_command(BattleCommand::Defend).unwrap();

        assert_eq!(next_turn(&mut processor).order.unit, first);
        assert_eq!(processor.round(), 2);
    }

    #[test]
    fn retreat_resolves_at_next_turn_start() {
        let mut battle = battle();
        let coward = battle.add(
            BattleSide::Attacker,
            with_initiative(unit_type(1, 100, melee(10)), 90),
            front(UnitFlank::Center),
        );
        battle.add(BattleSide::Defender, unit_type(2, 100, melee(10)), front(UnitFlank::Center));
        let mut processor = battle.into_processor(ScriptedRandom::constant(0));

        next_turn(&mut processor);
        processor.process_command(BattleCommand::Retreat).unwrap();
        assert!(processor.state().unit(coward).unwrap().is_retreating());
        assert_eq!(processor.winner(), None);

        next_turn(&mut processor);
        processor.process_command(BattleCommand::Defend).unwrap();

        let turn = next_turn(&mut processor);
        assert_eq!(turn.order.unit, coward);
        assert!(!turn.can_act);
        assert!(matches!(turn.actions.as_slice(), [BattleAction::Retreat(_)]));
        assert_eq!(processor.winner(), Some(BattleSide::Defender));
        assert_eq!(processor.phase(), BattlePhase::BattleEnded);
        assert_eq!(processor.start_next_turn(), Err(BattleError::BattleEnded));
    }

    #[test]
    fn double_attack_grants_second_attack_turn() {
        let mut battle = battle();
        let mut twin = with_initiative(unit_type(1, 100, melee(10)), 90);
        twin.has_double_attack = true;
        let twin = battle.add(BattleSide::Attacker, twin, front(UnitFlank::Center));
        let enemy = battle.add(BattleSide::Defender, unit_type(2, 100, melee(10)), front(UnitFlank::Center));
        let mut processor = battle.into_processor(ScriptedRandom::constant(0));

        next_turn(&mut processor);
        processor.process_command(BattleCommand::attack(enemy)).unwrap();

        let turn = next_turn(&mut processor);
        assert_eq!(turn.order.unit, twin);
        assert_eq!(turn.order.kind, TurnKind::SecondAttack);
        assert_eq!(
            processor.process_command(BattleCommand::Wait),
            Err(BattleError::CommandNotAllowed {
                command: "wait",
                turn: TurnKind::SecondAttack
            })
        );
        processor.process_command(BattleCommand::attack(enemy)).unwrap();
        assert_eq!(processor.state().unit(enemy).unwrap().hit_points, 80);
        assert_eq!(next_turn(&mut processor).order.unit, enemy);
    }

    #[test]
    fn invalid_target_leaves_battle_untouched() {
        let mut battle = battle();
        battle.add(
            BattleSide::Attacker,
            with_initiative(unit_type(1, 100, melee(10)), 90),
            front(UnitFlank::Center),
        );
        let ally = battle.add(BattleSide::Attacker, unit_type(2, 100, melee(10)), front(UnitFlank::Left));
        battle.add(BattleSide::Defender, unit_type(3, 100, melee(10)), front(UnitFlank::Center));
        let mut processor = battle.into_processor(ScriptedRandom::constant(0));

        let turn = next_turn(&mut processor);
        let err = processor.process_command(BattleCommand::attack(ally)).unwrap_err();
        assert_eq!(err.error_code(), "invalid_target");
        assert_eq!(processor.current(), Some(turn.order));
        assert_eq!(processor.phase(), BattlePhase::ActionSelection);
        assert_eq!(processor.state().unit(ally).unwrap().hit_points, 100);
        assert_eq!(
            processor.start_next_turn(),
            Err(BattleError::TurnInProgress(turn.order.unit))
        );
    }

    #[test]
    fn secondary_attack_follows_a_hit_only() {
        let mut battle = battle();
        let mut stinger = with_initiative(unit_type(1, 100, melee(10).with_accuracy(50)), 90);
        stinger.secondary_attack = Some(ranged(
            AttackKind::Poison {
                duration: AttackDuration::Fixed(1),
            },
            5,
        ));
        let stinger = battle.add(BattleSide::Attacker, stinger, front(UnitFlank::Center));
        let enemy = battle.add(BattleSide::Defender, unit_type(2, 100, melee(10)), front(UnitFlank::Center));
        // main misses (99), then hits (0) and the poison lands (0)
        let mut processor = battle.into_processor(ScriptedRandom::new([99]));

        next_turn(&mut processor);
        let actions = processor.process_command(BattleCommand::attack(enemy)).unwrap();
        assert_eq!(actions.len(), 1);
        assert!(!processor.state().unit(enemy).unwrap().has_effect(AttackType::Poison));

        next_turn(&mut processor);
        processor.process_command(BattleCommand::attack(stinger)).unwrap();
        next_turn(&mut processor);
        let actions = processor.process_command(BattleCommand::attack(enemy)).unwrap();
        assert_eq!(actions.len(), 2);
        let enemy = processor.state().unit(enemy).unwrap();
        assert_eq!(enemy.hit_points, 90);
        assert!(enemy.has_effect(AttackType::Poison));
    }

    #[test]
    fn skippable_main_attack_falls_through_to_secondary() {
        let mut battle = battle();
        let mut priest = with_initiative(unit_type(1, 100, ranged(AttackKind::Heal, 20)), 90);
        priest.secondary_attack = Some(ranged(AttackKind::Cure, 0));
        let priest = battle.add(BattleSide::Attacker, priest, back(UnitFlank::Center));
        let patient = battle.add(BattleSide::Attacker, unit_type(2, 100, melee(10)), front(UnitFlank::Center));
        battle.add(BattleSide::Defender, unit_type(3, 100, melee(10)), front(UnitFlank::Center));
        battle.state.unit_mut(patient).unwrap().put_effect(crate::state::UnitBattleEffect::new(
            AttackType::Poison,
            crate::state::AttackSource::Death,
            crate::state::EffectDuration::Turns(3),
            5,
            patient,
        ));
        let mut processor = battle.into_processor(ScriptedRandom::constant(0));

        assert_eq!(next_turn(&mut processor).order.unit, priest);
        assert_eq!(
            processor.legal_targets(priest, AttackChoice::Main).unwrap(),
            vec![AttackTarget::Unit(patient)]
        );
        let actions = processor.process_command(BattleCommand::attack(patient)).unwrap();
        assert!(matches!(
            actions.as_slice(),
            [BattleAction::Attack(UnitSuccessAttackProcessor { result, .. })]
                if result.attack_type == AttackType::Cure
        ));
        assert!(!processor.state().unit(patient).unwrap().has_effect(AttackType::Poison));
    }

    #[test]
    fn area_attack_hits_every_living_member() {
        let mut battle = battle();
        let mut storm = ranged(AttackKind::Damage, 15);
        storm.reach = crate::state::AttackReach::All;
        battle.add(
            BattleSide::Attacker,
            with_initiative(unit_type(1, 100, storm), 90),
            back(UnitFlank::Center),
        );
        let a = battle.add(BattleSide::Defender, unit_type(2, 50, melee(10)), front(UnitFlank::Left));
        let b = battle.add(BattleSide::Defender, unit_type(3, 10, melee(10)), front(UnitFlank::Right));
        let corpse = battle.add(BattleSide::Defender, unit_type(4, 30, melee(10)), back(UnitFlank::Left));
        battle.state.unit_mut(corpse).unwrap().hit_points = 0;
        battle.state.unit_mut(corpse).unwrap().flags.insert(UnitFlags::DEAD);
        let mut processor = battle.into_processor(ScriptedRandom::constant(0));

        next_turn(&mut processor);
        let actions = processor.process_command(BattleCommand::attack(a)).unwrap();
        let attacks = actions
            .iter()
            .filter(|a| matches!(a, BattleAction::Attack(_)))
            .count();
        let deaths: Vec<_> = actions
            .iter()
            .filter_map(|a| match a {
                BattleAction::Death(d) => Some(d.unit),
                _ => None,
            })
            .collect();
        assert_eq!(attacks, 2);
        assert_eq!(deaths, vec![b]);
        assert_eq!(processor.state().unit(a).unwrap().hit_points, 35);
        assert!(!processor.queue().contains(b));
    }

    #[test]
    fn kill_ends_battle_and_awards_experience() {
        let mut battle = battle();
        let left = battle.add(
            BattleSide::Attacker,
            with_initiative(unit_type(1, 100, melee(50)), 90),
            front(UnitFlank::Left),
        );
        let right = battle.add(
            BattleSide::Attacker,
            with_initiative(unit_type(2, 100, melee(50)), 80),
            front(UnitFlank::Right),
        );
        let mut grunt = unit_type(3, 20, melee(5));
        grunt.xp_killed = 15;
        let first = battle.add(BattleSide::Defender, unit_type(4, 20, melee(5)), front(UnitFlank::Left));
        let second = battle.add(BattleSide::Defender, grunt, front(UnitFlank::Right));
        let mut processor = battle.into_processor(ScriptedRandom::constant(0));

        assert_eq!(processor.complete_battle(), Err(BattleError::BattleNotEnded));

        next_turn(&mut processor);
        processor.process_command(BattleCommand::attack(first)).unwrap();
        next_turn(&mut processor);
        let actions = processor.process_command(BattleCommand::attack(second)).unwrap();
        assert!(matches!(actions.last(), Some(BattleAction::Death(d)) if d.unit == second));
        assert_eq!(processor.winner(), Some(BattleSide::Attacker));
        assert_eq!(processor.phase(), BattlePhase::BattleEnded);

        let outcome = processor.complete_battle().unwrap();
        assert_eq!(outcome.winner, BattleSide::Attacker);
        assert_eq!(outcome.rounds, 1);
        assert_eq!(outcome.experience, vec![(left, 18), (right, 17)]);
        assert_eq!(processor.state().unit(left).unwrap().experience, 18);
        assert_eq!(processor.complete_battle(), Err(BattleError::BattleEnded));
    }

    #[test]
    fn fear_makes_target_retreat_on_its_turn() {
        let mut battle = battle();
        battle.add(
            BattleSide::Attacker,
            with_initiative(unit_type(1, 100, ranged(AttackKind::Fear, 0)), 90),
            back(UnitFlank::Center),
        );
        let scared = battle.add(BattleSide::Defender, unit_type(2, 100, melee(10)), front(UnitFlank::Center));
        battle.add(BattleSide::Defender, unit_type(3, 100, melee(10)), front(UnitFlank::Left));
        let mut processor = battle.into_processor(ScriptedRandom::constant(0));

        next_turn(&mut processor);
        processor.process_command(BattleCommand::attack(scared)).unwrap();
        let turn = next_turn(&mut processor);
        assert_eq!(turn.order.unit, scared);
        assert!(!turn.can_act);
        let unit = processor.state().unit(scared).unwrap();
        assert!(unit.flags.contains(UnitFlags::RETREATED));
        assert!(!unit.is_active());
    }

    #[test]
    fn given_attack_is_taken_immediately() {
        let mut battle = battle();
        let bard = battle.add(
            BattleSide::Attacker,
            with_initiative(unit_type(1, 100, ranged(AttackKind::GiveAdditionalAttack, 0)), 90),
            back(UnitFlank::Center),
        );
        let fighter = battle.add(
            BattleSide::Attacker,
            with_initiative(unit_type(2, 100, melee(10)), 10),
            front(UnitFlank::Center),
        );
        battle.add(BattleSide::Defender, unit_type(3, 100, melee(10)), front(UnitFlank::Center));
        let mut processor = battle.into_processor(ScriptedRandom::constant(0));

        assert_eq!(next_turn(&mut processor).order.unit, bard);
        processor.process_command(BattleCommand::attack(fighter)).unwrap();
        let turn = next_turn(&mut processor);
        assert_eq!(turn.order.unit, fighter);
        assert_eq!(turn.order.kind, TurnKind::AdditionalAttack);
    }

    #[test]
    fn effect_processors_follow_ownership_order() {
        let mut battle = battle();
        let caster = battle.add(
            BattleSide::Attacker,
            with_initiative(unit_type(1, 100, melee(10)), 90),
            front(UnitFlank::Center),
        );
        let target = battle.add(BattleSide::Defender, unit_type(2, 100, melee(10)), front(UnitFlank::Center));
        let effect = |ty, owner| {
            crate::state::UnitBattleEffect::new(
                ty,
                crate::state::AttackSource::Mind,
                crate::state::EffectDuration::Turns(2),
                10,
                owner,
            )
        };
        battle.state.unit_mut(caster).unwrap().put_effect(effect(AttackType::Poison, caster));
        battle
            .state
            .unit_mut(target)
            .unwrap()
            .put_effect(effect(AttackType::ReduceDamage, caster));
        battle.state.unit_mut(caster).unwrap().flags.insert(UnitFlags::DEFENDED);
        let processor = battle.into_processor(ScriptedRandom::constant(0));

        assert_eq!(
            processor.get_effect_processors(caster),
            vec![
                EffectProcessor::Tick {
                    carrier: caster,
                    effect_type: AttackType::Poison
                },
                EffectProcessor::Tick {
                    carrier: target,
                    effect_type: AttackType::ReduceDamage
                },
                EffectProcessor::CompleteDefend(caster),
            ]
        );
        assert!(processor.get_effect_processors(target).is_empty());
    }
}
