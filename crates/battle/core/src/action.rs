//! Result processors.
//!
//! Every state change the battle processor commits is reported as a
//! [`BattleAction`]. State is already updated when an action is returned;
//! the begin/complete hooks only inform presentation, so a consumer may
//! animate them at any pace (or not at all) without changing the outcome.

use crate::attack::CalculatedAttackResult;
use crate::state::{AttackType, UnitId};
use crate::turn::TurnKind;

/// Receiver of result processor hooks. Every hook defaults to a no-op.
pub trait BattlePresenter {
    fn attack_began(&mut self, _result: &CalculatedAttackResult) {}
    fn attack_completed(&mut self, _result: &CalculatedAttackResult, _summoned: Option<UnitId>) {}
    fn effect_began(&mut self, _effect: &AttackEffectProcessor) {}
    fn effect_completed(&mut self, _effect: &AttackEffectProcessor) {}
    fn unit_died(&mut self, _unit: UnitId) {}
    fn unit_retreated(&mut self, _unit: UnitId) {}
    fn turn_skipped(&mut self, _unit: UnitId) {}
    fn defend_completed(&mut self, _unit: UnitId) {}
    fn command_issued(&mut self, _unit: UnitId, _command: CommandKind) {}
    fn experience_gained(&mut self, _unit: UnitId, _experience: u32) {}
}

/// Presenter that ignores every hook.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPresenter;

impl BattlePresenter for NullPresenter {}

/// Non-attack commands, as reported to presenters.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CommandKind {
    Defend,
    Wait,
    Retreat,
}

/// What a presentation layer should animate for an action.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr, strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum AnimationKind {
    Attack,
    Miss,
    Effect,
    Death,
    Retreat,
    TurnSkipped,
    DefendCompleted,
    Command,
    Experience,
}

/// Animation request attached to an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnimationHint {
    pub kind: AnimationKind,
    /// Unit that performs or suffers the animation.
    pub unit: UnitId,
    pub attack_type: Option<AttackType>,
}

/// Two-phase presentation of one committed action.
pub trait ActionProcessor {
    fn process_begin_action(&self, presenter: &mut dyn BattlePresenter);
    fn process_completed_action(&self, presenter: &mut dyn BattlePresenter);
    fn animation(&self) -> AnimationHint;
}

// ============================================================================
// Processors
// ============================================================================

/// One attack on one target, hit or not.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitSuccessAttackProcessor {
    pub result: CalculatedAttackResult,
    /// Unit created by a summon.
    pub summoned: Option<UnitId>,
}

impl ActionProcessor for UnitSuccessAttackProcessor {
    fn process_begin_action(&self, presenter: &mut dyn BattlePresenter) {
        presenter.attack_began(&self.result);
    }

    fn process_completed_action(&self, presenter: &mut dyn BattlePresenter) {
        presenter.attack_completed(&self.result, self.summoned);
    }

    fn animation(&self) -> AnimationHint {
        AnimationHint {
            kind: if self.result.is_success() {
                AnimationKind::Attack
            } else {
                AnimationKind::Miss
            },
            unit: self.result.attacker,
            attack_type: Some(self.result.attack_type),
        }
    }
}

/// An effect processed at a turn start or forced to complete.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackEffectProcessor {
    /// Unit carrying the effect.
    pub unit: UnitId,
    pub effect_type: AttackType,
    /// Damage dealt by a damage-over-time effect.
    pub damage: u32,
    /// The carrier loses this turn.
    pub skips_turn: bool,
    /// The effect ended and was removed.
    pub completed: bool,
    /// Removed without running out (cure, death, battle end).
    pub forced: bool,
}

impl ActionProcessor for AttackEffectProcessor {
    fn process_begin_action(&self, presenter: &mut dyn BattlePresenter) {
        presenter.effect_began(self);
    }

    fn process_completed_action(&self, presenter: &mut dyn BattlePresenter) {
        presenter.effect_completed(self);
    }

    fn animation(&self) -> AnimationHint {
        AnimationHint {
            kind: AnimationKind::Effect,
            unit: self.unit,
            attack_type: Some(self.effect_type),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitDeathProcessor {
    pub unit: UnitId,
}

impl ActionProcessor for UnitDeathProcessor {
    fn process_begin_action(&self, _presenter: &mut dyn BattlePresenter) {}

    fn process_completed_action(&self, presenter: &mut dyn BattlePresenter) {
        presenter.unit_died(self.unit);
    }

    fn animation(&self) -> AnimationHint {
        AnimationHint {
            kind: AnimationKind::Death,
            unit: self.unit,
            attack_type: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitRetreatProcessor {
    pub unit: UnitId,
}

impl ActionProcessor for UnitRetreatProcessor {
    fn process_begin_action(&self, _presenter: &mut dyn BattlePresenter) {}

    fn process_completed_action(&self, presenter: &mut dyn BattlePresenter) {
        presenter.unit_retreated(self.unit);
    }

    fn animation(&self) -> AnimationHint {
        AnimationHint {
            kind: AnimationKind::Retreat,
            unit: self.unit,
            attack_type: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitTurnSkippedProcessor {
    pub unit: UnitId,
    pub turn: TurnKind,
}

impl ActionProcessor for UnitTurnSkippedProcessor {
    fn process_begin_action(&self, _presenter: &mut dyn BattlePresenter) {}

    fn process_completed_action(&self, presenter: &mut dyn BattlePresenter) {
        presenter.turn_skipped(self.unit);
    }

    fn animation(&self) -> AnimationHint {
        AnimationHint {
            kind: AnimationKind::TurnSkipped,
            unit: self.unit,
            attack_type: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefendCompletedProcessor {
    pub unit: UnitId,
}

impl ActionProcessor for DefendCompletedProcessor {
    fn process_begin_action(&self, _presenter: &mut dyn BattlePresenter) {}

    fn process_completed_action(&self, presenter: &mut dyn BattlePresenter) {
        presenter.defend_completed(self.unit);
    }

    fn animation(&self) -> AnimationHint {
        AnimationHint {
            kind: AnimationKind::DefendCompleted,
            unit: self.unit,
            attack_type: None,
        }
    }
}

/// Defend, wait or retreat chosen by a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitCommandProcessor {
    pub unit: UnitId,
    pub command: CommandKind,
}

impl ActionProcessor for UnitCommandProcessor {
    fn process_begin_action(&self, presenter: &mut dyn BattlePresenter) {
        presenter.command_issued(self.unit, self.command);
    }

    fn process_completed_action(&self, _presenter: &mut dyn BattlePresenter) {}

    fn animation(&self) -> AnimationHint {
        AnimationHint {
            kind: AnimationKind::Command,
            unit: self.unit,
            attack_type: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitExperienceProcessor {
    pub unit: UnitId,
    pub experience: u32,
}

impl ActionProcessor for UnitExperienceProcessor {
    fn process_begin_action(&self, _presenter: &mut dyn BattlePresenter) {}

    fn process_completed_action(&self, presenter: &mut dyn BattlePresenter) {
        presenter.experience_gained(self.unit, self.experience);
    }

    fn animation(&self) -> AnimationHint {
        AnimationHint {
            kind: AnimationKind::Experience,
            unit: self.unit,
            attack_type: None,
        }
    }
}

// ============================================================================
// Battle Action
// ============================================================================

/// Committed battle event with its presentation hooks.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleAction {
    Attack(UnitSuccessAttackProcessor),
    Effect(AttackEffectProcessor),
    Death(UnitDeathProcessor),
    Retreat(UnitRetreatProcessor),
    TurnSkipped(UnitTurnSkippedProcessor),
    DefendCompleted(DefendCompletedProcessor),
    Command(UnitCommandProcessor),
    Experience(UnitExperienceProcessor),
}

impl BattleAction {
    fn processor(&self) -> &dyn ActionProcessor {
        match self {
            Self::Attack(p) => p,
            Self::Effect(p) => p,
            Self::Death(p) => p,
            Self::Retreat(p) => p,
            Self::TurnSkipped(p) => p,
            Self::DefendCompleted(p) => p,
            Self::Command(p) => p,
            Self::Experience(p) => p,
        }
    }

    /// Runs both hooks back to back.
    pub fn present(&self, presenter: &mut dyn BattlePresenter) {
        self.process_begin_action(presenter);
        self.process_completed_action(presenter);
    }
}

impl ActionProcessor for BattleAction {
    fn process_begin_action(&self, presenter: &mut dyn BattlePresenter) {
        self.processor().process_begin_action(presenter);
    }

    fn process_completed_action(&self, presenter: &mut dyn BattlePresenter) {
        self.processor().process_completed_action(presenter);
    }

    fn animation(&self) -> AnimationHint {
        self.processor().animation()
    }
}
