//! Turn-based squad battle rules.
//!
//! `battle-core` resolves battles between two squads of up to six units. All
//! state mutation flows through [`processor::BattleProcessor`]: it starts unit
//! turns, resolves commands and reports every committed change as a
//! [`action::BattleAction`]. Animated consumers pace those actions against
//! their presentation; [`instant::BattleInstantProcessor`] resolves a whole
//! battle at once with the same turn loop.
pub mod accuracy;
pub mod action;
pub mod ai;
pub mod attack;
pub mod config;
pub mod error;
pub mod instant;
pub mod processor;
pub mod random;
pub mod state;
pub mod turn;

#[cfg(test)]
mod test_helpers;

pub use action::{
    ActionProcessor, AnimationHint, AnimationKind, AttackEffectProcessor, BattleAction,
    BattlePresenter, CommandKind, DefendCompletedProcessor, NullPresenter, UnitCommandProcessor,
    UnitDeathProcessor, UnitExperienceProcessor, UnitRetreatProcessor, UnitSuccessAttackProcessor,
    UnitTurnSkippedProcessor,
};
pub use ai::BattleAiProcessor;
pub use attack::{AttackOutcome, AttackProcessorContext, AttackTarget, CalculatedAttackResult};
pub use config::BattleConfig;
pub use error::{BattleError, ErrorSeverity, Result};
pub use instant::BattleInstantProcessor;
pub use processor::{
    AttackChoice, BattleCommand, BattleOutcome, BattlePhase, BattleProcessor, EffectProcessor,
    TurnStart,
};
pub use random::{BattleRandom, PcgRandom, ScriptedRandom};
pub use state::{
    AttackDuration, AttackKind, AttackReach, AttackSource, AttackType, BattleSide, BattleState,
    EffectDuration, PlayerId, ProtectionCategory, ProtectionTarget, Squad, TargetSide, Unit,
    UnitAttack, UnitBattleEffect, UnitFlags, UnitFlank, UnitId, UnitLine, UnitPosition,
    UnitProtection, UnitType, UnitTypeId, UnitTypeOracle,
};
pub use turn::{TurnKind, UnitTurnOrder, UnitTurnQueue};
