//! Asynchronous abstraction for sourcing battle commands.
//!
//! Sessions ask a [`CommandProvider`] whenever a unit may act, so a battle
//! can run with human input, scripted fixtures, or the engine AI.

use std::cell::RefCell;
use std::collections::VecDeque;

use async_trait::async_trait;
use battle_core::{BattleAiProcessor, BattleCommand, BattleProcessor, UnitId};

use crate::error::{Result, RuntimeError};

/// Provides the command of the unit selecting an action.
///
/// The processor is borrowed read-only; providers must not assume it stays
/// unchanged after they return.
#[async_trait(?Send)]
pub trait CommandProvider {
    async fn provide_command(&self, battle: &BattleProcessor, unit: UnitId) -> Result<BattleCommand>;
}

/// Commands chosen by [`BattleAiProcessor`].
#[derive(Clone, Copy, Debug, Default)]
pub struct AiCommandProvider;

#[async_trait(?Send)]
impl CommandProvider for AiCommandProvider {
    async fn provide_command(&self, battle: &BattleProcessor, unit: UnitId) -> Result<BattleCommand> {
        Ok(BattleAiProcessor::get_command(battle, unit)?)
    }
}

/// Replays a fixed list of commands, then fails.
#[derive(Debug, Default)]
pub struct ScriptedCommandProvider {
    commands: RefCell<VecDeque<BattleCommand>>,
}

impl ScriptedCommandProvider {
    pub fn new(commands: impl IntoIterator<Item = BattleCommand>) -> Self {
        Self {
            commands: RefCell::new(commands.into_iter().collect()),
        }
    }
}

#[async_trait(?Send)]
impl CommandProvider for ScriptedCommandProvider {
    async fn provide_command(&self, _battle: &BattleProcessor, unit: UnitId) -> Result<BattleCommand> {
        self.commands
            .borrow_mut()
            .pop_front()
            .ok_or(RuntimeError::NoCommand { unit })
    }
}
