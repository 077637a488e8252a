//! Unified error types surfaced by the runtime API.
//!
//! Wraps engine failures and configuration problems so clients can bubble
//! them up with consistent context.

use battle_core::{BattleError, UnitId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Battle(#[from] BattleError),

    #[error("invalid value {value:?} for {name}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("command provider gave up on {unit}")]
    NoCommand { unit: UnitId },

    #[error("battle session already finished")]
    SessionFinished,
}

impl RuntimeError {
    /// Returns true if the error came from an engine contract violation.
    pub fn is_battle_error(&self) -> bool {
        matches!(self, Self::Battle(_))
    }
}
