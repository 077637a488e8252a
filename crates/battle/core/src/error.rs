//! Error infrastructure for battle-core.
//!
//! Invalid commands and targets are contract violations by the caller and are
//! reported as [`BattleError`] values; the engine never resolves them silently.

use crate::state::{AttackType, BattleSide, UnitId, UnitPosition, UnitTypeId};

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the caller may retry with another command
/// - **Validation**: invalid input that should be rejected without retry
/// - **Internal**: unexpected state inconsistency, indicates a bug
/// - **Fatal**: battle state is corrupted and cannot continue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Errors raised by battle state mutation and command processing.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BattleError {
    #[error("unit {0} not found")]
    UnitNotFound(UnitId),

    #[error("unit type {0} not found")]
    UnitTypeNotFound(UnitTypeId),

    #[error("{side} squad cell {position:?} is occupied")]
    CellOccupied {
        side: BattleSide,
        position: UnitPosition,
    },

    #[error("{0} squad is full")]
    SquadFull(BattleSide),

    #[error("position {position:?} does not fit the unit size")]
    PositionSizeMismatch { position: UnitPosition },

    #[error("{target:?} is not a legal target for {attacker}")]
    InvalidTarget {
        attacker: UnitId,
        target: crate::attack::AttackTarget,
    },

    #[error("{0} has no alternative attack")]
    NoAlternativeAttack(UnitId),

    #[error("{command} is not allowed during a {turn} turn")]
    CommandNotAllowed {
        command: &'static str,
        turn: crate::turn::TurnKind,
    },

    #[error("{0} already waited this round")]
    AlreadyWaited(UnitId),

    #[error("no unit is selecting an action")]
    NoCurrentUnit,

    #[error("{0} is still selecting an action")]
    TurnInProgress(UnitId),

    #[error("no unit can take a turn")]
    NoActiveUnits,

    #[error("battle has ended")]
    BattleEnded,

    #[error("battle has not ended")]
    BattleNotEnded,

    #[error("{attack} effect is missing on {unit}")]
    EffectNotFound { unit: UnitId, attack: AttackType },
}

impl BattleError {
    pub const fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidTarget { .. }
            | Self::NoAlternativeAttack(_)
            | Self::CommandNotAllowed { .. }
            | Self::AlreadyWaited(_) => ErrorSeverity::Recoverable,
            Self::CellOccupied { .. }
            | Self::SquadFull(_)
            | Self::PositionSizeMismatch { .. }
            | Self::UnitNotFound(_)
            | Self::NoCurrentUnit
            | Self::TurnInProgress(_)
            | Self::BattleEnded
            | Self::BattleNotEnded => ErrorSeverity::Validation,
            Self::UnitTypeNotFound(_) => ErrorSeverity::Fatal,
            Self::EffectNotFound { .. } | Self::NoActiveUnits => ErrorSeverity::Internal,
        }
    }

    /// Static identifier of the variant, for logs and tests.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::UnitNotFound(_) => "unit_not_found",
            Self::UnitTypeNotFound(_) => "unit_type_not_found",
            Self::CellOccupied { .. } => "cell_occupied",
            Self::SquadFull(_) => "squad_full",
            Self::PositionSizeMismatch { .. } => "position_size_mismatch",
            Self::InvalidTarget { .. } => "invalid_target",
            Self::NoAlternativeAttack(_) => "no_alternative_attack",
            Self::CommandNotAllowed { .. } => "command_not_allowed",
            Self::AlreadyWaited(_) => "already_waited",
            Self::NoCurrentUnit => "no_current_unit",
            Self::TurnInProgress(_) => "turn_in_progress",
            Self::NoActiveUnits => "no_active_units",
            Self::BattleEnded => "battle_ended",
            Self::BattleNotEnded => "battle_not_ended",
            Self::EffectNotFound { .. } => "effect_not_found",
        }
    }
}

pub type Result<T> = std::result::Result<T, BattleError>;
