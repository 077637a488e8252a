//! Content validation errors.

use battle_core::{BattleError, BattleSide, UnitTypeId};

/// Inconsistent content found while building a catalog or a scenario.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum ContentError {
    #[error("unit type {0} is defined more than once")]
    DuplicateUnitType(UnitTypeId),

    #[error("unit type {referrer} refers to unknown unit type {missing}")]
    DanglingReference {
        referrer: UnitTypeId,
        missing: UnitTypeId,
    },

    #[error("unit type {0} summons nothing")]
    EmptySummon(UnitTypeId),

    #[error("unit type {0} has accuracy above 100")]
    InvalidAccuracy(UnitTypeId),

    #[error("{side} squad places unknown unit type {unit_type}")]
    UnknownUnitType {
        side: BattleSide,
        unit_type: UnitTypeId,
    },

    #[error("{0} squad has no units")]
    EmptySquad(BattleSide),

    #[error("invalid placement: {0}")]
    Placement(#[from] BattleError),
}
