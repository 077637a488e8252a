use crate::config::BattleConfig;
use crate::error::{BattleError, Result};
use crate::state::{BattleSide, BattleState, Unit, UnitPosition, UnitTypeOracle};
use crate::turn::UnitTurnQueue;

use super::AttackTarget;

// ============================================================================
// Attack Processor Context
// ============================================================================

/// Read-only view of the battle used to check and calculate one attack on
/// one target.
///
/// Built per evaluation; never outlives the borrow of the battle state.
pub struct AttackProcessorContext<'a> {
    /// The unit performing the attack.
    pub attacker: &'a Unit,

    /// The single target this evaluation is about (area attacks are expanded
    /// before a context is built).
    pub target: AttackTarget,

    /// Both squads and every unit.
    pub state: &'a BattleState,

    pub queue: &'a UnitTurnQueue,

    pub round: u32,

    pub config: &'a BattleConfig,

    /// Unit types for summons and transformations.
    pub unit_types: &'a dyn UnitTypeOracle,
}

impl<'a> AttackProcessorContext<'a> {
    pub fn new(
        attacker: &'a Unit,
        target: AttackTarget,
        state: &'a BattleState,
        queue: &'a UnitTurnQueue,
        config: &'a BattleConfig,
        unit_types: &'a dyn UnitTypeOracle,
    ) -> Self {
        Self {
            attacker,
            target,
            state,
            queue,
            round: queue.round(),
            config,
            unit_types,
        }
    }

    /// Target unit, if the target is a unit that exists.
    pub fn target_unit(&self) -> Option<&'a Unit> {
        match self.target {
            AttackTarget::Unit(id) => self.state.get(id),
            AttackTarget::Cell { .. } => None,
        }
    }

    /// Target unit, or an invalid target error for cell targets and unknown ids.
    pub fn require_target(&self) -> Result<&'a Unit> {
        self.target_unit().ok_or(BattleError::InvalidTarget {
            attacker: self.attacker.id,
            target: self.target,
        })
    }

    /// Target cell, if the target is a cell.
    pub fn target_cell(&self) -> Option<(BattleSide, UnitPosition)> {
        match self.target {
            AttackTarget::Cell { side, position } => Some((side, position)),
            AttackTarget::Unit(_) => None,
        }
    }

    pub fn targets_self(&self) -> bool {
        self.target == AttackTarget::Unit(self.attacker.id)
    }
}
