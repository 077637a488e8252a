//! Battle scenarios: two squads built from catalog unit types.

use battle_core::{BattleSide, BattleState, PlayerId, UnitPosition, UnitTypeId, UnitTypeOracle};

use crate::error::ContentError;

/// One unit placed into a squad.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitPlacement {
    pub unit_type: UnitTypeId,
    pub position: UnitPosition,
}

/// Composition of one squad.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SquadSpec {
    pub player: PlayerId,
    /// Squad is controlled by the AI.
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_computer: bool,
    pub units: Vec<UnitPlacement>,
}

/// Battle setup: who attacks whom with which units.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scenario {
    pub name: String,
    pub attacker: SquadSpec,
    pub defender: SquadSpec,
}

impl Scenario {
    pub fn squad(&self, side: BattleSide) -> &SquadSpec {
        match side {
            BattleSide::Attacker => &self.attacker,
            BattleSide::Defender => &self.defender,
        }
    }

    /// Builds the initial battle state, attacker units first.
    ///
    /// Placement errors (overlapping cells, size mismatches, full squads) are
    /// reported by the engine.
    pub fn build(&self, unit_types: &dyn UnitTypeOracle) -> Result<BattleState, ContentError> {
        let mut state = BattleState::new(self.attacker.player, self.defender.player)
            .with_computer(self.attacker.is_computer, self.defender.is_computer);

        for side in [BattleSide::Attacker, BattleSide::Defender] {
            let squad = self.squad(side);
            if squad.units.is_empty() {
                return Err(ContentError::EmptySquad(side));
            }
            for placement in &squad.units {
                let unit_type = unit_types.unit_type(placement.unit_type).ok_or(
                    ContentError::UnknownUnitType {
                        side,
                        unit_type: placement.unit_type,
                    },
                )?;
                state.add_unit(side, unit_type.clone(), placement.position)?;
            }
        }
        tracing::debug!(
            scenario = %self.name,
            attackers = self.attacker.units.len(),
            defenders = self.defender.units.len(),
            "scenario built"
        );
        Ok(state)
    }
}
