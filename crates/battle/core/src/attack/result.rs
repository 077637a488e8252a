use crate::state::{
    AttackSource, AttackType, BattleSide, ProtectionTarget, UnitBattleEffect, UnitId,
    UnitPosition, UnitProtection, UnitType,
};

/// What an attack is aimed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackTarget {
    Unit(UnitId),
    /// A squad cell, for summons.
    Cell {
        side: BattleSide,
        position: UnitPosition,
    },
}

impl From<UnitId> for AttackTarget {
    fn from(id: UnitId) -> Self {
        Self::Unit(id)
    }
}

/// Healing a drain attack hands out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitHeal {
    pub unit: UnitId,
    pub amount: u32,
}

/// Outcome of a calculated attack, ready to be applied.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackOutcome {
    /// Stopped by an immunity. No roll was made.
    Immune(ProtectionTarget),
    Miss,
    /// Stopped by a ward, which is spent when the outcome is applied.
    Ward(UnitProtection),
    Damage {
        damage: u32,
        critical: u32,
    },
    Drain {
        damage: u32,
        critical: u32,
        heals: Vec<UnitHeal>,
    },
    Heal {
        amount: u32,
    },
    Revive {
        hit_points: u32,
    },
    Cure {
        cured: Vec<AttackType>,
    },
    Fear,
    /// An effect placed on the target.
    Effect(UnitBattleEffect),
    AdditionalAttack,
    Summon {
        unit_type: UnitType,
        position: UnitPosition,
        effect: UnitBattleEffect,
    },
    /// The carrier takes the `into` type while the effect lasts.
    Transform {
        carrier: UnitId,
        into: UnitType,
        effect: UnitBattleEffect,
    },
}

impl AttackOutcome {
    /// False when the attack was nullified by an immunity, a ward, or a miss.
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Immune(_) | Self::Miss | Self::Ward(_))
    }

    /// Total hit points taken from the target.
    pub const fn damage(&self) -> u32 {
        match self {
            Self::Damage { damage, critical } | Self::Drain { damage, critical, .. } => {
                *damage + *critical
            }
            _ => 0,
        }
    }
}

/// Fully calculated attack, produced without touching battle state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalculatedAttackResult {
    pub attacker: UnitId,
    pub target: AttackTarget,
    pub attack_type: AttackType,
    pub source: AttackSource,
    pub outcome: AttackOutcome,
}

impl CalculatedAttackResult {
    pub const fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    pub const fn target_unit(&self) -> Option<UnitId> {
        match self.target {
            AttackTarget::Unit(id) => Some(id),
            AttackTarget::Cell { .. } => None,
        }
    }
}
