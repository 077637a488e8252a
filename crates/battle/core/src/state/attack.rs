//! Attack definitions.
//!
//! [`AttackKind`] is a closed sum type: each variant carries only the fields
//! its semantics need (durations, summoned types, transform targets, granted
//! protections). [`AttackType`] is the fieldless tag used to name effects,
//! protections, and log lines.

use super::{UnitProtection, UnitTypeId};

/// Elemental or physical origin of an attack. Protections match on it.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AttackSource {
    Weapon,
    Mind,
    Life,
    Death,
    Fire,
    Water,
    Earth,
    Air,
}

/// How many and which targets an attack can reach.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AttackReach {
    /// One enemy in melee range.
    Adjacent,
    /// One unit anywhere on the target side.
    Any,
    /// Every unit of the target side.
    All,
}

/// Duration of the effect an attack leaves behind, as declared on the attack.
///
/// `Random` is resolved to a fixed number of turns (inclusive bounds) when the
/// attack is calculated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackDuration {
    Fixed(u32),
    Random { min: u32, max: u32 },
    Infinite,
}

impl Default for AttackDuration {
    fn default() -> Self {
        Self::Fixed(1)
    }
}

/// Fieldless tag of an [`AttackKind`].
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AttackType {
    Damage,
    DrainLife,
    DrainLifeOverflow,
    Paralyze,
    Petrify,
    Fear,
    Heal,
    Revive,
    Cure,
    IncreaseDamage,
    ReduceDamage,
    ReduceInitiative,
    ReduceArmor,
    Poison,
    Frostbite,
    Blister,
    Summon,
    TransformEnemy,
    TransformSelf,
    ReduceLevel,
    Doppelganger,
    GiveAdditionalAttack,
    GiveProtection,
}

impl AttackType {
    /// Damage-over-time effects that hurt their carrier at each turn start.
    pub const fn is_damage_over_time(self) -> bool {
        matches!(self, Self::Poison | Self::Frostbite | Self::Blister)
    }

    /// Effects that make the carrier skip its turns.
    pub const fn is_disable(self) -> bool {
        matches!(self, Self::Paralyze | Self::Petrify)
    }

    /// Effects a Cure attack removes.
    pub const fn is_curable(self) -> bool {
        matches!(
            self,
            Self::Poison
                | Self::Frostbite
                | Self::Blister
                | Self::ReduceDamage
                | Self::ReduceInitiative
                | Self::ReduceArmor
        )
    }

    /// Effects that change the unit type of their carrier.
    pub const fn is_transformation(self) -> bool {
        matches!(
            self,
            Self::TransformEnemy | Self::TransformSelf | Self::ReduceLevel | Self::Doppelganger
        )
    }

    /// Attacks that deal direct damage through [`crate::attack`] damage rules.
    pub const fn deals_damage(self) -> bool {
        matches!(
            self,
            Self::Damage | Self::DrainLife | Self::DrainLifeOverflow
        )
    }

    /// Whether the carrier counts the effect's duration on its own turns.
    ///
    /// Other effects are counted on the turns of the unit that applied them.
    pub const fn is_owned_by_target(self) -> bool {
        matches!(
            self,
            Self::Paralyze
                | Self::Petrify
                | Self::Poison
                | Self::Frostbite
                | Self::Blister
                | Self::TransformSelf
                | Self::Doppelganger
        )
    }
}

/// Which units an attack kind may be aimed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetSide {
    Enemy,
    Ally,
    /// A cell of the attacker's own squad.
    AllyCell,
    /// The attacker itself.
    OnlySelf,
    /// A unit on either side.
    AnySide,
}

/// Semantics of an attack, with the parameters each semantic needs.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackKind {
    Damage,
    DrainLife,
    DrainLifeOverflow,
    Paralyze { duration: AttackDuration },
    Petrify { duration: AttackDuration },
    Fear,
    Heal,
    Revive,
    Cure,
    IncreaseDamage { duration: AttackDuration },
    ReduceDamage { duration: AttackDuration },
    ReduceInitiative { duration: AttackDuration },
    ReduceArmor { duration: AttackDuration },
    Poison { duration: AttackDuration },
    Frostbite { duration: AttackDuration },
    Blister { duration: AttackDuration },
    Summon {
        unit_types: Vec<UnitTypeId>,
        duration: AttackDuration,
    },
    TransformEnemy {
        into: UnitTypeId,
        duration: AttackDuration,
    },
    TransformSelf { into: UnitTypeId },
    ReduceLevel { duration: AttackDuration },
    Doppelganger,
    GiveAdditionalAttack,
    GiveProtection {
        protections: Vec<UnitProtection>,
        duration: AttackDuration,
    },
}

impl AttackKind {
    pub const fn attack_type(&self) -> AttackType {
        match self {
            Self::Damage => AttackType::Damage,
            Self::DrainLife => AttackType::DrainLife,
            Self::DrainLifeOverflow => AttackType::DrainLifeOverflow,
            Self::Paralyze { .. } => AttackType::Paralyze,
            Self::Petrify { .. } => AttackType::Petrify,
            Self::Fear => AttackType::Fear,
            Self::Heal => AttackType::Heal,
            Self::Revive => AttackType::Revive,
            Self::Cure => AttackType::Cure,
            Self::IncreaseDamage { .. } => AttackType::IncreaseDamage,
            Self::ReduceDamage { .. } => AttackType::ReduceDamage,
            Self::ReduceInitiative { .. } => AttackType::ReduceInitiative,
            Self::ReduceArmor { .. } => AttackType::ReduceArmor,
            Self::Poison { .. } => AttackType::Poison,
            Self::Frostbite { .. } => AttackType::Frostbite,
            Self::Blister { .. } => AttackType::Blister,
            Self::Summon { .. } => AttackType::Summon,
            Self::TransformEnemy { .. } => AttackType::TransformEnemy,
            Self::TransformSelf { .. } => AttackType::TransformSelf,
            Self::ReduceLevel { .. } => AttackType::ReduceLevel,
            Self::Doppelganger => AttackType::Doppelganger,
            Self::GiveAdditionalAttack => AttackType::GiveAdditionalAttack,
            Self::GiveProtection { .. } => AttackType::GiveProtection,
        }
    }

    pub const fn target_side(&self) -> TargetSide {
        match self {
            Self::Damage
            | Self::DrainLife
            | Self::DrainLifeOverflow
            | Self::Paralyze { .. }
            | Self::Petrify { .. }
            | Self::Fear
            | Self::ReduceDamage { .. }
            | Self::ReduceInitiative { .. }
            | Self::ReduceArmor { .. }
            | Self::Poison { .. }
            | Self::Frostbite { .. }
            | Self::Blister { .. }
            | Self::TransformEnemy { .. }
            | Self::ReduceLevel { .. } => TargetSide::Enemy,
            Self::Heal
            | Self::Revive
            | Self::Cure
            | Self::IncreaseDamage { .. }
            | Self::GiveAdditionalAttack
            | Self::GiveProtection { .. } => TargetSide::Ally,
            Self::Summon { .. } => TargetSide::AllyCell,
            Self::TransformSelf { .. } => TargetSide::OnlySelf,
            Self::Doppelganger => TargetSide::AnySide,
        }
    }

    /// Whether a secondary attack may run alone when this main attack has
    /// nothing to do on a target.
    pub const fn can_main_attack_be_skipped(&self) -> bool {
        matches!(
            self,
            Self::Heal | Self::Cure | Self::GiveAdditionalAttack | Self::Revive
        )
    }

    /// Declared effect duration, if the kind leaves an effect.
    pub const fn duration(&self) -> Option<AttackDuration> {
        match self {
            Self::Paralyze { duration }
            | Self::Petrify { duration }
            | Self::IncreaseDamage { duration }
            | Self::ReduceDamage { duration }
            | Self::ReduceInitiative { duration }
            | Self::ReduceArmor { duration }
            | Self::Poison { duration }
            | Self::Frostbite { duration }
            | Self::Blister { duration }
            | Self::Summon { duration, .. }
            | Self::TransformEnemy { duration, .. }
            | Self::ReduceLevel { duration }
            | Self::GiveProtection { duration, .. } => Some(*duration),
            Self::TransformSelf { .. } | Self::Doppelganger => Some(AttackDuration::Infinite),
            Self::Damage
            | Self::DrainLife
            | Self::DrainLifeOverflow
            | Self::Fear
            | Self::Heal
            | Self::Revive
            | Self::Cure
            | Self::GiveAdditionalAttack => None,
        }
    }
}

/// One attack of a unit type.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitAttack {
    pub kind: AttackKind,
    pub source: AttackSource,
    pub reach: AttackReach,
    /// Chance to hit in percent (0-100).
    pub accuracy: u32,
    /// Damage, heal amount, effect strength or damage-over-time per turn,
    /// depending on the kind.
    pub power: u32,
}

impl UnitAttack {
    pub fn new(kind: AttackKind, source: AttackSource, reach: AttackReach) -> Self {
        Self {
            kind,
            source,
            reach,
            accuracy: 100,
            power: 0,
        }
    }

    #[must_use]
    pub fn with_power(mut self, power: u32) -> Self {
        self.power = power;
        self
    }

    #[must_use]
    pub fn with_accuracy(mut self, accuracy: u32) -> Self {
        self.accuracy = accuracy;
        self
    }

    pub const fn attack_type(&self) -> AttackType {
        self.kind.attack_type()
    }
}
