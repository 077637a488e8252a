use super::{AttackSource, AttackType};

/// Wards are spent on the first attack they stop; immunities never are.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ProtectionCategory {
    Ward,
    Immunity,
}

/// What a protection matches against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProtectionTarget {
    Source(AttackSource),
    Type(AttackType),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitProtection {
    pub category: ProtectionCategory,
    pub target: ProtectionTarget,
}

impl UnitProtection {
    pub const fn ward(target: ProtectionTarget) -> Self {
        Self {
            category: ProtectionCategory::Ward,
            target,
        }
    }

    pub const fn immunity(target: ProtectionTarget) -> Self {
        Self {
            category: ProtectionCategory::Immunity,
            target,
        }
    }

    pub const fn is_ward(&self) -> bool {
        matches!(self.category, ProtectionCategory::Ward)
    }
}
