use std::fmt;

use super::{UnitAttack, UnitProtection};

/// Identifier of a unit type in the content catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitTypeId(pub u32);

impl fmt::Display for UnitTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

/// Static description of a kind of unit.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitType {
    pub id: UnitTypeId,
    pub name: String,
    pub level: u32,
    /// Large units occupy both line cells of one flank.
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_large: bool,
    pub hit_points: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub armor: u32,
    pub initiative: u32,
    pub main_attack: UnitAttack,
    #[cfg_attr(feature = "serde", serde(default))]
    pub secondary_attack: Option<UnitAttack>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub alternative_attack: Option<UnitAttack>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub has_double_attack: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub has_critical_hit: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub protections: Vec<UnitProtection>,
    /// Experience awarded to the winners for killing a unit of this type.
    #[cfg_attr(feature = "serde", serde(default))]
    pub xp_killed: u32,
    /// Type a level reduction turns this unit into.
    #[cfg_attr(feature = "serde", serde(default))]
    pub previous_type: Option<UnitTypeId>,
}

impl UnitType {
    /// Returns true if any of the unit's attacks deals direct damage.
    pub fn deals_damage(&self) -> bool {
        self.main_attack.attack_type().deals_damage()
            || self
                .secondary_attack
                .as_ref()
                .is_some_and(|a| a.attack_type().deals_damage())
    }

    /// Rough combat strength used by the AI: damage power times initiative
    /// weight plus remaining durability.
    pub fn threat(&self) -> u32 {
        let power = if self.main_attack.attack_type().deals_damage() {
            self.main_attack.power
        } else {
            self.level * 10
        };
        let multiplier = if self.has_double_attack { 2 } else { 1 };
        power * multiplier + self.level * 5
    }
}

/// Lookup of unit types by id.
///
/// Implemented by the content layer; the engine needs it to create summoned
/// units and resolve transformations.
pub trait UnitTypeOracle {
    fn unit_type(&self, id: UnitTypeId) -> Option<&UnitType>;
}

impl<T: UnitTypeOracle + ?Sized> UnitTypeOracle for &T {
    fn unit_type(&self, id: UnitTypeId) -> Option<&UnitType> {
        (**self).unit_type(id)
    }
}

impl UnitTypeOracle for std::collections::HashMap<UnitTypeId, UnitType> {
    fn unit_type(&self, id: UnitTypeId) -> Option<&UnitType> {
        self.get(&id)
    }
}
