//! Unit type catalog.

use std::collections::HashMap;

use battle_core::{AttackKind, UnitAttack, UnitType, UnitTypeId, UnitTypeOracle};

use crate::error::ContentError;

/// Every unit type known to a battle, indexed by id.
///
/// Summon, transform and level reduction attacks refer to other entries by
/// id; [`UnitCatalog::new`] rejects references that do not resolve.
#[derive(Clone, Debug, Default)]
pub struct UnitCatalog {
    types: HashMap<UnitTypeId, UnitType>,
}

impl UnitCatalog {
    /// Builds a catalog and validates its cross references.
    pub fn new(unit_types: impl IntoIterator<Item = UnitType>) -> Result<Self, ContentError> {
        let mut types = HashMap::new();
        for unit_type in unit_types {
            let id = unit_type.id;
            if types.insert(id, unit_type).is_some() {
                return Err(ContentError::DuplicateUnitType(id));
            }
        }
        let catalog = Self { types };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Unit types sorted by id.
    pub fn iter(&self) -> impl Iterator<Item = &UnitType> {
        let mut types: Vec<&UnitType> = self.types.values().collect();
        types.sort_by_key(|t| t.id);
        types.into_iter()
    }

    fn validate(&self) -> Result<(), ContentError> {
        for unit_type in self.types.values() {
            let attacks = [
                Some(&unit_type.main_attack),
                unit_type.secondary_attack.as_ref(),
                unit_type.alternative_attack.as_ref(),
            ];
            for attack in attacks.into_iter().flatten() {
                self.validate_attack(unit_type.id, attack)?;
            }
            if let Some(previous) = unit_type.previous_type {
                self.require(unit_type.id, previous)?;
            }
        }
        Ok(())
    }

    fn validate_attack(&self, owner: UnitTypeId, attack: &UnitAttack) -> Result<(), ContentError> {
        if attack.accuracy > 100 {
            return Err(ContentError::InvalidAccuracy(owner));
        }
        match &attack.kind {
            AttackKind::Summon { unit_types, .. } => {
                if unit_types.is_empty() {
                    return Err(ContentError::EmptySummon(owner));
                }
                for id in unit_types {
                    self.require(owner, *id)?;
                }
            }
            AttackKind::TransformEnemy { into, .. } | AttackKind::TransformSelf { into } => {
                self.require(owner, *into)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn require(&self, referrer: UnitTypeId, missing: UnitTypeId) -> Result<(), ContentError> {
        if self.types.contains_key(&missing) {
            Ok(())
        } else {
            Err(ContentError::DanglingReference { referrer, missing })
        }
    }
}

impl UnitTypeOracle for UnitCatalog {
    fn unit_type(&self, id: UnitTypeId) -> Option<&UnitType> {
        self.types.get(&id)
    }
}
