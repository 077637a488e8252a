//! Battle data model.
//!
//! Units live in an arena owned by [`BattleState`] and are referenced by their
//! stable [`UnitId`]. Summon and transformation links (`summoned_by`,
//! `hidden_units`, `hidden_by`, `transformed_from`) are ids or saved values,
//! never references, so state can be cloned and snapshotted freely.

mod attack;
mod effect;
mod protection;
mod squad;
mod unit;
mod unit_type;

pub use attack::{
    AttackDuration, AttackKind, AttackReach, AttackSource, AttackType, TargetSide, UnitAttack,
};
pub use effect::{EffectDuration, UnitBattleEffect};
pub use protection::{ProtectionCategory, ProtectionTarget, UnitProtection};
pub use squad::{BattleSide, PlayerId, Squad, UnitFlank, UnitLine, UnitPosition};
pub use unit::{Transformation, Unit, UnitFlags, UnitId};
pub use unit_type::{UnitType, UnitTypeId, UnitTypeOracle};

use crate::config::BattleConfig;
use crate::error::{BattleError, Result};

/// Both squads and every unit that ever took part in the battle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleState {
    units: Vec<Unit>,
    attacker: Squad,
    defender: Squad,
}

impl BattleState {
    pub fn new(attacker: PlayerId, defender: PlayerId) -> Self {
        Self {
            units: Vec::new(),
            attacker: Squad::new(BattleSide::Attacker, attacker, false),
            defender: Squad::new(BattleSide::Defender, defender, true),
        }
    }

    /// Marks which squads the AI controls.
    #[must_use]
    pub fn with_computer(mut self, attacker: bool, defender: bool) -> Self {
        self.attacker.is_computer = attacker;
        self.defender.is_computer = defender;
        self
    }

    // ===== lookup =====

    pub fn squad(&self, side: BattleSide) -> &Squad {
        match side {
            BattleSide::Attacker => &self.attacker,
            BattleSide::Defender => &self.defender,
        }
    }

    pub(crate) fn squad_mut(&mut self, side: BattleSide) -> &mut Squad {
        match side {
            BattleSide::Attacker => &mut self.attacker,
            BattleSide::Defender => &mut self.defender,
        }
    }

    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id.index())
    }

    pub fn unit(&self, id: UnitId) -> Result<&Unit> {
        self.get(id).ok_or(BattleError::UnitNotFound(id))
    }

    pub(crate) fn unit_mut(&mut self, id: UnitId) -> Result<&mut Unit> {
        self.units
            .get_mut(id.index())
            .ok_or(BattleError::UnitNotFound(id))
    }

    /// Every unit in the arena, including hidden and unsummoned ones.
    pub fn all_units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    pub(crate) fn all_units_mut(&mut self) -> impl Iterator<Item = &mut Unit> {
        self.units.iter_mut()
    }

    /// Units on the grid of `side`, corpses included, in squad order.
    pub fn units(&self, side: BattleSide) -> impl Iterator<Item = &Unit> {
        self.squad(side)
            .units
            .iter()
            .filter_map(|id| self.get(*id))
    }

    /// Units of `side` still fighting.
    pub fn active_units(&self, side: BattleSide) -> impl Iterator<Item = &Unit> {
        self.units(side).filter(|u| u.is_active())
    }

    pub fn has_active_units(&self, side: BattleSide) -> bool {
        self.active_units(side).next().is_some()
    }

    /// Unit standing on the cell, preferring a living unit over a corpse.
    pub fn unit_at(&self, side: BattleSide, position: UnitPosition) -> Option<&Unit> {
        let mut found = None;
        for unit in self.units(side).filter(|u| u.position.overlaps(&position)) {
            if unit.is_active() {
                return Some(unit);
            }
            found.get_or_insert(unit);
        }
        found
    }

    /// Returns true if `position` holds no living or retreating unit.
    pub fn is_cell_free(&self, side: BattleSide, position: UnitPosition) -> bool {
        self.units(side)
            .filter(|u| u.position.overlaps(&position))
            .all(|u| !u.is_active())
    }

    // ===== building =====

    /// Places a new unit of `unit_type` into the squad of `side`.
    pub fn add_unit(
        &mut self,
        side: BattleSide,
        unit_type: UnitType,
        position: UnitPosition,
    ) -> Result<UnitId> {
        if unit_type.is_large != position.is_large() {
            return Err(BattleError::PositionSizeMismatch { position });
        }
        if self.squad(side).is_full() {
            return Err(BattleError::SquadFull(side));
        }
        if self
            .units(side)
            .any(|u| u.position.overlaps(&position))
        {
            return Err(BattleError::CellOccupied { side, position });
        }
        self.spawn(side, unit_type, position)
    }

    /// Pushes a unit into the arena and onto its squad without occupancy checks.
    pub(crate) fn spawn(
        &mut self,
        side: BattleSide,
        unit_type: UnitType,
        position: UnitPosition,
    ) -> Result<UnitId> {
        if self.squad(side).is_full() {
            return Err(BattleError::SquadFull(side));
        }
        let id = UnitId(self.units.len() as u32);
        self.units.push(Unit::new(id, unit_type, side, position));
        self.squad_mut(side)
            .units
            .try_push(id)
            .map_err(|_| BattleError::SquadFull(side))?;
        Ok(id)
    }

    // ===== summon links =====

    /// Places a summoned unit, taking the corpses in `position` off the grid
    /// first so their slots are free for it.
    pub(crate) fn summon(
        &mut self,
        side: BattleSide,
        unit_type: UnitType,
        position: UnitPosition,
    ) -> Result<UnitId> {
        let covered: Vec<UnitId> = self
            .units(side)
            .filter(|u| u.position.overlaps(&position))
            .map(|u| u.id)
            .collect();
        if let Some(occupant) = covered.iter().find_map(|id| self.get(*id).filter(|u| u.is_active())) {
            return Err(BattleError::CellOccupied {
                side,
                position: occupant.position,
            });
        }
        if self.squad(side).units.len() - covered.len() >= BattleConfig::MAX_SQUAD_UNITS {
            return Err(BattleError::SquadFull(side));
        }

        let id = UnitId(self.units.len() as u32);
        for hidden in &covered {
            self.hide(*hidden, id, side)?;
        }
        self.spawn(side, unit_type, position)?;
        self.unit_mut(id)?.hidden_units.extend(covered);
        Ok(id)
    }

    fn hide(&mut self, id: UnitId, under: UnitId, side: BattleSide) -> Result<()> {
        self.squad_mut(side).remove(id);
        let unit = self.unit_mut(id)?;
        unit.flags.insert(UnitFlags::HIDDEN);
        unit.hidden_by = Some(under);
        Ok(())
    }

    /// Removes a summoned unit from the grid and brings back what it covered.
    ///
    /// A hidden unit still overlapped by another unit on the grid (a large
    /// corpse under two small summons) moves under that unit instead.
    pub(crate) fn unsummon(&mut self, id: UnitId) -> Result<()> {
        let unit = self.unit_mut(id)?;
        unit.flags.insert(UnitFlags::UNSUMMONED);
        unit.effects.clear();
        let side = unit.side;
        let hidden = std::mem::take(&mut unit.hidden_units);
        self.squad_mut(side).remove(id);

        for hidden_id in hidden {
            let footprint = self.unit(hidden_id)?.position;
            let cover = self
                .units(side)
                .find(|u| u.position.overlaps(&footprint))
                .map(|u| u.id);
            if let Some(cover) = cover {
                self.unit_mut(hidden_id)?.hidden_by = Some(cover);
                self.unit_mut(cover)?.hidden_units.push(hidden_id);
                tracing::debug!(unit = %hidden_id, %cover, "hidden unit stays covered");
                continue;
            }

            let restored = self.unit_mut(hidden_id)?;
            restored.flags.remove(UnitFlags::HIDDEN);
            restored.hidden_by = None;
            self.squad_mut(side)
                .units
                .try_push(hidden_id)
                .map_err(|_| BattleError::SquadFull(side))?;
        }
        tracing::debug!(unit = %id, "unsummoned");
        Ok(())
    }

    // ===== transformation =====

    /// Replaces the type of `id`, saving the original for [`Self::restore`].
    ///
    /// Hit points keep their ratio to the maximum; a living unit keeps at
    /// least one.
    pub(crate) fn transform(&mut self, id: UnitId, into: UnitType) -> Result<()> {
        let unit = self.unit_mut(id)?;
        if unit.is_transformed() {
            return Ok(());
        }
        let granted = granted_protections(unit);
        let original = std::mem::replace(&mut unit.unit_type, into);
        let original_protections =
            std::mem::replace(&mut unit.protections, unit.unit_type.protections.clone());
        merge_protections(&mut unit.protections, granted);

        let max = unit.unit_type.hit_points;
        unit.hit_points = scale_hit_points(unit.hit_points, unit.max_hit_points, max);
        unit.max_hit_points = max;
        unit.transformed_from = Some(Box::new(Transformation {
            original,
            original_protections,
        }));
        Ok(())
    }

    /// Reverts a transformation. No-op for a unit that is not transformed.
    pub(crate) fn restore(&mut self, id: UnitId) -> Result<()> {
        let unit = self.unit_mut(id)?;
        let Some(saved) = unit.transformed_from.take() else {
            return Ok(());
        };
        let Transformation {
            original,
            original_protections,
        } = *saved;
        let granted = granted_protections(unit);
        unit.unit_type = original;
        unit.protections = original_protections;
        merge_protections(&mut unit.protections, granted);

        let max = unit.unit_type.hit_points;
        unit.hit_points = scale_hit_points(unit.hit_points, unit.max_hit_points, max);
        unit.max_hit_points = max;
        Ok(())
    }

    // ===== effects =====

    /// Removes an effect from `carrier` and undoes what it changed.
    ///
    /// Returns the removed effect, or `None` if the carrier had none of that
    /// type.
    pub(crate) fn complete_effect(
        &mut self,
        carrier: UnitId,
        effect_type: AttackType,
    ) -> Result<Option<UnitBattleEffect>> {
        let unit = self.unit_mut(carrier)?;
        let Some(effect) = unit.take_effect(effect_type) else {
            return Ok(None);
        };
        for protection in &effect.granted {
            unit.remove_protection(protection);
        }
        match effect_type {
            AttackType::Summon => self.unsummon(carrier)?,
            AttackType::TransformEnemy
            | AttackType::TransformSelf
            | AttackType::ReduceLevel
            | AttackType::Doppelganger => self.restore(carrier)?,
            _ => {}
        }
        tracing::debug!(unit = %carrier, effect = %effect_type, "effect completed");
        Ok(Some(effect))
    }

    /// Completes every effect on `carrier`.
    pub(crate) fn complete_all_effects(&mut self, carrier: UnitId) -> Result<Vec<UnitBattleEffect>> {
        let types: Vec<AttackType> = self
            .unit(carrier)?
            .effects
            .iter()
            .map(|e| e.effect_type)
            .collect();
        let mut completed = Vec::with_capacity(types.len());
        for effect_type in types {
            if let Some(effect) = self.complete_effect(carrier, effect_type)? {
                completed.push(effect);
            }
        }
        Ok(completed)
    }
}

fn granted_protections(unit: &Unit) -> Vec<UnitProtection> {
    unit.effects
        .iter()
        .flat_map(|e| e.granted.iter().copied())
        .filter(|p| unit.has_protection(p))
        .collect()
}

fn merge_protections(protections: &mut Vec<UnitProtection>, granted: Vec<UnitProtection>) {
    for protection in granted {
        if !protections.contains(&protection) {
            protections.push(protection);
        }
    }
}

fn scale_hit_points(hit_points: u32, from_max: u32, to_max: u32) -> u32 {
    if hit_points == 0 || from_max == 0 {
        return 0;
    }
    let scaled = (u64::from(hit_points) * u64::from(to_max) / u64::from(from_max)) as u32;
    scaled.clamp(1, to_max.max(1))
}
