use std::fmt;

use arrayvec::ArrayVec;
use bitflags::bitflags;

use super::{
    AttackType, BattleSide, ProtectionCategory, ProtectionTarget, UnitAttack, UnitBattleEffect,
    UnitPosition, UnitProtection, UnitType,
};
use crate::config::BattleConfig;

/// Stable arena index of a unit in one battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitId(pub u32);

impl UnitId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

bitflags! {
    /// Battle status of a unit.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct UnitFlags: u16 {
        const DEAD       = 1 << 0;
        /// Will leave the battle at its next turn start.
        const RETREATING = 1 << 1;
        const RETREATED  = 1 << 2;
        /// Takes half damage until its next turn start.
        const DEFENDED   = 1 << 3;
        /// Was revived once this battle and cannot be revived again.
        const REVIVED    = 1 << 4;
        /// Already waited this round.
        const WAITED     = 1 << 5;
        /// Corpse covered by a summoned unit.
        const HIDDEN     = 1 << 6;
        /// Summoned unit whose summon ended.
        const UNSUMMONED = 1 << 7;
    }
}

impl UnitFlags {
    /// Flags that only make sense while the battle is running.
    pub const TRANSIENT: Self = Self::RETREATING
        .union(Self::DEFENDED)
        .union(Self::WAITED);
}

/// Saved state of a unit whose type was replaced by a transformation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transformation {
    pub original: UnitType,
    pub original_protections: Vec<UnitProtection>,
}

/// A unit taking part in a battle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Unit {
    pub id: UnitId,
    /// Current type; differs from the original while transformed.
    pub unit_type: UnitType,
    pub side: BattleSide,
    pub position: UnitPosition,
    pub hit_points: u32,
    pub max_hit_points: u32,
    pub flags: UnitFlags,
    pub effects: ArrayVec<UnitBattleEffect, { BattleConfig::MAX_BATTLE_EFFECTS }>,
    /// Base protections minus spent wards plus granted ones.
    pub protections: Vec<UnitProtection>,
    /// Experience earned in this battle.
    pub experience: u32,
    pub summoned_by: Option<UnitId>,
    /// Corpses covered by this summoned unit.
    pub hidden_units: Vec<UnitId>,
    pub hidden_by: Option<UnitId>,
    pub transformed_from: Option<Box<Transformation>>,
}

impl Unit {
    pub fn new(id: UnitId, unit_type: UnitType, side: BattleSide, position: UnitPosition) -> Self {
        Self {
            id,
            hit_points: unit_type.hit_points,
            max_hit_points: unit_type.hit_points,
            protections: unit_type.protections.clone(),
            unit_type,
            side,
            position,
            flags: UnitFlags::empty(),
            effects: ArrayVec::new(),
            experience: 0,
            summoned_by: None,
            hidden_units: Vec::new(),
            hidden_by: None,
            transformed_from: None,
        }
    }

    // ===== status =====

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.flags.contains(UnitFlags::DEAD)
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.is_dead()
    }

    /// On the grid: not hidden and not unsummoned. Includes corpses.
    #[inline]
    pub fn is_present(&self) -> bool {
        !self
            .flags
            .intersects(UnitFlags::HIDDEN | UnitFlags::UNSUMMONED)
    }

    /// Still fighting: alive, present, and not retreated.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.is_present() && !self.flags.intersects(UnitFlags::DEAD | UnitFlags::RETREATED)
    }

    pub fn is_retreating(&self) -> bool {
        self.flags.contains(UnitFlags::RETREATING)
    }

    pub fn is_defended(&self) -> bool {
        self.flags.contains(UnitFlags::DEFENDED)
    }

    pub fn is_large(&self) -> bool {
        self.position.is_large()
    }

    pub fn is_transformed(&self) -> bool {
        self.transformed_from.is_some()
    }

    pub fn is_summoned(&self) -> bool {
        self.summoned_by.is_some()
    }

    /// Paralyzed or petrified.
    pub fn is_disabled(&self) -> bool {
        self.effects.iter().any(|e| e.effect_type.is_disable())
    }

    /// Able to take a turn right now.
    pub fn can_act(&self) -> bool {
        self.is_active() && !self.is_retreating() && !self.is_disabled()
    }

    pub fn missing_hit_points(&self) -> u32 {
        self.max_hit_points.saturating_sub(self.hit_points)
    }

    // ===== effect-modified stats =====

    pub fn effect(&self, effect_type: AttackType) -> Option<&UnitBattleEffect> {
        self.effects.iter().find(|e| e.effect_type == effect_type)
    }

    pub fn has_effect(&self, effect_type: AttackType) -> bool {
        self.effect(effect_type).is_some()
    }

    /// Armor after reductions, before the armor cap.
    pub fn armor(&self) -> u32 {
        let reduction = self.effect(AttackType::ReduceArmor).map_or(0, |e| e.power);
        self.unit_type.armor.saturating_sub(reduction)
    }

    /// Base initiative after reductions, without round jitter.
    pub fn initiative(&self) -> u32 {
        let reduction = self
            .effect(AttackType::ReduceInitiative)
            .map_or(0, |e| e.power.min(100));
        self.unit_type.initiative * (100 - reduction) / 100
    }

    /// Chance in percent that `attack` used by this unit hits.
    pub fn accuracy_percent(&self, attack: &UnitAttack) -> u32 {
        attack.accuracy.min(100)
    }

    /// Percentage applied to this unit's outgoing attack power.
    pub fn damage_percent(&self) -> u32 {
        let increase = self.effect(AttackType::IncreaseDamage).map_or(0, |e| e.power);
        let reduction = self.effect(AttackType::ReduceDamage).map_or(0, |e| e.power);
        (100 + increase).saturating_sub(reduction)
    }

    // ===== protections =====

    /// Finds a protection of `category` matching the attack type or source.
    pub fn find_protection(
        &self,
        category: ProtectionCategory,
        target: ProtectionTarget,
    ) -> Option<&UnitProtection> {
        self.protections
            .iter()
            .find(|p| p.category == category && p.target == target)
    }

    pub fn has_protection(&self, protection: &UnitProtection) -> bool {
        self.protections.contains(protection)
    }

    /// Removes one matching protection. Returns false if none was present.
    pub fn remove_protection(&mut self, protection: &UnitProtection) -> bool {
        match self.protections.iter().position(|p| p == protection) {
            Some(index) => {
                self.protections.remove(index);
                true
            }
            None => false,
        }
    }

    // ===== mutation =====

    /// Stores `effect`, replacing an existing effect of the same type.
    pub(crate) fn put_effect(&mut self, effect: UnitBattleEffect) {
        if let Some(existing) = self
            .effects
            .iter_mut()
            .find(|e| e.effect_type == effect.effect_type)
        {
            *existing = effect;
            return;
        }
        if let Err(err) = self.effects.try_push(effect) {
            tracing::warn!(unit = %self.id, effect = %err.element().effect_type, "effect capacity exceeded");
        }
    }

    pub(crate) fn take_effect(&mut self, effect_type: AttackType) -> Option<UnitBattleEffect> {
        let index = self
            .effects
            .iter()
            .position(|e| e.effect_type == effect_type)?;
        Some(self.effects.remove(index))
    }

    /// Lowers hit points by at most the remaining amount. Returns the damage dealt.
    pub(crate) fn take_damage(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.hit_points);
        self.hit_points -= dealt;
        dealt
    }

    /// Raises hit points up to the maximum. Returns the amount healed.
    pub(crate) fn heal(&mut self, amount: u32) -> u32 {
        let healed = amount.min(self.missing_hit_points());
        self.hit_points += healed;
        healed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        AttackKind, AttackReach, AttackSource, EffectDuration, UnitAttack, UnitFlank, UnitTypeId,
    };

    fn create_test_type(hit_points: u32, armor: u32, initiative: u32) -> UnitType {
        UnitType {
            id: UnitTypeId(1),
            name: "Squire".into(),
            level: 1,
            is_large: false,
            hit_points,
            armor,
            initiative,
            main_attack: UnitAttack::new(
                AttackKind::Damage,
                AttackSource::Weapon,
                AttackReach::Adjacent,
            )
            .with_power(25),
            secondary_attack: None,
            alternative_attack: None,
            has_double_attack: false,
            has_critical_hit: false,
            protections: vec![],
            xp_killed: 10,
            previous_type: None,
        }
    }

    fn create_test_unit() -> Unit {
        Unit::new(
            UnitId(0),
            create_test_type(100, 30, 50),
            BattleSide::Attacker,
            UnitPosition::front(UnitFlank::Center),
        )
    }

    fn effect(effect_type: AttackType, power: u32) -> UnitBattleEffect {
        UnitBattleEffect::new(
            effect_type,
            AttackSource::Mind,
            EffectDuration::Turns(2),
            power,
            UnitId(9),
        )
    }

    #[test]
    fn armor_reduction_never_underflows() {
        let mut unit = create_test_unit();
        unit.put_effect(effect(AttackType::ReduceArmor, 50));
        assert_eq!(unit.armor(), 0);
    }

    #[test]
    fn initiative_reduction_is_a_percentage() {
        let mut unit = create_test_unit();
        unit.put_effect(effect(AttackType::ReduceInitiative, 50));
        assert_eq!(unit.initiative(), 25);
    }

    #[test]
    fn damage_modifiers_combine() {
        let mut unit = create_test_unit();
        unit.put_effect(effect(AttackType::IncreaseDamage, 25));
        unit.put_effect(effect(AttackType::ReduceDamage, 50));
        assert_eq!(unit.damage_percent(), 75);
    }

    #[test]
    fn put_effect_replaces_same_type() {
        let mut unit = create_test_unit();
        unit.put_effect(effect(AttackType::Poison, 5));
        unit.put_effect(effect(AttackType::Poison, 8));
        assert_eq!(unit.effects.len(), 1);
        assert_eq!(unit.effect(AttackType::Poison).map(|e| e.power), Some(8));
    }

    #[test]
    fn damage_and_heal_stay_within_bounds() {
        let mut unit = create_test_unit();
        assert_eq!(unit.take_damage(150), 100);
        assert_eq!(unit.hit_points, 0);
        assert_eq!(unit.heal(250), 100);
        assert_eq!(unit.hit_points, unit.max_hit_points);
    }

    #[test]
    fn disabled_unit_cannot_act() {
        let mut unit = create_test_unit();
        assert!(unit.can_act());
        unit.put_effect(UnitBattleEffect::new(
            AttackType::Petrify,
            AttackSource::Earth,
            EffectDuration::Turns(1),
            0,
            unit.id,
        ));
        assert!(!unit.can_act());
    }
}
