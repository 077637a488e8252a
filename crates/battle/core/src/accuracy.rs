//! Accuracy and protection resolution for enemy-targeting attacks.
//!
//! The order is fixed:
//!
//! 1. immunity to the attack type
//! 2. immunity to the attack source
//! 3. accuracy roll, `rand[0, 100) < accuracy` (see [`Unit::accuracy_percent`])
//! 4. ward against the attack type
//! 5. ward against the attack source
//!
//! Immunities are checked before the roll, so an immune target consumes no
//! random draw. Wards are checked after it, so a missed attack leaves the
//! ward intact.

use crate::attack::AttackOutcome;
use crate::random::BattleRandom;
use crate::state::{ProtectionCategory, ProtectionTarget, Unit, UnitAttack};

/// Returns the nullifying outcome, or `None` if the attack lands.
pub fn resolve(
    attack: &UnitAttack,
    attacker: &Unit,
    target: &Unit,
    random: &mut dyn BattleRandom,
) -> Option<AttackOutcome> {
    let by_type = ProtectionTarget::Type(attack.attack_type());
    let by_source = ProtectionTarget::Source(attack.source);

    for protected in [by_type, by_source] {
        if target
            .find_protection(ProtectionCategory::Immunity, protected)
            .is_some()
        {
            return Some(AttackOutcome::Immune(protected));
        }
    }

    if random.get(100) >= attacker.accuracy_percent(attack) {
        return Some(AttackOutcome::Miss);
    }

    for protected in [by_type, by_source] {
        if let Some(ward) = target.find_protection(ProtectionCategory::Ward, protected) {
            return Some(AttackOutcome::Ward(*ward));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;
    use crate::state::{
        AttackKind, AttackReach, AttackSource, AttackType, BattleSide, UnitFlank, UnitId,
        UnitPosition, UnitProtection, UnitType, UnitTypeId,
    };

    fn create_test_target(protections: Vec<UnitProtection>) -> Unit {
        let unit_type = UnitType {
            id: UnitTypeId(1),
            name: "Golem".into(),
            level: 2,
            is_large: false,
            hit_points: 80,
            armor: 0,
            initiative: 20,
            main_attack: UnitAttack::new(
                AttackKind::Damage,
                AttackSource::Weapon,
                AttackReach::Adjacent,
            ),
            secondary_attack: None,
            alternative_attack: None,
            has_double_attack: false,
            has_critical_hit: false,
            protections,
            xp_killed: 0,
            previous_type: None,
        };
        Unit::new(
            UnitId(0),
            unit_type,
            BattleSide::Defender,
            UnitPosition::front(UnitFlank::Left),
        )
    }

    fn resolve_on(
        attack: &UnitAttack,
        target: &Unit,
        random: &mut dyn BattleRandom,
    ) -> Option<AttackOutcome> {
        let caster = create_test_target(vec![]);
        resolve(attack, &caster, target, random)
    }

    fn fire_bolt(accuracy: u32) -> UnitAttack {
        UnitAttack::new(AttackKind::Damage, AttackSource::Fire, AttackReach::Any)
            .with_power(20)
            .with_accuracy(accuracy)
    }

    #[test]
    fn immunity_consumes_no_roll() {
        let target = create_test_target(vec![UnitProtection::immunity(
            ProtectionTarget::Source(AttackSource::Fire),
        )]);
        let mut random = ScriptedRandom::new([99]);

        let outcome = resolve_on(&fire_bolt(100), &target, &mut random);

        assert_eq!(
            outcome,
            Some(AttackOutcome::Immune(ProtectionTarget::Source(
                AttackSource::Fire
            )))
        );
        assert_eq!(random.draws(), 0);
    }

    #[test]
    fn type_immunity_is_checked_before_source_immunity() {
        let target = create_test_target(vec![
            UnitProtection::immunity(ProtectionTarget::Source(AttackSource::Fire)),
            UnitProtection::immunity(ProtectionTarget::Type(AttackType::Damage)),
        ]);
        let outcome = resolve_on(&fire_bolt(100), &target, &mut ScriptedRandom::constant(0));
        assert_eq!(
            outcome,
            Some(AttackOutcome::Immune(ProtectionTarget::Type(AttackType::Damage)))
        );
    }

    #[test]
    fn roll_at_accuracy_misses() {
        let target = create_test_target(vec![]);
        assert_eq!(
            resolve_on(&fire_bolt(80), &target, &mut ScriptedRandom::new([80])),
            Some(AttackOutcome::Miss)
        );
        assert_eq!(
            resolve_on(&fire_bolt(80), &target, &mut ScriptedRandom::new([79])),
            None
        );
    }

    #[test]
    fn miss_is_reported_before_ward() {
        let ward = UnitProtection::ward(ProtectionTarget::Source(AttackSource::Fire));
        let target = create_test_target(vec![ward]);
        assert_eq!(
            resolve_on(&fire_bolt(50), &target, &mut ScriptedRandom::new([90])),
            Some(AttackOutcome::Miss)
        );
        assert_eq!(
            resolve_on(&fire_bolt(50), &target, &mut ScriptedRandom::new([10])),
            Some(AttackOutcome::Ward(ward))
        );
    }

    #[test]
    fn accuracy_above_hundred_is_capped() {
        let caster = create_test_target(vec![]);
        assert_eq!(caster.accuracy_percent(&fire_bolt(150)), 100);
        assert_eq!(caster.accuracy_percent(&fire_bolt(60)), 60);
        let target = create_test_target(vec![]);
        assert_eq!(
            resolve_on(&fire_bolt(150), &target, &mut ScriptedRandom::new([99])),
            None
        );
    }
}
