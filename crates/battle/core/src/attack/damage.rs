//! Damage, DrainLife and DrainLifeOverflow.

use crate::error::Result;
use crate::random::BattleRandom;
use crate::state::{BattleState, UnitAttack};

use super::{AttackOutcome, AttackProcessorContext, CalculatedAttackResult, UnitHeal, target_id};

pub(super) fn can_attack(ctx: &AttackProcessorContext<'_>) -> bool {
    ctx.target_unit().is_some_and(|t| t.is_active())
}

/// Rolls damage and the critical bonus against the context's target.
///
/// `damage = (power + rand[0, range)) * (100 - min(armor, cap)) / 100`, halved
/// if the target defends, never more than its hit points. The critical bonus
/// ignores armor and defence and is capped by what is left.
fn roll(
    attack: &UnitAttack,
    ctx: &AttackProcessorContext<'_>,
    random: &mut dyn BattleRandom,
) -> Result<(u32, u32)> {
    let target = ctx.require_target()?;
    let attacker = ctx.attacker;

    let power = attack.power * attacker.damage_percent() / 100;
    let armor = target.armor().min(ctx.config.max_armor);

    let mut damage = power + random.get_range(0, ctx.config.damage_range);
    damage = damage * 100u32.saturating_sub(armor) / 100;
    if target.is_defended() {
        damage /= 2;
    }
    let damage = damage.min(target.hit_points);

    let critical = if attacker.unit_type.has_critical_hit {
        (power * ctx.config.critical_percent / 100).min(target.hit_points - damage)
    } else {
        0
    };
    Ok((damage, critical))
}

pub(super) fn calculate_damage(
    attack: &UnitAttack,
    ctx: &AttackProcessorContext<'_>,
    random: &mut dyn BattleRandom,
) -> Result<AttackOutcome> {
    let (damage, critical) = roll(attack, ctx, random)?;
    Ok(AttackOutcome::Damage { damage, critical })
}

/// Damage plus healing of half the damage dealt.
///
/// The attacker is healed first. With `overflow`, what the attacker cannot
/// take is split over its wounded squad-mates, least wounded first, each
/// capped at its missing hit points.
pub(super) fn calculate_drain(
    attack: &UnitAttack,
    ctx: &AttackProcessorContext<'_>,
    random: &mut dyn BattleRandom,
    overflow: bool,
) -> Result<AttackOutcome> {
    let (damage, critical) = roll(attack, ctx, random)?;
    let attacker = ctx.attacker;

    let mut remaining = (damage + critical) / 2;
    let mut heals = Vec::new();

    let own = remaining.min(attacker.missing_hit_points());
    if own > 0 {
        heals.push(UnitHeal {
            unit: attacker.id,
            amount: own,
        });
        remaining -= own;
    }

    if overflow && remaining > 0 {
        let mut allies: Vec<_> = ctx
            .state
            .active_units(attacker.side)
            .filter(|u| u.id != attacker.id && u.missing_hit_points() > 0)
            .collect();
        allies.sort_by_key(|u| (u.missing_hit_points(), u.id));

        let count = allies.len() as u32;
        for (i, ally) in allies.into_iter().enumerate() {
            if remaining == 0 {
                break;
            }
            let share = remaining.div_ceil(count - i as u32);
            let amount = share.min(ally.missing_hit_points());
            heals.push(UnitHeal {
                unit: ally.id,
                amount,
            });
            remaining -= amount;
        }
    }

    Ok(AttackOutcome::Drain {
        damage,
        critical,
        heals,
    })
}

pub(super) fn apply(result: &CalculatedAttackResult, state: &mut BattleState) -> Result<()> {
    let target = target_id(result)?;
    state
        .unit_mut(target)?
        .take_damage(result.outcome.damage());

    if let AttackOutcome::Drain { heals, .. } = &result.outcome {
        for heal in heals {
            state.unit_mut(heal.unit)?.heal(heal.amount);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;
    use crate::state::{AttackKind, BattleSide, UnitFlags, UnitFlank};
    use crate::test_helpers::*;

    #[test]
    fn damage_without_armor_subtracts_power() {
        let mut battle = TestBattle::new();
        let attacker = battle.add(
            BattleSide::Attacker,
            unit_type(1, 100, melee(20)),
            front(UnitFlank::Center),
        );
        let target = battle.add(
            BattleSide::Defender,
            unit_type(2, 50, melee(10)),
            front(UnitFlank::Center),
        );

        let result = battle.resolve(
            &melee(20),
            attacker,
            target,
            &mut ScriptedRandom::constant(0),
        );

        assert_eq!(
            result.outcome,
            AttackOutcome::Damage {
                damage: 20,
                critical: 0
            }
        );
        assert_eq!(battle.hit_points(target), 30);
        assert!(battle.state.unit(target).unwrap().effects.is_empty());
    }

    #[test]
    fn armor_and_defend_reduce_damage() {
        let mut battle = TestBattle::new();
        let attacker = battle.add(
            BattleSide::Attacker,
            unit_type(1, 100, melee(40)),
            front(UnitFlank::Center),
        );
        let mut armored = unit_type(2, 200, melee(10));
        armored.armor = 50;
        let target = battle.add(BattleSide::Defender, armored, front(UnitFlank::Center));
        battle
            .state
            .unit_mut(target)
            .unwrap()
            .flags
            .insert(UnitFlags::DEFENDED);

        // (40 + 4) * 50% = 22, halved by defend = 11
        battle.resolve(&melee(40), attacker, target, &mut ScriptedRandom::new([0, 4]));
        assert_eq!(battle.hit_points(target), 189);
    }

    #[test]
    fn armor_is_capped() {
        let mut battle = TestBattle::new();
        let attacker = battle.add(
            BattleSide::Attacker,
            unit_type(1, 100, melee(100)),
            front(UnitFlank::Center),
        );
        let mut armored = unit_type(2, 200, melee(10));
        armored.armor = 100;
        let target = battle.add(BattleSide::Defender, armored, front(UnitFlank::Center));

        battle.resolve(&melee(100), attacker, target, &mut ScriptedRandom::constant(0));
        assert_eq!(battle.hit_points(target), 190);
    }

    #[test]
    fn damage_never_exceeds_hit_points_and_critical_fills_the_rest() {
        let mut battle = TestBattle::new();
        let mut brute = unit_type(1, 100, melee(100));
        brute.has_critical_hit = true;
        let attacker = battle.add(BattleSide::Attacker, brute, front(UnitFlank::Center));
        let target = battle.add(
            BattleSide::Defender,
            unit_type(2, 30, melee(10)),
            front(UnitFlank::Center),
        );

        let result = battle.resolve(&melee(100), attacker, target, &mut ScriptedRandom::constant(0));
        assert_eq!(result.outcome.damage(), 30);
        assert_eq!(battle.hit_points(target), 0);
    }

    #[test]
    fn critical_hit_adds_percent_of_power() {
        let mut battle = TestBattle::new();
        let mut brute = unit_type(1, 100, melee(100));
        brute.has_critical_hit = true;
        let attacker = battle.add(BattleSide::Attacker, brute, front(UnitFlank::Center));
        let target = battle.add(
            BattleSide::Defender,
            unit_type(2, 300, melee(10)),
            front(UnitFlank::Center),
        );

        let result = battle.resolve(&melee(100), attacker, target, &mut ScriptedRandom::constant(0));
        assert_eq!(
            result.outcome,
            AttackOutcome::Damage {
                damage: 100,
                critical: 5
            }
        );
    }

    #[test]
    fn drain_heals_attacker_by_half_damage() {
        let mut battle = TestBattle::new();
        let drain = ranged(AttackKind::DrainLife, 40);
        let attacker = battle.add(
            BattleSide::Attacker,
            unit_type(1, 100, drain.clone()),
            back(UnitFlank::Center),
        );
        battle.state.unit_mut(attacker).unwrap().hit_points = 50;
        let target = battle.add(
            BattleSide::Defender,
            unit_type(2, 100, melee(10)),
            front(UnitFlank::Center),
        );

        battle.resolve(&drain, attacker, target, &mut ScriptedRandom::constant(0));
        assert_eq!(battle.hit_points(target), 60);
        assert_eq!(battle.hit_points(attacker), 70);
    }

    #[test]
    fn drain_overflow_heals_allies_least_wounded_first() {
        let mut battle = TestBattle::new();
        let drain = ranged(AttackKind::DrainLifeOverflow, 60);
        let attacker = battle.add(
            BattleSide::Attacker,
            unit_type(1, 100, drain.clone()),
            back(UnitFlank::Center),
        );
        battle.state.unit_mut(attacker).unwrap().hit_points = 95;
        let scratched = battle.add(
            BattleSide::Attacker,
            unit_type(3, 100, melee(10)),
            front(UnitFlank::Left),
        );
        battle.state.unit_mut(scratched).unwrap().hit_points = 90;
        let wounded = battle.add(
            BattleSide::Attacker,
            unit_type(3, 100, melee(10)),
            front(UnitFlank::Right),
        );
        battle.state.unit_mut(wounded).unwrap().hit_points = 40;
        let target = battle.add(
            BattleSide::Defender,
            unit_type(2, 200, melee(10)),
            front(UnitFlank::Center),
        );

        // 60 damage, 30 healing: 5 to the attacker, then 25 over two allies.
        let result = battle.resolve(&drain, attacker, target, &mut ScriptedRandom::constant(0));
        let AttackOutcome::Drain { heals, .. } = &result.outcome else {
            panic!("expected drain outcome, got {:?}", result.outcome);
        };
        assert_eq!(heals[0], UnitHeal { unit: attacker, amount: 5 });
        assert_eq!(heals[1], UnitHeal { unit: scratched, amount: 10 });
        assert_eq!(heals[2], UnitHeal { unit: wounded, amount: 15 });
        let total: u32 = heals.iter().map(|h| h.amount).sum();
        assert!(total <= result.outcome.damage() / 2);
        assert_eq!(battle.hit_points(wounded), 55);
    }

    #[test]
    fn dead_target_cannot_be_damaged() {
        let mut battle = TestBattle::new();
        let attacker = battle.add(
            BattleSide::Attacker,
            unit_type(1, 100, melee(20)),
            front(UnitFlank::Center),
        );
        let target = battle.add(
            BattleSide::Defender,
            unit_type(2, 50, melee(10)),
            front(UnitFlank::Center),
        );
        battle
            .state
            .unit_mut(target)
            .unwrap()
            .flags
            .insert(UnitFlags::DEAD);

        assert!(!battle.can_attack(&melee(20), attacker, target));
    }
}
