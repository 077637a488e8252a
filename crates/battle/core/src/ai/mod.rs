//! Command selection for computer-controlled units.
//!
//! The AI never mutates the battle. It lists the legal targets of the unit's
//! main attack (then its alternative attack), scores each with
//! [`scoring::score_target`] and picks the highest value; ties keep the
//! earliest target in squad order. A unit with nothing to attack defends.

pub mod scoring;

pub use scoring::Score;

use crate::attack::AttackTarget;
use crate::error::Result;
use crate::processor::{AttackChoice, BattleCommand, BattleProcessor};
use crate::state::UnitId;

/// Rule-based command selection.
#[derive(Clone, Copy, Debug, Default)]
pub struct BattleAiProcessor;

impl BattleAiProcessor {
    /// Picks a command for `unit`, which must be the unit selecting an action.
    pub fn get_command(battle: &BattleProcessor, unit: UnitId) -> Result<BattleCommand> {
        for choice in [AttackChoice::Main, AttackChoice::Alternative] {
            if choice == AttackChoice::Alternative
                && battle.state().unit(unit)?.unit_type.alternative_attack.is_none()
            {
                break;
            }
            if let Some((target, score)) = Self::best_target(battle, unit, choice)? {
                tracing::debug!(%unit, ?choice, ?target, score = score.value(), "ai selected target");
                return Ok(BattleCommand::Attack { target, choice });
            }
        }
        tracing::debug!(%unit, "ai found no target, defending");
        Ok(BattleCommand::Defend)
    }

    fn best_target(
        battle: &BattleProcessor,
        unit: UnitId,
        choice: AttackChoice,
    ) -> Result<Option<(AttackTarget, Score)>> {
        let attacker = battle.state().unit(unit)?;
        let attack = match choice {
            AttackChoice::Main => &attacker.unit_type.main_attack,
            AttackChoice::Alternative => match &attacker.unit_type.alternative_attack {
                Some(attack) => attack,
                None => return Ok(None),
            },
        };

        let mut best: Option<(AttackTarget, Score)> = None;
        for target in battle.legal_targets(unit, choice)? {
            let score =
                scoring::score_target(attack, attacker, target, battle.state(), battle.config());
            tracing::trace!(
                %unit,
                ?target,
                value = score.value(),
                possible = score.is_possible,
                situation = score.situation,
                modifier = score.modifier,
                "ai candidate"
            );
            if !score.is_possible {
                continue;
            }
            if best.is_none_or(|(_, b)| score.value() > b.value()) {
                best = Some((target, score));
            }
        }
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;
    use crate::state::{
        AttackDuration, AttackKind, BattleSide, ProtectionTarget, UnitFlank, UnitProtection,
    };
    use crate::test_helpers::*;

    /// Starts the first turn and returns the processor and the acting unit.
    fn started(battle: TestBattle) -> (BattleProcessor, UnitId) {
        let mut processor = battle.into_processor(ScriptedRandom::constant(0));
        let turn = processor.start_next_turn().unwrap().unwrap();
        assert!(turn.can_act);
        (processor, turn.order.unit)
    }

    fn fast(mut unit_type: crate::state::UnitType) -> crate::state::UnitType {
        unit_type.initiative = 90;
        unit_type
    }

    #[test]
    fn damage_prefers_finishing_blow_then_lowest_hit_points() {
        let mut battle = TestBattle::new();
        let archer = battle.add(
            BattleSide::Attacker,
            fast(unit_type(1, 50, ranged(AttackKind::Damage, 30))),
            back(UnitFlank::Center),
        );
        battle.add(BattleSide::Defender, unit_type(2, 60, melee(5)), front(UnitFlank::Left));
        let weak = battle.add(BattleSide::Defender, unit_type(3, 25, melee(5)), front(UnitFlank::Right));
        battle.add(BattleSide::Defender, unit_type(4, 40, melee(5)), back(UnitFlank::Left));

        let (processor, unit) = started(battle);
        assert_eq!(unit, archer);
        assert_eq!(
            BattleAiProcessor::get_command(&processor, unit).unwrap(),
            BattleCommand::attack(weak)
        );
    }

    #[test]
    fn disable_targets_strongest_threat() {
        let mut battle = TestBattle::new();
        let paralyze = ranged(
            AttackKind::Paralyze {
                duration: AttackDuration::Fixed(1),
            },
            0,
        );
        battle.add(
            BattleSide::Attacker,
            fast(unit_type(1, 50, paralyze)),
            back(UnitFlank::Center),
        );
        battle.add(BattleSide::Defender, unit_type(2, 60, melee(10)), front(UnitFlank::Left));
        let brute = battle.add(BattleSide::Defender, unit_type(3, 60, melee(70)), front(UnitFlank::Right));

        let (processor, unit) = started(battle);
        assert_eq!(
            BattleAiProcessor::get_command(&processor, unit).unwrap(),
            BattleCommand::attack(brute)
        );
    }

    #[test]
    fn heal_targets_most_wounded_ally() {
        let mut battle = TestBattle::new();
        let healer = battle.add(
            BattleSide::Attacker,
            fast(unit_type(1, 50, ranged(AttackKind::Heal, 20))),
            back(UnitFlank::Center),
        );
        let scratched = battle.add(BattleSide::Attacker, unit_type(2, 80, melee(10)), front(UnitFlank::Left));
        let wounded = battle.add(BattleSide::Attacker, unit_type(3, 80, melee(10)), front(UnitFlank::Right));
        battle.add(BattleSide::Defender, unit_type(4, 80, melee(10)), front(UnitFlank::Center));
        battle.state.unit_mut(scratched).unwrap().hit_points = 70;
        battle.state.unit_mut(wounded).unwrap().hit_points = 20;

        let (processor, unit) = started(battle);
        assert_eq!(unit, healer);
        assert_eq!(
            BattleAiProcessor::get_command(&processor, unit).unwrap(),
            BattleCommand::attack(wounded)
        );
    }

    #[test]
    fn immune_targets_are_skipped() {
        let mut battle = TestBattle::new();
        battle.add(
            BattleSide::Attacker,
            fast(unit_type(1, 50, ranged(AttackKind::Damage, 30))),
            back(UnitFlank::Center),
        );
        let mut golem = unit_type(2, 10, melee(5));
        golem.protections = vec![UnitProtection::immunity(ProtectionTarget::Source(
            crate::state::AttackSource::Mind,
        ))];
        battle.add(BattleSide::Defender, golem, front(UnitFlank::Left));
        let knight = battle.add(BattleSide::Defender, unit_type(3, 90, melee(5)), front(UnitFlank::Right));

        let (processor, unit) = started(battle);
        assert_eq!(
            BattleAiProcessor::get_command(&processor, unit).unwrap(),
            BattleCommand::attack(knight)
        );
    }

    #[test]
    fn healer_without_wounded_allies_defends() {
        let mut battle = TestBattle::new();
        battle.add(
            BattleSide::Attacker,
            fast(unit_type(1, 50, ranged(AttackKind::Heal, 20))),
            back(UnitFlank::Center),
        );
        battle.add(BattleSide::Defender, unit_type(2, 80, melee(10)), front(UnitFlank::Center));

        let (processor, unit) = started(battle);
        assert_eq!(
            BattleAiProcessor::get_command(&processor, unit).unwrap(),
            BattleCommand::Defend
        );
    }

    #[test]
    fn alternative_attack_is_used_when_main_has_no_target() {
        let mut battle = TestBattle::new();
        let mut priest = fast(unit_type(1, 50, ranged(AttackKind::Heal, 20)));
        priest.alternative_attack = Some(ranged(AttackKind::Damage, 15));
        battle.add(BattleSide::Attacker, priest, back(UnitFlank::Center));
        let enemy = battle.add(BattleSide::Defender, unit_type(2, 80, melee(10)), front(UnitFlank::Center));

        let (processor, unit) = started(battle);
        assert_eq!(
            BattleAiProcessor::get_command(&processor, unit).unwrap(),
            BattleCommand::Attack {
                target: enemy.into(),
                choice: AttackChoice::Alternative,
            }
        );
    }
}
