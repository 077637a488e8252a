//! Shared builders for unit tests.

use std::collections::HashMap;
use std::sync::Arc;

use crate::attack::{self, AttackProcessorContext, AttackTarget, CalculatedAttackResult};
use crate::config::BattleConfig;
use crate::processor::BattleProcessor;
use crate::random::BattleRandom;
use crate::state::{
    AttackKind, AttackReach, AttackSource, BattleSide, BattleState, PlayerId, UnitAttack,
    UnitFlank, UnitId, UnitPosition, UnitType, UnitTypeId,
};
use crate::turn::UnitTurnQueue;

/// Small unit type with a single main attack and no armor.
pub fn unit_type(id: u32, hit_points: u32, main_attack: UnitAttack) -> UnitType {
    UnitType {
        id: UnitTypeId(id),
        name: format!("unit-{id}"),
        level: 1,
        is_large: false,
        hit_points,
        armor: 0,
        initiative: 50,
        main_attack,
        secondary_attack: None,
        alternative_attack: None,
        has_double_attack: false,
        has_critical_hit: false,
        protections: vec![],
        xp_killed: 20,
        previous_type: None,
    }
}

pub fn melee(power: u32) -> UnitAttack {
    UnitAttack::new(AttackKind::Damage, AttackSource::Weapon, AttackReach::Adjacent)
        .with_power(power)
}

pub fn ranged(kind: AttackKind, power: u32) -> UnitAttack {
    UnitAttack::new(kind, AttackSource::Mind, AttackReach::Any).with_power(power)
}

pub fn front(flank: UnitFlank) -> UnitPosition {
    UnitPosition::front(flank)
}

pub fn back(flank: UnitFlank) -> UnitPosition {
    UnitPosition::back(flank)
}

/// Battle state with everything an attack context needs.
pub struct TestBattle {
    pub state: BattleState,
    pub queue: UnitTurnQueue,
    pub config: BattleConfig,
    pub types: HashMap<UnitTypeId, UnitType>,
}

impl TestBattle {
    pub fn new() -> Self {
        Self {
            state: BattleState::new(PlayerId(1), PlayerId(2)),
            queue: UnitTurnQueue::new(),
            config: BattleConfig::default(),
            types: HashMap::new(),
        }
    }

    /// Registers a type in the catalog without placing a unit.
    pub fn register(&mut self, unit_type: UnitType) {
        self.types.insert(unit_type.id, unit_type);
    }

    pub fn add(&mut self, side: BattleSide, unit_type: UnitType, position: UnitPosition) -> UnitId {
        self.register(unit_type.clone());
        self.state.add_unit(side, unit_type, position).unwrap()
    }

    pub fn ctx(&self, attacker: UnitId, target: impl Into<AttackTarget>) -> AttackProcessorContext<'_> {
        AttackProcessorContext::new(
            self.state.unit(attacker).unwrap(),
            target.into(),
            &self.state,
            &self.queue,
            &self.config,
            &self.types,
        )
    }

    pub fn can_attack(
        &self,
        attack: &UnitAttack,
        attacker: UnitId,
        target: impl Into<AttackTarget>,
    ) -> bool {
        attack::can_attack(attack, &self.ctx(attacker, target))
    }

    /// Calculates and applies one attack.
    pub fn resolve(
        &mut self,
        attack: &UnitAttack,
        attacker: UnitId,
        target: impl Into<AttackTarget>,
        random: &mut dyn BattleRandom,
    ) -> CalculatedAttackResult {
        let result = attack::calculate(attack, &self.ctx(attacker, target), random).unwrap();
        attack::apply(&result, &mut self.state, &mut self.queue).unwrap();
        result
    }

    pub fn hit_points(&self, unit: UnitId) -> u32 {
        self.state.unit(unit).unwrap().hit_points
    }

    /// Hands the battle to a processor that has not started a round yet.
    pub fn into_processor(self, random: impl BattleRandom + 'static) -> BattleProcessor {
        BattleProcessor::new(self.state, self.config, Arc::new(self.types), Box::new(random))
    }
}
