//! Target legality and area expansion.

use crate::attack::AttackTarget;
use crate::error::{BattleError, Result};
use crate::state::{
    AttackReach, BattleSide, TargetSide, Unit, UnitAttack, UnitFlank, UnitId, UnitLine,
    UnitPosition,
};

use super::{AttackChoice, BattleProcessor};

/// Cells a summon can target on one side.
const CELLS: [UnitPosition; 6] = [
    UnitPosition::front(UnitFlank::Left),
    UnitPosition::front(UnitFlank::Center),
    UnitPosition::front(UnitFlank::Right),
    UnitPosition::back(UnitFlank::Left),
    UnitPosition::back(UnitFlank::Center),
    UnitPosition::back(UnitFlank::Right),
];

impl BattleProcessor {
    /// Attack a command uses.
    pub(super) fn attack_for(&self, unit: UnitId, choice: AttackChoice) -> Result<&UnitAttack> {
        let unit_type = &self.state.unit(unit)?.unit_type;
        match choice {
            AttackChoice::Main => Ok(&unit_type.main_attack),
            AttackChoice::Alternative => unit_type
                .alternative_attack
                .as_ref()
                .ok_or(BattleError::NoAlternativeAttack(unit)),
        }
    }

    /// Every target `unit` may pick for `choice`.
    ///
    /// Summons list cells; everything else lists units. For area attacks any
    /// member of a side with at least one affected unit is listed.
    pub fn legal_targets(&self, unit: UnitId, choice: AttackChoice) -> Result<Vec<AttackTarget>> {
        let attack = self.attack_for(unit, choice)?;
        let attacker = self.state.unit(unit)?;
        let candidates: Vec<AttackTarget> = match attack.kind.target_side() {
            TargetSide::AllyCell => CELLS
                .iter()
                .map(|&position| AttackTarget::Cell {
                    side: attacker.side,
                    position,
                })
                .collect(),
            TargetSide::OnlySelf => vec![AttackTarget::Unit(unit)],
            side => candidate_sides(attacker.side, side)
                .into_iter()
                .flat_map(|s| self.state.units(s).map(|u| AttackTarget::Unit(u.id)))
                .collect(),
        };

        let mut targets = Vec::new();
        for target in candidates {
            if self.can_attack(unit, choice, target)? {
                targets.push(target);
            }
        }
        Ok(targets)
    }

    /// Returns true if `unit` may use `choice` on `target`.
    ///
    /// A main attack that can be skipped is also legal where only the
    /// secondary attack has something to do.
    pub fn can_attack(&self, unit: UnitId, choice: AttackChoice, target: AttackTarget) -> Result<bool> {
        let attack = self.attack_for(unit, choice)?;
        let attacker = self.state.unit(unit)?;
        if attack.reach == AttackReach::Adjacent
            && attack.kind.target_side() == TargetSide::Enemy
            && !self.is_reachable(attacker, target)
        {
            return Ok(false);
        }
        let fallback = match choice {
            AttackChoice::Main if attack.kind.can_main_attack_be_skipped() => {
                attacker.unit_type.secondary_attack.as_ref()
            }
            _ => None,
        };
        for member in self.expand_targets(unit, attack, target)? {
            if self.check_attack(unit, attack, member)? {
                return Ok(true);
            }
            if let Some(secondary) = fallback {
                if self.check_attack(unit, secondary, member)? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Single targets hit by `attack` aimed at `target`.
    ///
    /// Area attacks cover every present unit (or every cell) of the target's
    /// side. Each member is still checked on its own when the attack lands.
    pub(super) fn expand_targets(
        &self,
        unit: UnitId,
        attack: &UnitAttack,
        target: AttackTarget,
    ) -> Result<Vec<AttackTarget>> {
        if attack.reach != AttackReach::All {
            return Ok(vec![target]);
        }
        let targets = match target {
            AttackTarget::Unit(id) => {
                let side = self.state.unit(id)?.side;
                if !self.state.squad(side).contains(id) {
                    return Ok(Vec::new());
                }
                self.state.units(side).map(|u| AttackTarget::Unit(u.id)).collect()
            }
            AttackTarget::Cell { side, .. } => {
                if side != self.state.unit(unit)?.side {
                    return Ok(Vec::new());
                }
                CELLS
                    .iter()
                    .map(|&position| AttackTarget::Cell { side, position })
                    .collect()
            }
        };
        Ok(targets)
    }

    /// Melee reach: blocked by living front-line units on both sides.
    ///
    /// A back-line attacker reaches only when its own front line is empty. It
    /// hits the enemy front line, or the back line once the front is empty,
    /// and prefers flanks next to its own.
    fn is_reachable(&self, attacker: &Unit, target: AttackTarget) -> bool {
        let AttackTarget::Unit(id) = target else {
            return false;
        };
        let Some(target) = self.state.get(id) else {
            return false;
        };
        if target.side == attacker.side || !target.is_active() {
            return false;
        }

        let own_front = self.has_active_front(attacker.side, Some(attacker.id));
        if !attacker.position.is_front() && own_front {
            return false;
        }

        let line = if self.has_active_front(target.side, None) {
            UnitLine::Front
        } else {
            UnitLine::Back
        };
        let in_line = |u: &&Unit| u.position.line.covers(line);
        if !in_line(&target) {
            return false;
        }

        let flank = attacker.position.flank;
        let has_near = self
            .state
            .active_units(target.side)
            .filter(in_line)
            .any(|u| u.position.flank.distance(flank) <= 1);
        !has_near || target.position.flank.distance(flank) <= 1
    }

    fn has_active_front(&self, side: BattleSide, except: Option<UnitId>) -> bool {
        self.state
            .active_units(side)
            .filter(|u| Some(u.id) != except)
            .any(|u| u.position.is_front())
    }
}

fn candidate_sides(own: BattleSide, target_side: TargetSide) -> Vec<BattleSide> {
    match target_side {
        TargetSide::Enemy => vec![own.opposite()],
        TargetSide::Ally | TargetSide::OnlySelf | TargetSide::AllyCell => vec![own],
        TargetSide::AnySide => vec![own, own.opposite()],
    }
}
