//! Console narration of a battle.

use std::collections::HashMap;

use battle_core::{
    AttackEffectProcessor, AttackOutcome, AttackTarget, BattlePresenter, BattleState,
    CalculatedAttackResult, CommandKind, UnitId,
};
use console::style;

/// Prints one line per completed action.
pub struct ConsolePresenter {
    names: HashMap<UnitId, String>,
}

impl ConsolePresenter {
    pub fn new(state: &BattleState) -> Self {
        let names = state
            .all_units()
            .map(|u| (u.id, format!("{} ({})", u.unit_type.name, u.id)))
            .collect();
        Self { names }
    }

    fn name(&self, unit: UnitId) -> String {
        self.names
            .get(&unit)
            .cloned()
            .unwrap_or_else(|| unit.to_string())
    }

    fn target(&self, target: AttackTarget) -> String {
        match target {
            AttackTarget::Unit(unit) => self.name(unit),
            AttackTarget::Cell { side, position } => {
                format!("{side} {} {}", position.line, position.flank)
            }
        }
    }
}

impl BattlePresenter for ConsolePresenter {
    fn attack_completed(&mut self, result: &CalculatedAttackResult, summoned: Option<UnitId>) {
        if let (Some(unit), AttackOutcome::Summon { unit_type, .. }) = (summoned, &result.outcome) {
            self.names
                .insert(unit, format!("{} ({})", unit_type.name, unit));
        }
        let detail = match &result.outcome {
            AttackOutcome::Immune(_) => style("immune".to_string()).dim(),
            AttackOutcome::Miss => style("miss".to_string()).dim(),
            AttackOutcome::Ward(_) => style("ward absorbs it".to_string()).dim(),
            AttackOutcome::Damage { .. } | AttackOutcome::Drain { .. } => {
                style(format!("{} damage", result.outcome.damage())).red()
            }
            AttackOutcome::Heal { amount } => style(format!("+{amount} hp")).green(),
            AttackOutcome::Revive { hit_points } => style(format!("revived with {hit_points} hp")).green(),
            other => style(format!("{other:?}")).cyan(),
        };
        println!(
            "  {} {} {} ({})",
            self.name(result.attacker),
            result.attack_type,
            self.target(result.target),
            detail
        );
    }

    fn effect_completed(&mut self, effect: &AttackEffectProcessor) {
        let mut line = format!("  {} {}", self.name(effect.unit), effect.effect_type);
        if effect.damage > 0 {
            line.push_str(&format!(" -{} hp", effect.damage));
        }
        if effect.completed {
            line.push_str(" (wears off)");
        }
        println!("{}", style(line).magenta());
    }

    fn unit_died(&mut self, unit: UnitId) {
        println!("  {} {}", style("†").red().bold(), self.name(unit));
    }

    fn unit_retreated(&mut self, unit: UnitId) {
        println!("  {} retreats", self.name(unit));
    }

    fn turn_skipped(&mut self, unit: UnitId) {
        println!("  {} {}", self.name(unit), style("loses the turn").dim());
    }

    fn command_issued(&mut self, unit: UnitId, command: CommandKind) {
        println!("  {} {}", self.name(unit), command);
    }

    fn experience_gained(&mut self, unit: UnitId, experience: u32) {
        println!("  {} +{} xp", self.name(unit), style(experience).yellow());
    }
}
