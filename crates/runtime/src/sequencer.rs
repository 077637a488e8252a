//! Paces committed actions against animation lengths.
//!
//! The engine has already applied every action it hands out; the sequencer
//! only decides when each action's begin and complete hooks run. Actions are
//! presented one at a time in commit order.

use std::collections::VecDeque;

use battle_core::{ActionProcessor, BattleAction, BattlePresenter};

use crate::animation::AnimationOracle;

/// Hook that ran for an action during a [`ActionSequencer::tick`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionPhase {
    Began(BattleAction),
    Completed(BattleAction),
}

#[derive(Debug)]
struct Playing {
    action: BattleAction,
    remaining_ms: u64,
}

/// Queue of actions waiting for presentation.
#[derive(Debug, Default)]
pub struct ActionSequencer {
    pending: VecDeque<BattleAction>,
    playing: Option<Playing>,
}

impl ActionSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, actions: impl IntoIterator<Item = BattleAction>) {
        self.pending.extend(actions);
    }

    /// Returns true if nothing is playing or pending.
    pub fn is_idle(&self) -> bool {
        self.playing.is_none() && self.pending.is_empty()
    }

    /// Time left on the playing action, if any.
    pub fn remaining_ms(&self) -> Option<u64> {
        self.playing.as_ref().map(|p| p.remaining_ms)
    }

    /// Advances presentation by `elapsed_ms`.
    ///
    /// Starts the next action whenever the previous one completes, so a
    /// single call can run several short actions. Zero-length actions begin
    /// and complete within the same call.
    pub fn tick(
        &mut self,
        elapsed_ms: u64,
        oracle: &dyn AnimationOracle,
        presenter: &mut dyn BattlePresenter,
    ) -> Vec<ActionPhase> {
        let mut budget = elapsed_ms;
        let mut phases = Vec::new();
        loop {
            if self.playing.is_none() {
                let Some(action) = self.pending.pop_front() else {
                    break;
                };
                action.process_begin_action(presenter);
                let remaining_ms = animation_length(oracle, &action);
                phases.push(ActionPhase::Began(action.clone()));
                self.playing = Some(Playing {
                    action,
                    remaining_ms,
                });
            }

            let Some(playing) = self.playing.as_mut() else {
                break;
            };
            if playing.remaining_ms > budget {
                playing.remaining_ms -= budget;
                break;
            }
            budget -= playing.remaining_ms;
            if let Some(done) = self.playing.take() {
                done.action.process_completed_action(presenter);
                phases.push(ActionPhase::Completed(done.action));
            }
        }
        phases
    }
}

fn animation_length(oracle: &dyn AnimationOracle, action: &BattleAction) -> u64 {
    let hint = action.animation();
    match oracle.animation_length(&hint) {
        Some(length) => length,
        None => {
            tracing::warn!(
                kind = %hint.kind,
                unit = %hint.unit,
                attack_type = ?hint.attack_type,
                "no animation data, presenting without delay"
            );
            0
        }
    }
}
