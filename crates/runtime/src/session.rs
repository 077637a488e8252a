//! Battle sessions: one battle driven to its outcome in either mode.
//!
//! ```text
//! Instant:   BattleInstantProcessor ──► hooks back to back ──► outcome
//!
//! Animated:  start_next_turn ──► sequencer ──► CommandProvider ──► process_command
//!                 ▲                  │ (sleeps per animation)            │
//!                 └──────────────────┴───────────────────────────────────┘
//! ```
//!
//! Both modes commit state through the same processor, so presentation pace
//! never changes an outcome.

use std::time::Duration;

use battle_core::{
    BattleAction, BattleError, BattleInstantProcessor, BattleOutcome, BattlePresenter,
    BattleProcessor, BattleSide,
};

use crate::animation::{AnimationOracle, FixedAnimationOracle};
use crate::config::{BattleMode, RuntimeConfig};
use crate::error::{Result, RuntimeError};
use crate::events::{BattleEvent, EventBus};
use crate::provider::CommandProvider;
use crate::sequencer::{ActionPhase, ActionSequencer};

/// Command sources of both squads.
pub struct SquadProviders<'a> {
    pub attacker: &'a dyn CommandProvider,
    pub defender: &'a dyn CommandProvider,
}

impl<'a> SquadProviders<'a> {
    /// Uses one provider for both squads.
    pub fn both(provider: &'a dyn CommandProvider) -> Self {
        Self {
            attacker: provider,
            defender: provider,
        }
    }

    fn for_side(&self, side: BattleSide) -> &'a dyn CommandProvider {
        match side {
            BattleSide::Attacker => self.attacker,
            BattleSide::Defender => self.defender,
        }
    }
}

/// Owns one battle and presents it.
pub struct BattleSession {
    battle: BattleProcessor,
    config: RuntimeConfig,
    animations: Box<dyn AnimationOracle>,
    sequencer: ActionSequencer,
    events: EventBus,
    finished: bool,
}

impl BattleSession {
    /// Creates a session whose actions all animate for `action_delay_ms`.
    pub fn new(battle: BattleProcessor, config: RuntimeConfig) -> Self {
        let animations = Box::new(FixedAnimationOracle::new(config.action_delay_ms));
        let events = EventBus::with_capacity(config.event_buffer_size);
        Self {
            battle,
            config,
            animations,
            sequencer: ActionSequencer::new(),
            events,
            finished: false,
        }
    }

    #[must_use]
    pub fn with_animations(mut self, oracle: impl AnimationOracle + 'static) -> Self {
        self.animations = Box::new(oracle);
        self
    }

    pub fn battle(&self) -> &BattleProcessor {
        &self.battle
    }

    pub fn into_battle(self) -> BattleProcessor {
        self.battle
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Resolves the battle in the configured mode.
    pub async fn run(
        &mut self,
        providers: SquadProviders<'_>,
        presenter: &mut dyn BattlePresenter,
    ) -> Result<BattleOutcome> {
        match self.config.mode {
            BattleMode::Instant => self.run_instant(presenter),
            BattleMode::Animated => self.run_animated(providers, presenter).await,
        }
    }

    /// Fast-forwards the battle with the engine AI on both sides. Hooks run
    /// back to back in commit order.
    pub fn run_instant(&mut self, presenter: &mut dyn BattlePresenter) -> Result<BattleOutcome> {
        self.ensure_running()?;
        let events = &self.events;
        let outcome = BattleInstantProcessor::process_with(&mut self.battle, |action| {
            present_now(events, action, presenter);
        })?;
        self.finish(&outcome);
        Ok(outcome)
    }

    /// Resolves the battle turn by turn, waiting for each action's animation
    /// before the next command is requested.
    ///
    /// A battle still running when the round cap is reached is fast-forwarded
    /// like an instant battle.
    pub async fn run_animated(
        &mut self,
        providers: SquadProviders<'_>,
        presenter: &mut dyn BattlePresenter,
    ) -> Result<BattleOutcome> {
        self.ensure_running()?;
        while self.battle.winner().is_none() {
            if self.round_cap_reached() {
                tracing::info!(round = self.battle.round(), "round cap reached, fast-forwarding");
                return self.run_instant(presenter);
            }
            let Some(turn) = self.battle.start_next_turn()? else {
                break;
            };
            let unit = turn.order.unit;
            self.events.publish(BattleEvent::TurnStarted {
                round: self.battle.round(),
                unit,
                kind: turn.order.kind,
            });
            self.present(turn.actions, presenter).await;
            if !turn.can_act {
                continue;
            }

            let side = self.battle.state().unit(unit)?.side;
            let command = providers
                .for_side(side)
                .provide_command(&self.battle, unit)
                .await?;
            tracing::debug!(%unit, command = command.name(), "command provided");
            let actions = self
                .battle
                .process_command(command)
                .inspect_err(report_rejection)?;
            self.present(actions, presenter).await;
        }

        let outcome = self.battle.complete_battle()?;
        self.present(outcome.actions.clone(), presenter).await;
        self.finish(&outcome);
        Ok(outcome)
    }

    fn ensure_running(&self) -> Result<()> {
        if self.finished {
            return Err(RuntimeError::SessionFinished);
        }
        Ok(())
    }

    fn round_cap_reached(&self) -> bool {
        self.battle.queue().is_empty()
            && self.battle.current().is_none()
            && self.battle.round() >= self.battle.config().max_rounds
    }

    async fn present(&mut self, actions: Vec<BattleAction>, presenter: &mut dyn BattlePresenter) {
        self.sequencer.push(actions);
        let mut elapsed = 0;
        loop {
            let phases = self.sequencer.tick(elapsed, self.animations.as_ref(), presenter);
            self.publish_phases(phases);
            let Some(remaining) = self.sequencer.remaining_ms() else {
                break;
            };
            tokio::time::sleep(Duration::from_millis(remaining)).await;
            elapsed = remaining;
        }
    }

    fn publish_phases(&self, phases: Vec<ActionPhase>) {
        for phase in phases {
            self.events.publish(match phase {
                ActionPhase::Began(action) => BattleEvent::ActionBegan(action),
                ActionPhase::Completed(action) => BattleEvent::ActionCompleted(action),
            });
        }
    }

    fn finish(&mut self, outcome: &BattleOutcome) {
        self.finished = true;
        self.events.publish(BattleEvent::BattleFinished {
            winner: outcome.winner,
            rounds: outcome.rounds,
        });
        tracing::info!(
            winner = %outcome.winner,
            rounds = outcome.rounds,
            mode = %self.config.mode,
            "battle session finished"
        );
    }
}

/// Logs a command the engine refused, louder when it points at an engine bug.
fn report_rejection(error: &BattleError) {
    let severity = error.severity();
    if severity.is_internal() {
        tracing::error!(code = error.error_code(), severity = severity.as_str(), %error, "battle engine failure");
    } else {
        tracing::warn!(code = error.error_code(), severity = severity.as_str(), %error, "command rejected");
    }
}

fn present_now(events: &EventBus, action: &BattleAction, presenter: &mut dyn BattlePresenter) {
    events.publish(BattleEvent::ActionBegan(action.clone()));
    action.present(presenter);
    events.publish(BattleEvent::ActionCompleted(action.clone()));
}
