//! Runtime orchestration for battles.
//!
//! This crate drives a [`battle_core::BattleProcessor`] to its outcome and
//! paces its committed actions for presentation. Consumers create a
//! [`BattleSession`], plug in [`CommandProvider`]s for both squads, and either
//! implement [`battle_core::BattlePresenter`] or subscribe to the session's
//! [`EventBus`].
//!
//! Modules are organized by responsibility:
//! - [`session`] hosts the battle loop for both modes
//! - [`sequencer`] paces begin/complete hooks against animation lengths
//! - [`animation`] provides animation length lookups
//! - [`provider`] exposes the command sources sessions ask
//! - [`events`] provides the session event stream
//! - [`config`] reads runtime settings from the environment
pub mod animation;
pub mod config;
pub mod error;
pub mod events;
pub mod provider;
pub mod sequencer;
pub mod session;

pub use animation::{AnimationOracle, AnimationTable, FixedAnimationOracle};
pub use config::{BattleMode, RuntimeConfig};
pub use error::{Result, RuntimeError};
pub use events::{BattleEvent, EventBus};
pub use provider::{AiCommandProvider, CommandProvider, ScriptedCommandProvider};
pub use sequencer::{ActionPhase, ActionSequencer};
pub use session::{BattleSession, SquadProviders};
