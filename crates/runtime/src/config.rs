//! Runtime configuration read from the environment.

use std::str::FromStr;

use crate::error::{Result, RuntimeError};

/// How a session resolves its battle.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum BattleMode {
    /// Fast-forward to the outcome without presentation pacing.
    #[default]
    Instant,
    /// Resolve turn by turn, waiting for every action's animation.
    Animated,
}

/// Runtime configuration shared by sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Seed of the battle's random source.
    pub seed: u64,
    pub mode: BattleMode,
    /// Animation length used when the animation oracle has no entry.
    pub action_delay_ms: u64,
    /// Capacity of the session event channel.
    pub event_buffer_size: usize,
}

impl RuntimeConfig {
    pub const SEED_VAR: &'static str = "BATTLE_SEED";
    pub const MODE_VAR: &'static str = "BATTLE_MODE";
    pub const ACTION_DELAY_VAR: &'static str = "BATTLE_ACTION_DELAY_MS";

    /// Reads `BATTLE_SEED`, `BATTLE_MODE` and `BATTLE_ACTION_DELAY_MS`.
    /// Unset variables keep their defaults; unparsable ones are errors.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            seed: read_var(&lookup, Self::SEED_VAR)?.unwrap_or(defaults.seed),
            mode: read_var(&lookup, Self::MODE_VAR)?.unwrap_or(defaults.mode),
            action_delay_ms: read_var(&lookup, Self::ACTION_DELAY_VAR)?
                .unwrap_or(defaults.action_delay_ms),
            event_buffer_size: defaults.event_buffer_size,
        })
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            mode: BattleMode::Instant,
            action_delay_ms: 300,
            event_buffer_size: 256,
        }
    }
}

fn read_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>> {
    let Some(value) = lookup(name) else {
        return Ok(None);
    };
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| RuntimeError::InvalidEnv {
            name,
            value: value.to_string(),
        })
}
