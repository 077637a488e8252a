//! Resolve a scenario and print its outcome.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use battle_core::{BattleOutcome, BattleProcessor, BattleSide, BattleState, NullPresenter, PcgRandom};
use battle_runtime::{AiCommandProvider, BattleMode, BattleSession, RuntimeConfig, SquadProviders};
use clap::Parser;
use console::style;

use crate::data;
use crate::presenter::ConsolePresenter;

/// Resolve a scenario and print its outcome
#[derive(Parser)]
pub struct RunBattle {
    /// Scenario name (file name under `scenarios/` without `.ron`)
    #[arg(value_name = "SCENARIO", default_value = "skirmish")]
    scenario: String,

    /// Content data directory
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Random seed (overrides BATTLE_SEED)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Resolution mode (overrides BATTLE_MODE)
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Animation length per action in animated mode (overrides BATTLE_ACTION_DELAY_MS)
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ModeArg {
    /// Fast-forward to the outcome
    Instant,
    /// Narrate every action at animation pace
    Animated,
}

impl From<ModeArg> for BattleMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Instant => BattleMode::Instant,
            ModeArg::Animated => BattleMode::Animated,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Winner, rounds, survivors and experience
    Summary,
    /// Full outcome as JSON
    Json,
}

impl RunBattle {
    pub async fn execute(self) -> Result<()> {
        let config = self.runtime_config()?;
        let factory = data::content_factory(self.data_dir.clone())?;

        let battle_config = factory.load_config()?;
        let catalog = Arc::new(factory.load_units()?);
        let state = factory
            .load_battle(&self.scenario, &catalog)
            .with_context(|| format!("Failed to load scenario '{}'", self.scenario))?;

        tracing::info!(
            scenario = %self.scenario,
            seed = config.seed,
            mode = %config.mode,
            "starting battle"
        );

        let names = ConsolePresenter::new(&state);
        let processor = BattleProcessor::new(
            state,
            battle_config,
            catalog,
            Box::new(PcgRandom::new(config.seed)),
        );
        let animated = config.mode == BattleMode::Animated;
        let mut session = BattleSession::new(processor, config);

        let providers = SquadProviders::both(&AiCommandProvider);
        let outcome = if animated {
            let mut presenter = names;
            session.run(providers, &mut presenter).await?
        } else {
            session.run(providers, &mut NullPresenter).await?
        };

        let battle = session.into_battle();
        match self.format {
            OutputFormat::Summary => print_summary(&outcome, battle.state()),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        }
        Ok(())
    }

    fn runtime_config(&self) -> Result<RuntimeConfig> {
        let mut config = RuntimeConfig::from_env()?;
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(mode) = self.mode {
            config.mode = mode.into();
        }
        if let Some(delay) = self.delay_ms {
            config.action_delay_ms = delay;
        }
        Ok(config)
    }
}

fn print_summary(outcome: &BattleOutcome, state: &BattleState) {
    println!();
    println!(
        "{} wins after {} rounds",
        style(outcome.winner).bold().green(),
        outcome.rounds
    );

    for side in [BattleSide::Attacker, BattleSide::Defender] {
        println!("{}", style(side).bold());
        for unit in state.units(side) {
            let status = if unit.is_dead() {
                style("dead".to_string()).red()
            } else if unit.is_active() {
                style(format!("{}/{} hp", unit.hit_points, unit.max_hit_points)).green()
            } else {
                style("left the field".to_string()).dim()
            };
            println!("  {:<16} {}", unit.unit_type.name, status);
        }
    }

    if !outcome.experience.is_empty() {
        println!("{}", style("Experience").bold());
        for (unit, experience) in &outcome.experience {
            let name = state
                .unit(*unit)
                .map(|u| u.unit_type.name.clone())
                .unwrap_or_else(|_| unit.to_string());
            println!("  {:<16} +{}", name, experience);
        }
    }
}
