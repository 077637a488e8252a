//! Content factory for loading everything a battle needs from a data directory.

use std::path::{Path, PathBuf};

use battle_core::{BattleConfig, BattleState};

use crate::catalog::UnitCatalog;
use crate::loaders::{ConfigLoader, LoadResult, ScenarioLoader, UnitLoader};
use crate::scenario::Scenario;

/// Content factory that loads battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── units.ron
/// └── scenarios/
///     ├── skirmish.ron
///     └── siege.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load battle rules from `config.toml`, or defaults if the file is absent.
    pub fn load_config(&self) -> LoadResult<BattleConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no battle config, using defaults");
            return Ok(BattleConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the unit catalog from `units.ron`.
    pub fn load_units(&self) -> LoadResult<UnitCatalog> {
        let path = self.data_dir.join("units.ron");
        UnitLoader::load(&path)
    }

    /// Load a scenario from `scenarios/{name}.ron`.
    pub fn load_scenario(&self, name: &str) -> LoadResult<Scenario> {
        let path = self.scenario_path(name);
        ScenarioLoader::load(&path)
    }

    /// Load a scenario and build its battle state against `catalog`.
    pub fn load_battle(&self, name: &str, catalog: &UnitCatalog) -> LoadResult<BattleState> {
        let scenario = self.load_scenario(name)?;
        let state = scenario
            .build(catalog)
            .map_err(|e| anyhow::anyhow!("Failed to build scenario '{}': {}", name, e))?;
        Ok(state)
    }

    pub fn scenario_path(&self, name: &str) -> PathBuf {
        self.data_dir.join("scenarios").join(format!("{}.ron", name))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
