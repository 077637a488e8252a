//! Content loaders for reading battle data from files.
//!
//! Loaders turn RON/TOML files into catalogs, scenarios and configs. Files
//! use the battle-core types directly through their serde derives.

pub mod config;
pub mod factory;
pub mod scenario;
pub mod units;

pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use scenario::ScenarioLoader;
pub use units::UnitLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
