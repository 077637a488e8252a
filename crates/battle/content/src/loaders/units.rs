//! Unit type catalog loader.

use std::path::Path;

use battle_core::UnitType;
use serde::{Deserialize, Serialize};

use crate::catalog::UnitCatalog;
use crate::loaders::{LoadResult, read_file};

/// Unit catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitCatalogFile {
    pub units: Vec<UnitType>,
}

/// Loader for unit type catalogs from RON files.
pub struct UnitLoader;

impl UnitLoader {
    /// Load and validate a unit catalog from a RON file.
    pub fn load(path: &Path) -> LoadResult<UnitCatalog> {
        let content = read_file(path)?;
        let catalog = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), unit_types = catalog.len(), "unit catalog loaded");
        Ok(catalog)
    }

    pub fn parse(content: &str) -> LoadResult<UnitCatalog> {
        let file: UnitCatalogFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse unit catalog RON: {}", e))?;
        let catalog = UnitCatalog::new(file.units)
            .map_err(|e| anyhow::anyhow!("Invalid unit catalog: {}", e))?;
        Ok(catalog)
    }
}
