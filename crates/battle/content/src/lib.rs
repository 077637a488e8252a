//! Data-driven battle content and loaders.
//!
//! This crate provides the unit type catalog and battle scenarios the engine
//! consumes, and loaders for RON/TOML data files:
//! - Unit type catalogs (data-driven via RON)
//! - Battle scenarios: two squads and their placements (data-driven via RON)
//! - Battle rule configuration (data-driven via TOML)
//!
//! Content is consumed through [`battle_core::UnitTypeOracle`] and never
//! appears in battle state except as the unit types copied into units.

pub mod catalog;
pub mod error;
pub mod scenario;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use catalog::UnitCatalog;
pub use error::ContentError;
pub use scenario::{Scenario, SquadSpec, UnitPlacement};

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, LoadResult, ScenarioLoader, UnitLoader};
