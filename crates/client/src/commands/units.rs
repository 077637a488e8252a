//! List the unit catalog.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use console::style;

use crate::data;

/// List the unit types of the catalog
#[derive(Parser)]
pub struct ListUnits {
    /// Content data directory
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,
}

impl ListUnits {
    pub fn execute(self) -> Result<()> {
        let catalog = data::content_factory(self.data_dir)?.load_units()?;

        for unit_type in catalog.iter() {
            let attack = &unit_type.main_attack;
            let size = if unit_type.is_large { "large" } else { "small" };
            println!(
                "{:>3}  {:<14} lvl {}  {:>3} hp  {:>2} init {}  {} {} {} ({}%, {})",
                unit_type.id.0,
                style(&unit_type.name).bold(),
                unit_type.level,
                unit_type.hit_points,
                unit_type.initiative,
                size,
                attack.kind.attack_type(),
                attack.source,
                attack.reach,
                attack.accuracy,
                attack.power,
            );
        }
        Ok(())
    }
}
