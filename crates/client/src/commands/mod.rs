mod run;
mod units;

pub use run::RunBattle;
pub use units::ListUnits;
