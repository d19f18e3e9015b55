//! # smarty-runner: Run composition for the Smarty simulator.
//!
//! Loads [`SimulationParams`](smarty_core::SimulationParams) from a file with
//! environment overrides, drives a [`SimulationClock`] to the horizon and
//! writes the resulting report as JSON.

pub mod loader;
pub mod export;

use std::sync::Arc;

use smarty_core::error::SimulationError;
use smarty_core::SimulationParams;
use smarty_engine::{SimulationClock, SimulationReport};
use tracing::info;

pub use loader::{load_params, load_params_with_env};
pub use export::{results_file_name, write_report};

/// Run a full simulation and return its report.
pub fn run_simulation(params: SimulationParams) -> Result<SimulationReport, SimulationError> {
    let mut clock = SimulationClock::new(Arc::new(params))?;
    clock.run()?;
    let report = clock.report();
    info!(days = report.days_completed, paid = report.total_paid(), "report ready");
    Ok(report)
}
