//! JSON export of simulation results.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use smarty_core::error::SmartyError;
use smarty_engine::SimulationReport;
use tracing::info;

/// `results_<YYYYmmdd_HHMMSS>.json` for the given timestamp.
pub fn results_file_name<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("results_{}.json", at.format("%Y%m%d_%H%M%S"))
}

/// Write `report` as pretty JSON into `dir`, creating it if needed.
pub fn write_report<Tz: TimeZone>(
    report: &SimulationReport,
    dir: &Path,
    at: &DateTime<Tz>,
) -> Result<PathBuf, SmartyError>
where
    Tz::Offset: std::fmt::Display,
{
    fs::create_dir_all(dir)
        .map_err(|e| SmartyError::Export(format!("create {}: {e}", dir.display())))?;
    let path = dir.join(results_file_name(at));

    let file = fs::File::create(&path)
        .map_err(|e| SmartyError::Export(format!("create {}: {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .map_err(|e| SmartyError::Export(format!("serialize report: {e}")))?;
    writer
        .flush()
        .map_err(|e| SmartyError::Export(format!("write {}: {e}", path.display())))?;

    info!(path = %path.display(), days = report.days_completed, "results written");
    Ok(path)
}
