//! JSON output for reports.
//!
//! Every report is printed to stdout. When an output directory is configured
//! it is also written to `{dir}/{command}-{date}.json`, where the date is the
//! local run date.

use crate::error::Result;
use crate::utils::ensure_writable_dir;
use chrono::Local;
use serde::Serialize;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// Print `report` and, with `output_dir`, persist it next to earlier runs.
///
/// Returns the path written, if any.
#[instrument(level = "info", skip_all, fields(command = %command))]
pub async fn emit_report<T: Serialize>(
    report: &T,
    command: &str,
    output_dir: Option<&str>,
) -> Result<Option<PathBuf>> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");

    let Some(dir) = output_dir else {
        return Ok(None);
    };
    if let Err(e) = ensure_writable_dir(dir).await {
        error!(path = %dir, error = %e, "Report directory is not writable");
        return Err(e.into());
    }

    let path = PathBuf::from(dir).join(report_file_name(command, &Local::now().date_naive().to_string()));
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote JSON report");
    Ok(Some(path))
}

fn report_file_name(command: &str, date: &str) -> String {
    format!("{command}-{date}.json")
}
