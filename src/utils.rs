//! Utility functions for day selection, log-friendly strings and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Default day selection for the batch job
//! - String truncation for logs and error excerpts
//! - File system validation for report output directories

use crate::models::DayKey;
use chrono::{Duration, Local, NaiveDate};
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// The day processed when the batch job is given no date.
///
/// "Yesterday" is taken from the local calendar of the process; the resulting
/// day is then bucketed with UTC boundaries like any explicit date.
pub fn default_day() -> DayKey {
    day_before(Local::now().date_naive())
}

fn day_before(today: NaiveDate) -> DayKey {
    DayKey::new(today - Duration::days(1))
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut after `max` characters (never inside a multi-byte
/// character) with an ellipsis and the number of dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then creates and immediately
/// deletes a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> std::io::Result<()> {
    fs::create_dir_all(path).await?;
    // A plain std write gives the simplest error surface for the probe
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}
