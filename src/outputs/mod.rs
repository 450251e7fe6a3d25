//! Reporting operations and their JSON output.
//!
//! # Submodules
//!
//! - [`report`]: The request/response operations exposed to the dashboard
//!   (analyze full feed, current stats, clear all) plus the batch day run
//! - [`json`]: Prints a report to stdout and optionally writes it to disk
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! ├── analyze-2025-10-21.json
//! ├── process-2025-10-20.json
//! └── stats-2025-10-21.json
//! ```

pub mod json;
pub mod report;
