//! JSON export of run reports.

use anyhow::{Context, Result};
use std::path::Path;

use crate::core::RunReport;
use crate::infra::fs::write_file;

pub fn to_json(report: &RunReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize run report")
}

/// Serializes `report` to `path` as pretty-printed JSON.
pub fn write_report(report: &RunReport, path: &Path) -> Result<()> {
    write_file(path, &to_json(report)?)
}
