use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;
use uuid::Uuid;

use crate::constants::ERROR_FAILED_TO_WRITE_FILE;
use crate::dispatch::DispatchSummary;
use crate::planner::ExecutionPlan;

/// Create a JSON summary of a run.
///
/// # Example Output
///
/// ```json
/// {
///   "run_id": "550e8400-e29b-41d4-a716-446655440000",
///   "run_time": "2024-01-15T14:30:52Z",
///   "env": "prod",
///   "target": "s3://bucket/prod",
///   "unit_count": 4,
///   "uploaded": 3,
///   "failed": 1,
///   "units": [...]
/// }
/// ```
pub fn create_run_summary(
    timestamp: &str,
    env: &str,
    target: &str,
    summary: &DispatchSummary,
) -> Result<String> {
    let report = json!({
        "run_id": Uuid::new_v4().to_string(),
        "run_time": timestamp,
        "env": env,
        "target": target,
        "sim2sumo_version": env!("CARGO_PKG_VERSION"),
        "elapsed_seconds": summary.elapsed.as_secs_f64(),
        "unit_count": summary.len(),
        "uploaded": summary.succeeded(),
        "failed": summary.failed().len(),
        "uploaded_bytes": summary.uploaded_bytes(),
        "units": summary.outcomes,
    });

    serde_json::to_string_pretty(&report).context("Failed to serialize run summary")
}

/// Create a JSON description of a plan for `--dry_run`
pub fn create_plan_summary(timestamp: &str, plan: &ExecutionPlan) -> Result<String> {
    let report = json!({
        "run_id": Uuid::new_v4().to_string(),
        "run_time": timestamp,
        "dry_run": true,
        "unit_count": plan.len(),
        "datafiles": plan.datafiles(),
        "units": plan.units(),
    });

    serde_json::to_string_pretty(&report).context("Failed to serialize plan summary")
}

pub fn write_summary(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    std::fs::write(path, content).context(format!("{}: {}", ERROR_FAILED_TO_WRITE_FILE, path.display()))
}
