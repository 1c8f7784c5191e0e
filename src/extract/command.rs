use std::path::Path;

use anyhow::{anyhow, Context, Result};
use log::{debug, warn};
use serde_yaml::Value;
use tokio::process::Command;

use crate::config::{Datatype, ExtractionOptions};
use crate::constants::{
    COMMON_OPTIONS, DEFAULT_EXTRACTOR_PROGRAM, ERROR_FAILED_TO_EXTRACT, ERROR_FAILED_TO_READ_FILE,
    GRID_VECTORS_FLAG, RESTART_PROPERTIES_KEY,
};
use crate::extract::{Extraction, Extractor, TableFormat};
use crate::planner::ExecutionUnit;

/// Runs `<program> <subcommand> <datafile> --output <file> [options]` per unit
#[derive(Debug, Clone)]
pub struct CommandExtractor {
    program: String,
}

impl Default for CommandExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_EXTRACTOR_PROGRAM)
    }
}

impl CommandExtractor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument list for one unit, without the program name
    pub fn arguments(&self, unit: &ExecutionUnit, output: &Path) -> Vec<String> {
        let mut args = vec![
            subcommand(unit.datatype).to_string(),
            unit.datafile.display().to_string(),
            "--output".to_string(),
            output.display().to_string(),
        ];
        args.extend(option_arguments(&unit.options));
        args
    }
}

#[async_trait::async_trait]
impl Extractor for CommandExtractor {
    async fn extract(&self, unit: &ExecutionUnit) -> Result<Extraction> {
        let format = table_format(&unit.options);
        let output = tempfile::Builder::new()
            .prefix("sim2sumo-")
            .suffix(&format!(".{}", format.extension()))
            .tempfile()
            .context("Failed to create temporary output file")?;

        let args = self.arguments(unit, output.path());
        debug!("Running {} {}", self.program, args.join(" "));

        let result = Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .context(format!("Failed to execute {}", self.program))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(anyhow!(
                "{} {}: {} exited with {}: {}",
                ERROR_FAILED_TO_EXTRACT,
                unit.label(),
                self.program,
                result.status,
                stderr.trim()
            ));
        }

        let bytes = tokio::fs::read(output.path()).await.context(format!(
            "{}: {}",
            ERROR_FAILED_TO_READ_FILE,
            output.path().display()
        ))?;
        if bytes.is_empty() {
            return Err(anyhow!(
                "{} {}: {} produced no output",
                ERROR_FAILED_TO_EXTRACT,
                unit.label(),
                self.program
            ));
        }

        debug!("Extracted {} bytes for {}", bytes.len(), unit.label());
        Ok(Extraction { bytes, format })
    }
}

/// Subcommand of the extraction tool for a datatype
pub fn subcommand(datatype: Datatype) -> &'static str {
    match datatype {
        Datatype::Tran => "trans",
        other => other.as_str(),
    }
}

fn table_format(options: &ExtractionOptions) -> TableFormat {
    match options.get("arrow") {
        Some(Value::Bool(true)) => TableFormat::Arrow,
        _ => TableFormat::Csv,
    }
}

/// Command line flag for an option key, `None` for keys handled here
/// rather than by the extraction tool
fn command_flag(key: &str) -> Option<String> {
    if COMMON_OPTIONS.contains(&key) {
        return None;
    }
    match key {
        RESTART_PROPERTIES_KEY => Some(format!("--{}", GRID_VECTORS_FLAG)),
        other => Some(format!("--{}", other)),
    }
}

/// `true` is a bare flag, `false` and null are omitted and a list is
/// given as several values after one flag
pub fn option_arguments(options: &ExtractionOptions) -> Vec<String> {
    let mut args = Vec::new();
    for (key, value) in options.iter() {
        let Some(flag) = command_flag(key) else { continue };
        match value {
            Value::Bool(true) => args.push(flag),
            Value::Bool(false) | Value::Null => {}
            Value::Sequence(items) => {
                if items.is_empty() {
                    continue;
                }
                args.push(flag);
                args.extend(items.iter().filter_map(scalar_text));
            }
            other => match scalar_text(other) {
                Some(text) => {
                    args.push(flag);
                    args.push(text);
                }
                None => warn!("Cannot pass option '{}' on the command line, skipping it", key),
            },
        }
    }
    args
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
