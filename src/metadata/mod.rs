//! Object metadata for extracted tables.
//!
//! Every uploaded table carries a metadata document describing what it is
//! (name, tagname, content), where it came from (case, realization,
//! iteration, datafile) and how to verify it (checksum, size).

use std::fs;
use std::path::{Component, Path};

use anyhow::{Context, Result};
use chrono::Utc;
use log::debug;
use regex::Regex;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::config::{DatatypeRegistry, GlobalConfig};
use crate::constants::TABLES_RELATIVE_DIR;
use crate::extract::Extraction;
use crate::planner::ExecutionUnit;
use crate::utils::hash::sha256_bytes;

/// Location of the case metadata relative to the case directory
const CASE_METADATA_PATH: &str = "share/metadata/fmu_case.yml";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileInfo {
    pub relative_path: String,
    pub checksum_sha256: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RealizationInfo {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationInfo {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FmuInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case: Option<CaseInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realization: Option<RealizationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iteration: Option<IterationInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackEvent {
    pub datetime: String,
    pub event: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceInfo {
    pub datafile: String,
    pub datatype: String,
}

/// Metadata document attached to one uploaded table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectMetadata {
    pub name: String,
    pub tagname: String,
    pub content: String,
    pub format: String,
    pub file: FileInfo,
    pub fmu: FmuInfo,
    pub source: SourceInfo,
    pub tracklog: Vec<TrackEvent>,
    /// masterdata, access and model blocks from the global config
    #[serde(flatten)]
    pub blocks: Mapping,
}

impl ObjectMetadata {
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize object metadata")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize object metadata")
    }
}

/// A table ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct SumoObject {
    pub bytes: Vec<u8>,
    pub metadata: ObjectMetadata,
}

impl SumoObject {
    pub fn relative_path(&self) -> &str {
        &self.metadata.file.relative_path
    }

    pub fn case_name(&self) -> Option<&str> {
        self.metadata.fmu.case.as_ref().map(|case| case.name.as_str())
    }
}

/// Realization identity derived from a path inside a runpath
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunContext {
    pub case_name: Option<String>,
    pub case_uuid: Option<String>,
    pub realization: Option<u32>,
    pub iteration: Option<String>,
    pub iteration_id: Option<u32>,
}

impl RunContext {
    /// `realization-<n>/<iteration>` prefix of the relative path, if known
    fn path_prefix(&self) -> Option<String> {
        match (self.realization, &self.iteration) {
            (Some(real), Some(iteration)) => Some(format!("realization-{}/{}", real, iteration)),
            (Some(real), None) => Some(format!("realization-{}", real)),
            _ => None,
        }
    }
}

/// Builds metadata for extracted tables
pub struct MetadataBuilder {
    registry: DatatypeRegistry,
    blocks: Mapping,
    realization_pattern: Regex,
    iteration_pattern: Regex,
}

impl MetadataBuilder {
    pub fn new(global: &GlobalConfig, registry: DatatypeRegistry) -> Result<Self> {
        let mut blocks = Mapping::new();
        for (key, value) in global.metadata_blocks() {
            blocks.insert(Value::String(key.to_string()), value);
        }

        Ok(Self {
            registry,
            blocks,
            realization_pattern: Regex::new(r"^realization-(\d+)$")
                .context("Failed to compile realization pattern")?,
            iteration_pattern: Regex::new(r"^iter-(\d+)$")
                .context("Failed to compile iteration pattern")?,
        })
    }

    /// Describe the extraction of one unit
    pub fn build(&self, unit: &ExecutionUnit, extraction: &Extraction) -> Result<SumoObject> {
        let name = give_name(&unit.datafile);
        let tagname = unit.datatype.as_str().to_string();
        let context = self.run_context(&unit.datafile);

        let file_name = format!("{}--{}.{}", name, tagname, extraction.format.extension());
        let relative_path = match context.path_prefix() {
            Some(prefix) => format!("{}/{}/{}", prefix, TABLES_RELATIVE_DIR, file_name),
            None => format!("{}/{}", TABLES_RELATIVE_DIR, file_name),
        };

        let fmu = FmuInfo {
            case: context.case_name.clone().map(|case_name| CaseInfo {
                name: case_name,
                uuid: context.case_uuid.clone(),
            }),
            realization: context.realization.map(|id| RealizationInfo {
                id,
                name: format!("realization-{}", id),
            }),
            iteration: context.iteration.clone().map(|iteration| IterationInfo {
                id: context.iteration_id.unwrap_or(0),
                name: iteration,
            }),
        };

        let metadata = ObjectMetadata {
            name,
            tagname,
            content: self.registry.entry(unit.datatype).content.to_string(),
            format: extraction.format.extension().to_string(),
            file: FileInfo {
                relative_path,
                checksum_sha256: sha256_bytes(&extraction.bytes),
                size_bytes: extraction.bytes.len() as u64,
            },
            fmu,
            source: SourceInfo {
                datafile: unit.datafile.display().to_string(),
                datatype: unit.datatype.to_string(),
            },
            tracklog: vec![TrackEvent {
                datetime: Utc::now().to_rfc3339(),
                event: "created".to_string(),
            }],
            blocks: self.blocks.clone(),
        };

        debug!("Built metadata for {} at {}", unit.label(), metadata.file.relative_path);
        Ok(SumoObject {
            bytes: extraction.bytes.clone(),
            metadata,
        })
    }

    /// Parse `<case>/realization-<n>/<iteration>` out of a datafile path
    pub fn run_context(&self, path: &Path) -> RunContext {
        let components: Vec<String> = path
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        let mut context = RunContext::default();
        let Some(index) = components
            .iter()
            .rposition(|part| self.realization_pattern.is_match(part))
        else {
            return context;
        };

        context.realization = self
            .realization_pattern
            .captures(&components[index])
            .and_then(|caps| caps.get(1))
            .and_then(|id| id.as_str().parse().ok());

        // The iteration folder sits between the realization and the simulator folder
        if let Some(iteration) = components.get(index + 1) {
            if index + 2 < components.len() {
                context.iteration_id = self
                    .iteration_pattern
                    .captures(iteration)
                    .and_then(|caps| caps.get(1))
                    .and_then(|id| id.as_str().parse().ok());
                context.iteration = Some(iteration.clone());
            }
        }

        if index > 0 {
            context.case_name = Some(components[index - 1].clone());
            let case_dir: std::path::PathBuf = path
                .ancestors()
                .find(|ancestor| {
                    ancestor
                        .file_name()
                        .map_or(false, |name| name.to_string_lossy() == components[index])
                })
                .and_then(Path::parent)
                .map(Path::to_path_buf)
                .unwrap_or_default();
            context.case_uuid = read_case_uuid(&case_dir);
        }
        context
    }
}

/// Object name from a datafile path: the stem without trailing digits and
/// dashes (`DROGON-1.DATA` -> `DROGON`). A stem made only of digits and
/// dashes is kept as is.
pub fn give_name(datafile: &Path) -> String {
    let stem = datafile
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let trimmed = stem.trim_end_matches(|c: char| c.is_ascii_digit() || c == '-');
    if trimmed.is_empty() {
        stem
    } else {
        trimmed.to_string()
    }
}

/// `fmu.case.uuid` from the case metadata file, when there is one
fn read_case_uuid(case_dir: &Path) -> Option<String> {
    let path = case_dir.join(CASE_METADATA_PATH);
    let content = fs::read_to_string(&path).ok()?;
    let document: Value = serde_yaml::from_str(&content).ok()?;
    let uuid = document.get("fmu")?.get("case")?.get("uuid")?.as_str()?;
    debug!("Found case uuid {} in {}", uuid, path.display());
    Some(uuid.to_string())
}
