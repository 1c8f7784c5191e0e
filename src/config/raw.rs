//! The `sim2sumo` section exactly as the user wrote it.
//!
//! The section accepts several shapes (a boolean, a single path, a mapping
//! of paths, a list mixing paths and mappings). Each accepted shape gets an
//! explicit variant here, and nothing downstream looks at YAML values again.

use serde_yaml::{Mapping, Value};

use crate::config::global::value_kind;
use crate::error::{PlanError, PlanResult};

const SECTION_CONTEXT: &str = "sim2sumo";

/// The as-parsed `sim2sumo` section
#[derive(Debug, Clone, PartialEq)]
pub enum RawConfig {
    /// No section at all: discover datafiles and use default datatypes
    Absent,
    /// `sim2sumo: true` (defaults) or `sim2sumo: false` (disabled)
    Enabled(bool),
    Section(RawSection),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSection {
    pub datafile: Option<RawDatafiles>,
    pub datatypes: Option<Vec<String>>,
    pub options: Option<Mapping>,
    pub rstprops: Option<Vec<String>>,
    pub grid3d: Option<bool>,
}

/// The value of the `datafile` key
#[derive(Debug, Clone, PartialEq)]
pub enum RawDatafiles {
    Path(String),
    /// Path to selection, in file order
    Mapping(Vec<(String, RawSelection)>),
    List(Vec<RawDatafileEntry>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawDatafileEntry {
    Path(String),
    Override(String, RawSelection),
}

/// Datatypes attached to one datafile
#[derive(Debug, Clone, PartialEq)]
pub enum RawSelection {
    /// `path:` with no value
    Inherit,
    Names(Vec<String>),
    /// `path: {datatype: {option: value}}`
    WithOptions(Vec<(String, Option<Mapping>)>),
}

impl RawConfig {
    /// Classify the `sim2sumo` section of the global config
    pub fn from_section(section: Option<&Value>) -> PlanResult<Self> {
        match section {
            None | Some(Value::Null) => Ok(RawConfig::Absent),
            Some(Value::Bool(enabled)) => Ok(RawConfig::Enabled(*enabled)),
            Some(Value::Mapping(mapping)) => RawSection::from_mapping(mapping).map(RawConfig::Section),
            Some(other) => Err(PlanError::config(
                SECTION_CONTEXT,
                format!("expected a boolean or a mapping, found {}", value_kind(other)),
            )),
        }
    }
}

impl RawSection {
    fn from_mapping(mapping: &Mapping) -> PlanResult<Self> {
        let mut section = RawSection::default();
        let mut datafile_key: Option<&str> = None;

        for (key, value) in mapping {
            let key = key_string(key, SECTION_CONTEXT)?;
            match key.as_str() {
                "datafile" | "datafiles" => {
                    if let Some(previous) = datafile_key {
                        return Err(PlanError::config(
                            SECTION_CONTEXT,
                            format!("'{}' and '{}' are mutually exclusive", previous, key),
                        ));
                    }
                    datafile_key = Some(if key == "datafile" { "datafile" } else { "datafiles" });
                    section.datafile = RawDatafiles::from_value(value)?;
                }
                "datatypes" => {
                    section.datatypes = Some(string_list(value, "sim2sumo.datatypes")?);
                }
                "options" => {
                    section.options = match value {
                        Value::Null => None,
                        Value::Mapping(options) => Some(options.clone()),
                        other => {
                            return Err(PlanError::config(
                                "sim2sumo.options",
                                format!("expected a mapping, found {}", value_kind(other)),
                            ))
                        }
                    };
                }
                "rstprops" => {
                    section.rstprops = Some(string_list(value, "sim2sumo.rstprops")?);
                }
                "grid3d" => {
                    section.grid3d = match value {
                        Value::Bool(flag) => Some(*flag),
                        other => {
                            return Err(PlanError::config(
                                "sim2sumo.grid3d",
                                format!("expected a boolean, found {}", value_kind(other)),
                            ))
                        }
                    };
                }
                unknown => {
                    return Err(PlanError::config(
                        SECTION_CONTEXT,
                        format!(
                            "unknown key '{}', valid keys are: datafile, datatypes, options, rstprops, grid3d",
                            unknown
                        ),
                    ))
                }
            }
        }

        Ok(section)
    }
}

impl RawDatafiles {
    /// `None` when the key is present but empty
    fn from_value(value: &Value) -> PlanResult<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::String(path) => Ok(Some(RawDatafiles::Path(path.clone()))),
            Value::Mapping(mapping) => {
                let mut entries = Vec::with_capacity(mapping.len());
                for (path, selection) in mapping {
                    let path = key_string(path, "sim2sumo.datafile")?;
                    let selection = RawSelection::from_value(selection, &path)?;
                    entries.push((path, selection));
                }
                Ok(Some(RawDatafiles::Mapping(entries)))
            }
            Value::Sequence(items) => {
                let entries = items
                    .iter()
                    .map(RawDatafileEntry::from_value)
                    .collect::<PlanResult<Vec<_>>>()?;
                Ok(Some(RawDatafiles::List(entries)))
            }
            other => Err(PlanError::config(
                "sim2sumo.datafile",
                format!(
                    "expected a path, a list or a mapping, found {}",
                    value_kind(other)
                ),
            )),
        }
    }
}

impl RawDatafileEntry {
    fn from_value(value: &Value) -> PlanResult<Self> {
        match value {
            Value::String(path) => Ok(RawDatafileEntry::Path(path.clone())),
            Value::Mapping(mapping) if mapping.len() == 1 => {
                let (path, selection) = mapping
                    .iter()
                    .next()
                    .ok_or_else(|| PlanError::config("sim2sumo.datafile", "empty mapping entry"))?;
                let path = key_string(path, "sim2sumo.datafile")?;
                let selection = RawSelection::from_value(selection, &path)?;
                Ok(RawDatafileEntry::Override(path, selection))
            }
            Value::Mapping(mapping) => Err(PlanError::config(
                "sim2sumo.datafile",
                format!(
                    "list entries must map exactly one path to its datatypes, found {} keys",
                    mapping.len()
                ),
            )),
            other => Err(PlanError::config(
                "sim2sumo.datafile",
                format!(
                    "list entries must be a path or a mapping, found {}",
                    value_kind(other)
                ),
            )),
        }
    }
}

impl RawSelection {
    fn from_value(value: &Value, path: &str) -> PlanResult<Self> {
        let context = format!("datafile '{}'", path);
        match value {
            Value::Null => Ok(RawSelection::Inherit),
            Value::String(_) | Value::Sequence(_) => {
                string_list(value, &context).map(RawSelection::Names)
            }
            Value::Mapping(mapping) => {
                let mut with_options = Vec::with_capacity(mapping.len());
                for (datatype, options) in mapping {
                    let datatype = key_string(datatype, &context)?;
                    let options = match options {
                        Value::Null => None,
                        Value::Mapping(options) => Some(options.clone()),
                        other => {
                            return Err(PlanError::config(
                                context.as_str(),
                                format!(
                                    "options for '{}' must be a mapping, found {}",
                                    datatype,
                                    value_kind(other)
                                ),
                            ))
                        }
                    };
                    with_options.push((datatype, options));
                }
                Ok(RawSelection::WithOptions(with_options))
            }
            other => Err(PlanError::config(
                context.as_str(),
                format!(
                    "expected datatype names or a mapping, found {}",
                    value_kind(other)
                ),
            )),
        }
    }
}

fn key_string(key: &Value, context: &str) -> PlanResult<String> {
    match key {
        Value::String(s) => Ok(s.clone()),
        other => Err(PlanError::config(
            context,
            format!("keys must be strings, found {}", value_kind(other)),
        )),
    }
}

/// A single string or a list of strings
fn string_list(value: &Value, context: &str) -> PlanResult<Vec<String>> {
    match value {
        Value::String(single) => Ok(vec![single.clone()]),
        Value::Sequence(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(PlanError::config(
                    context,
                    format!("expected a string, found {}", value_kind(other)),
                )),
            })
            .collect(),
        other => Err(PlanError::config(
            context,
            format!("expected a string or a list, found {}", value_kind(other)),
        )),
    }
}
