use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, warn};
use serde_yaml::{Mapping, Value};

use crate::constants::{CONFIG_SECTION_KEY, METADATA_BLOCKS};

/// The global variables document of a realization.
///
/// Besides the `sim2sumo` section it carries the masterdata, access and model
/// blocks that every uploaded object is tagged with.
#[derive(Debug, Clone, Default)]
pub struct GlobalConfig {
    pub path: PathBuf,
    document: Mapping,
}

impl GlobalConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config = Self::from_yaml_str(&content)
            .context(format!("Failed to parse YAML config: {}", path.display()))?;

        debug!("Loaded configuration from {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            ..config
        })
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(content).context("Failed to parse YAML config")?;
        let document = match value {
            Value::Mapping(mapping) => mapping,
            Value::Null => Mapping::new(),
            other => anyhow::bail!(
                "Expected a mapping at the top of the config, found {}",
                value_kind(&other)
            ),
        };
        Ok(Self {
            path: PathBuf::new(),
            document,
        })
    }

    /// The raw `sim2sumo` section, if the document has one
    pub fn section(&self) -> Option<&Value> {
        self.document.get(CONFIG_SECTION_KEY)
    }

    /// Blocks copied into object metadata, in a fixed order
    pub fn metadata_blocks(&self) -> Vec<(&'static str, Value)> {
        METADATA_BLOCKS
            .iter()
            .filter_map(|key| self.document.get(*key).map(|value| (*key, value.clone())))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }
}

/// Load the global config, treating an unreadable file as an empty document.
///
/// A malformed file is still an error: only a missing or unreadable file
/// falls back to defaults.
pub fn load_global_config(path: &Path) -> Result<GlobalConfig> {
    if !path.is_file() {
        warn!(
            "Cannot open config file {}, continuing with an empty configuration",
            path.display()
        );
        return Ok(GlobalConfig {
            path: path.to_path_buf(),
            ..GlobalConfig::default()
        });
    }
    GlobalConfig::from_yaml_file(path)
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_section_and_blocks() {
        let config = GlobalConfig::from_yaml_str(
            r#"
masterdata:
  smda:
    country: [Norway]
access:
  asset:
    name: Drogon
sim2sumo:
  datatypes: [summary]
"#,
        )
        .unwrap();

        assert!(config.section().is_some());
        let blocks = config.metadata_blocks();
        let keys: Vec<_> = blocks.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, vec!["masterdata", "access"]);
    }

    #[test]
    fn test_empty_document() {
        let config = GlobalConfig::from_yaml_str("").unwrap();
        assert!(config.is_empty());
        assert!(config.section().is_none());
    }

    #[test]
    fn test_top_level_must_be_mapping() {
        let err = GlobalConfig::from_yaml_str("- a\n- b\n").unwrap_err();
        assert!(err.to_string().contains("a list"));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_global_config(&temp_dir.path().join("nope.yml")).unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), "invalid: yaml: content:").unwrap();

        let result = load_global_config(temp_file.path());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to parse YAML"));
    }
}
