//! Turns a [`RawConfig`] into the canonical form the planner works with.
//!
//! Every name and option key is validated here, before the filesystem is
//! touched, so a bad configuration never causes partial work.

use log::{debug, info};
use serde_yaml::{Mapping, Value};

use crate::config::datatypes::{Datatype, DatatypeRequest, DatatypeSelection};
use crate::config::options::{ExtractionOptions, OptionsTable};
use crate::config::raw::{RawConfig, RawDatafileEntry, RawDatafiles, RawSection, RawSelection};
use crate::config::registry::DatatypeRegistry;
use crate::constants::{GRID_ONLY_OPTIONS, RESTART_PROPERTIES_KEY};
use crate::error::{PlanError, PlanResult};

const GLOBAL_CONTEXT: &str = "global";
const COMMAND_LINE_CONTEXT: &str = "command line";

/// Values given on the command line that replace parts of the configuration
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub datafile: Option<String>,
    pub datatype: Option<String>,
}

/// One configured datafile entry, not yet resolved against the filesystem
#[derive(Debug, Clone, PartialEq)]
pub struct DatafileEntry {
    /// The path, stub, directory or bare name exactly as written
    pub seed: String,
    pub selection: DatatypeSelection,
    pub options: OptionsTable,
}

impl DatafileEntry {
    pub fn inheriting(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            selection: DatatypeSelection::inherit(),
            options: OptionsTable::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedConfig {
    /// Empty means default discovery
    pub entries: Vec<DatafileEntry>,
    /// Already expanded, in first-seen order
    pub global_datatypes: Vec<Datatype>,
    pub global_options: OptionsTable,
    /// `false` when the section is `sim2sumo: false`
    pub enabled: bool,
}

impl NormalizedConfig {
    pub fn disabled() -> Self {
        Self {
            entries: Vec::new(),
            global_datatypes: Vec::new(),
            global_options: OptionsTable::default(),
            enabled: false,
        }
    }

    /// True when some entry carries a non-empty list of its own
    pub fn has_file_overrides(&self) -> bool {
        self.entries.iter().any(|entry| {
            entry
                .selection
                .own_datatypes
                .as_ref()
                .map_or(false, |own| !own.is_empty())
        })
    }
}

pub struct ConfigNormalizer<'a> {
    registry: &'a DatatypeRegistry,
}

impl<'a> ConfigNormalizer<'a> {
    pub fn new(registry: &'a DatatypeRegistry) -> Self {
        Self { registry }
    }

    pub fn normalize(&self, raw: &RawConfig, overrides: &Overrides) -> PlanResult<NormalizedConfig> {
        let mut normalized = match raw {
            RawConfig::Absent | RawConfig::Enabled(true) => self.defaults(),
            RawConfig::Enabled(false) => {
                info!("sim2sumo is disabled in the configuration");
                NormalizedConfig::disabled()
            }
            RawConfig::Section(section) => self.normalize_section(section)?,
        };

        self.apply_overrides(&mut normalized, overrides)?;
        debug!(
            "Normalized configuration: {} entries, global datatypes {:?}",
            normalized.entries.len(),
            normalized.global_datatypes
        );
        Ok(normalized)
    }

    fn defaults(&self) -> NormalizedConfig {
        NormalizedConfig {
            entries: Vec::new(),
            global_datatypes: self.registry.defaults(),
            global_options: OptionsTable::default(),
            enabled: true,
        }
    }

    fn normalize_section(&self, section: &RawSection) -> PlanResult<NormalizedConfig> {
        let mut requested_all = false;
        let mut global_datatypes = match &section.datatypes {
            Some(names) => {
                let requests = self.parse_names(names, GLOBAL_CONTEXT)?;
                requested_all = requests.contains(&DatatypeRequest::All);
                self.registry.expand(&requests)
            }
            None => self.registry.defaults(),
        };

        if requested_all && section.grid3d == Some(false) {
            return Err(PlanError::config(
                GLOBAL_CONTEXT,
                "'datatypes: all' includes grid and cannot be combined with 'grid3d: false'",
            ));
        }

        match section.grid3d {
            Some(true) if !global_datatypes.contains(&Datatype::Grid) => {
                global_datatypes.push(Datatype::Grid)
            }
            Some(false) => global_datatypes.retain(|datatype| *datatype != Datatype::Grid),
            _ => {}
        }

        let mut global_options = match &section.options {
            Some(mapping) => self.parse_global_options(mapping)?,
            None => OptionsTable::default(),
        };

        if let Some(props) = &section.rstprops {
            let grid = global_options.for_datatype_mut(Datatype::Grid);
            if grid.contains_key(RESTART_PROPERTIES_KEY) {
                return Err(PlanError::config(
                    GLOBAL_CONTEXT,
                    "'rstprops' and 'options.grid.rstprops' are mutually exclusive",
                ));
            }
            let props = props.iter().cloned().map(Value::String).collect();
            grid.insert(RESTART_PROPERTIES_KEY, Value::Sequence(props));
        }

        let entries = match &section.datafile {
            None => Vec::new(),
            Some(RawDatafiles::Path(path)) => vec![DatafileEntry::inheriting(path.as_str())],
            Some(RawDatafiles::Mapping(pairs)) => pairs
                .iter()
                .map(|(path, selection)| self.normalize_entry(path, selection))
                .collect::<PlanResult<Vec<_>>>()?,
            Some(RawDatafiles::List(items)) => items
                .iter()
                .map(|item| match item {
                    RawDatafileEntry::Path(path) => Ok(DatafileEntry::inheriting(path.as_str())),
                    RawDatafileEntry::Override(path, selection) => {
                        self.normalize_entry(path, selection)
                    }
                })
                .collect::<PlanResult<Vec<_>>>()?,
        };

        Ok(NormalizedConfig {
            entries,
            global_datatypes,
            global_options,
            enabled: true,
        })
    }

    fn normalize_entry(&self, path: &str, selection: &RawSelection) -> PlanResult<DatafileEntry> {
        let context = format!("datafile '{}'", path);
        let mut options = OptionsTable::default();

        let selection = match selection {
            RawSelection::Inherit => DatatypeSelection::inherit(),
            RawSelection::Names(names) => DatatypeSelection::own(self.parse_names(names, &context)?),
            RawSelection::WithOptions(pairs) => {
                let names: Vec<String> = pairs.iter().map(|(name, _)| name.clone()).collect();
                let requests = self.parse_names(&names, &context)?;

                for (request, (name, mapping)) in requests.iter().zip(pairs) {
                    let Some(mapping) = mapping else { continue };
                    let DatatypeRequest::Named(datatype) = request else {
                        return Err(PlanError::config(
                            context.as_str(),
                            format!("options cannot be attached to '{}'", name),
                        ));
                    };
                    let parsed = self.parse_datatype_options(*datatype, mapping, &context)?;
                    options.for_datatype_mut(*datatype).merge_from(&parsed);
                }
                DatatypeSelection::own(requests)
            }
        };

        Ok(DatafileEntry {
            seed: path.to_string(),
            selection,
            options,
        })
    }

    fn apply_overrides(&self, normalized: &mut NormalizedConfig, overrides: &Overrides) -> PlanResult<()> {
        if let Some(datatype) = &overrides.datatype {
            let request = self.registry.request(datatype, COMMAND_LINE_CONTEXT)?;
            info!("Datatype from command line: {}", request);
            normalized.global_datatypes = self.registry.expand(&[request]);
            normalized.enabled = true;
            for entry in normalized.entries.iter_mut() {
                entry.selection = DatatypeSelection::inherit();
            }
        }

        if let Some(datafile) = &overrides.datafile {
            info!("Datafile from command line: {}", datafile);
            normalized.entries = vec![DatafileEntry::inheriting(datafile.as_str())];
            normalized.enabled = true;
        }

        Ok(())
    }

    /// Validate a list of names, rejecting `all` mixed with other names
    fn parse_names(&self, names: &[String], context: &str) -> PlanResult<Vec<DatatypeRequest>> {
        let requests = names
            .iter()
            .map(|name| self.registry.request(name, context))
            .collect::<PlanResult<Vec<_>>>()?;

        if requests.len() > 1 && requests.contains(&DatatypeRequest::All) {
            return Err(PlanError::config(
                context,
                format!(
                    "'all' cannot be combined with other datatypes, found [{}]",
                    names.join(", ")
                ),
            ));
        }
        Ok(requests)
    }

    /// Keys naming a datatype with a mapping (or empty) value are
    /// per-datatype, everything else is shared
    fn parse_global_options(&self, mapping: &Mapping) -> PlanResult<OptionsTable> {
        let mut table = OptionsTable::default();
        for (key, value) in mapping {
            let key = option_key(key, GLOBAL_CONTEXT)?;
            let datatype = key.parse::<Datatype>().ok();
            match (datatype, value) {
                (Some(datatype), Value::Mapping(options)) => {
                    let parsed = self.parse_datatype_options(datatype, options, GLOBAL_CONTEXT)?;
                    table.for_datatype_mut(datatype).merge_from(&parsed);
                }
                (Some(datatype), Value::Null) => {
                    table.for_datatype_mut(datatype);
                }
                _ => {
                    table.shared.insert(key, value.clone());
                }
            }
        }
        Ok(table)
    }

    fn parse_datatype_options(
        &self,
        datatype: Datatype,
        mapping: &Mapping,
        context: &str,
    ) -> PlanResult<ExtractionOptions> {
        let mut options = ExtractionOptions::new();
        for (key, value) in mapping {
            let key = option_key(key, context)?;
            if datatype != Datatype::Grid && GRID_ONLY_OPTIONS.contains(&key.as_str()) {
                return Err(PlanError::config(
                    context,
                    format!("option '{}' only applies to grid, not {}", key, datatype),
                ));
            }
            options.insert(key, value.clone());
        }
        Ok(options)
    }
}

fn option_key(key: &Value, context: &str) -> PlanResult<String> {
    key.as_str().map(str::to_string).ok_or_else(|| {
        PlanError::config(context, format!("option keys must be strings, found {:?}", key))
    })
}
