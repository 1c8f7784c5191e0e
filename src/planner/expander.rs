//! Merges global and per-file datatypes and options into execution units.

use log::{debug, warn};

use crate::config::{Datatype, DatatypeRegistry, ExtractionOptions, OptionsTable};
use crate::constants::GRID_ONLY_OPTIONS;
use crate::error::{PlanError, PlanResult};
use crate::planner::plan::ExecutionUnit;
use crate::planner::resolver::DatafileSpec;

pub struct DatatypeExpander<'a> {
    registry: &'a DatatypeRegistry,
}

impl<'a> DatatypeExpander<'a> {
    pub fn new(registry: &'a DatatypeRegistry) -> Self {
        Self { registry }
    }

    /// Produce one unit per (datafile, datatype) pair, in datafile order
    pub fn expand(
        &self,
        specs: &[DatafileSpec],
        global_datatypes: &[Datatype],
        global_options: &OptionsTable,
    ) -> PlanResult<Vec<ExecutionUnit>> {
        let mut units = Vec::new();
        for spec in specs {
            let datatypes = self.datatypes_for(spec, global_datatypes);
            if datatypes.is_empty() {
                debug!("Nothing to extract from {}", spec.path.display());
                continue;
            }
            for datatype in datatypes {
                let options = self.options_for(datatype, global_options, &spec.options, &spec.entry)?;
                units.push(ExecutionUnit::new(spec.path.clone(), datatype, options));
            }
        }
        Ok(units)
    }

    /// The file's own list when it has one, otherwise the global list
    pub fn datatypes_for(&self, spec: &DatafileSpec, global_datatypes: &[Datatype]) -> Vec<Datatype> {
        match &spec.selection.own_datatypes {
            Some(own) => self.registry.expand(own),
            None => {
                let mut datatypes = Vec::with_capacity(global_datatypes.len());
                for datatype in global_datatypes {
                    if !datatypes.contains(datatype) {
                        datatypes.push(*datatype);
                    }
                }
                datatypes
            }
        }
    }

    /// Options for one unit: registry defaults, then global shared, then
    /// global per-datatype, then per-file per-datatype
    pub fn options_for(
        &self,
        datatype: Datatype,
        global_options: &OptionsTable,
        file_options: &OptionsTable,
        entry: &str,
    ) -> PlanResult<ExtractionOptions> {
        let registry_entry = self.registry.entry(datatype);
        let mut options = self.registry.default_options(datatype);

        for (key, value) in global_options.shared.iter() {
            if registry_entry.accepts_option(key) {
                options.insert(key.as_str(), value.clone());
            }
        }

        let layers = [
            ("global".to_string(), global_options.for_datatype(datatype)),
            (format!("datafile '{}'", entry), file_options.for_datatype(datatype)),
        ];
        for (context, layer) in layers {
            let Some(layer) = layer else { continue };
            for (key, value) in layer.iter() {
                if registry_entry.accepts_option(key) {
                    options.insert(key.as_str(), value.clone());
                } else if GRID_ONLY_OPTIONS.contains(&key.as_str()) {
                    return Err(PlanError::config(
                        context,
                        format!("option '{}' only applies to grid, not {}", key, datatype),
                    ));
                } else {
                    warn!(
                        "Option '{}' is not understood by {} ({}), ignoring it",
                        key, datatype, context
                    );
                }
            }
        }

        Ok(options)
    }
}
