use log::debug;
use serde_yaml::Value;

use crate::config::datatypes::{Datatype, DatatypeRequest, ALL_SENTINEL};
use crate::config::options::ExtractionOptions;
use crate::constants::{COMMON_OPTIONS, DEFAULT_RESTART_PROPERTIES, RESTART_PROPERTIES_KEY};
use crate::error::{PlanError, PlanResult};

/// Static description of one supported datatype
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub datatype: Datatype,
    /// Extracted when the configuration has no `datatypes` key
    pub enabled_by_default: bool,
    /// Metadata content the extracted table is tagged with
    pub content: &'static str,
    /// Option keys this datatype understands, besides the common ones
    pub accepted_options: &'static [&'static str],
    pub description: &'static str,
}

impl RegistryEntry {
    pub fn accepts_option(&self, key: &str) -> bool {
        COMMON_OPTIONS.contains(&key) || self.accepted_options.contains(&key)
    }
}

/// Immutable table of supported datatypes and their defaults.
///
/// Built once at startup and handed to the normalizer and expander.
#[derive(Debug, Clone)]
pub struct DatatypeRegistry {
    entries: Vec<RegistryEntry>,
}

impl Default for DatatypeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl DatatypeRegistry {
    /// The registry of every datatype the extraction tool supports
    pub fn standard() -> Self {
        let entries = Datatype::ALL.iter().map(|&datatype| standard_entry(datatype)).collect();
        Self { entries }
    }

    /// Datatypes used when the user gives no `datatypes` key
    pub fn defaults(&self) -> Vec<Datatype> {
        self.entries
            .iter()
            .filter(|entry| entry.enabled_by_default)
            .map(|entry| entry.datatype)
            .collect()
    }

    /// The full closed set, in priority order
    pub fn supported(&self) -> Vec<Datatype> {
        self.entries.iter().map(|entry| entry.datatype).collect()
    }

    pub fn entry(&self, datatype: Datatype) -> &RegistryEntry {
        // Every Datatype variant gets an entry in standard()
        self.entries
            .iter()
            .find(|entry| entry.datatype == datatype)
            .unwrap_or_else(|| unreachable!("registry is missing {}", datatype))
    }

    /// Look up a datatype by name, failing for names outside the closed set
    pub fn lookup(&self, name: &str) -> PlanResult<Datatype> {
        name.parse::<Datatype>()
            .ok()
            .filter(|datatype| self.entries.iter().any(|entry| entry.datatype == *datatype))
            .ok_or_else(|| {
                PlanError::config(
                    "registry",
                    format!(
                        "unknown datatype '{}', valid datatypes are: {}",
                        name,
                        self.supported_names().join(", ")
                    ),
                )
            })
    }

    /// Parse a user supplied name, accepting the `all` sentinel
    pub fn request(&self, name: &str, context: &str) -> PlanResult<DatatypeRequest> {
        let trimmed = name.trim();
        if trimmed == ALL_SENTINEL {
            return Ok(DatatypeRequest::All);
        }
        self.lookup(trimmed)
            .map(DatatypeRequest::Named)
            .map_err(|err| match err {
                PlanError::Configuration { message, .. } => PlanError::config(context, message),
                other => other,
            })
    }

    /// Expand requests into concrete datatypes, resolving `all`.
    ///
    /// Order of first appearance is kept and duplicates are dropped.
    pub fn expand(&self, requests: &[DatatypeRequest]) -> Vec<Datatype> {
        let mut expanded: Vec<Datatype> = Vec::new();
        for request in requests {
            match request {
                DatatypeRequest::All => {
                    for datatype in self.supported() {
                        if !expanded.contains(&datatype) {
                            expanded.push(datatype);
                        }
                    }
                }
                DatatypeRequest::Named(datatype) => {
                    if !expanded.contains(datatype) {
                        expanded.push(*datatype);
                    }
                }
            }
        }
        debug!("Expanded {:?} to {:?}", requests, expanded);
        expanded
    }

    /// Options every extraction of `datatype` starts from
    pub fn default_options(&self, datatype: Datatype) -> ExtractionOptions {
        let mut options = ExtractionOptions::new();
        if datatype == Datatype::Grid {
            let props = DEFAULT_RESTART_PROPERTIES
                .iter()
                .map(|prop| Value::String(prop.to_string()))
                .collect();
            options.insert(RESTART_PROPERTIES_KEY, Value::Sequence(props));
        }
        options
    }

    pub fn supported_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.datatype.as_str()).collect()
    }
}

fn standard_entry(datatype: Datatype) -> RegistryEntry {
    let (enabled_by_default, content, accepted_options, description): (
        bool,
        &'static str,
        &'static [&'static str],
        &'static str,
    ) = match datatype {
        Datatype::Summary => (
            true,
            "timeseries",
            &["column_keys", "time_index", "start_date", "end_date", "params", "paramfile"],
            "Summary vectors from the UNSMRY/SMSPEC files",
        ),
        Datatype::Rft => (
            true,
            "rft",
            &["wellname", "date"],
            "RFT data from the simulator binary output",
        ),
        Datatype::Grid => (
            false,
            "property",
            &[RESTART_PROPERTIES_KEY, "rstdates", "dropconstants"],
            "Grid geometry with INIT and restart properties",
        ),
        Datatype::Satfunc => (
            true,
            "relperm",
            &["keywords"],
            "Saturation functions (SWOF, SGOF, SWFN, ...)",
        ),
        Datatype::Pvt => (false, "pvt", &["keywords"], "PVT tables (PVTO, PVDG, DENSITY, ...)"),
        Datatype::Vfp => (
            false,
            "lift_curves",
            &["keywords", "vfpnumbers"],
            "VFPPROD/VFPINJ lift curve tables",
        ),
        Datatype::Gruptree => (
            false,
            "property",
            &["startdate"],
            "Production network topology from GRUPTREE/BRANPROP",
        ),
        Datatype::Wellcompletiondata => (
            false,
            "property",
            &["zonemap", "use_wellconnstatus", "excl_well_startswith"],
            "Well completion data aggregated per zone",
        ),
        Datatype::Tran => (
            false,
            "transmissibilities",
            &["vectors", "boundaryfilter", "group", "coords"],
            "Transmissibilities from the EGRID/INIT files",
        ),
        Datatype::Equil => (false, "property", &["keywords"], "Equilibration data (EQUIL, RSVD, ...)"),
        Datatype::Compdat => (false, "property", &["initvectors"], "COMPDAT/WELSEGS/COMPSEGS data"),
        Datatype::Faults => (false, "property", &[], "Data from the FAULTS keyword"),
        Datatype::Fipreports => (
            false,
            "property",
            &["fipname"],
            "FIP region reports from the PRT file",
        ),
        Datatype::Wcon => (false, "property", &[], "Well control data (WCONHIST, WCONPROD, ...)"),
        Datatype::Wellconnstatus => (false, "property", &[], "Well connection status over time"),
    };

    RegistryEntry {
        datatype,
        enabled_by_default,
        content,
        accepted_options,
        description,
    }
}
