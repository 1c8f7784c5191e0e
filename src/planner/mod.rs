//! Execution planning.
//!
//! A plan is built in three passes over a normalized configuration:
//!
//! ```text
//! NormalizedConfig ──▶ DatafileResolver ──▶ DatatypeExpander ──▶ ExecutionPlan
//!                      (paths on disk)      (datatypes, options)  (ordered, unique)
//! ```
//!
//! Planning is synchronous and only performs existence checks and directory
//! listings, so the same configuration and filesystem always give the same
//! plan.

use std::path::{Path, PathBuf};

use log::info;
use serde_yaml::Value;

use crate::config::{ConfigNormalizer, DatatypeRegistry, NormalizedConfig, Overrides, RawConfig};
use crate::error::PlanResult;

/// Merging of datatypes and options per datafile
pub mod expander;

/// Ordered execution units
pub mod plan;

/// Datafile entry resolution and default discovery
pub mod resolver;

pub use expander::DatatypeExpander;
pub use plan::{ExecutionPlan, ExecutionUnit};
pub use resolver::{is_datafile, DatafileResolver, DatafileSpec};

/// Builds execution plans for one runpath
pub struct Planner<'a> {
    registry: &'a DatatypeRegistry,
    runpath: PathBuf,
}

impl<'a> Planner<'a> {
    pub fn new(registry: &'a DatatypeRegistry, runpath: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            runpath: runpath.into(),
        }
    }

    pub fn runpath(&self) -> &Path {
        &self.runpath
    }

    /// Plan from the raw `sim2sumo` section. Validation of the whole
    /// section happens before the filesystem is looked at.
    pub fn plan_section(&self, section: Option<&Value>, overrides: &Overrides) -> PlanResult<ExecutionPlan> {
        let raw = RawConfig::from_section(section)?;
        let normalized = ConfigNormalizer::new(self.registry).normalize(&raw, overrides)?;
        self.plan(&normalized)
    }

    pub fn plan(&self, config: &NormalizedConfig) -> PlanResult<ExecutionPlan> {
        if !config.enabled {
            info!("sim2sumo is disabled, nothing to plan");
            return Ok(ExecutionPlan::empty());
        }
        if config.global_datatypes.is_empty() && !config.has_file_overrides() {
            info!("No datatypes requested, nothing to plan");
            return Ok(ExecutionPlan::empty());
        }

        let specs = DatafileResolver::new(&self.runpath).resolve(&config.entries)?;
        let units = DatatypeExpander::new(self.registry).expand(
            &specs,
            &config.global_datatypes,
            &config.global_options,
        )?;
        let plan = ExecutionPlan::from_units(units);

        info!(
            "Planned {} extraction(s) from {} datafile(s)",
            plan.len(),
            plan.datafiles().len()
        );
        Ok(plan)
    }
}

/// Build a plan from the raw section with the standard registry
pub fn build_plan(section: Option<&Value>, overrides: &Overrides, runpath: &Path) -> PlanResult<ExecutionPlan> {
    let registry = DatatypeRegistry::standard();
    Planner::new(&registry, runpath).plan_section(section, overrides)
}
