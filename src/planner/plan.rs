use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::warn;
use serde::Serialize;

use crate::config::{Datatype, ExtractionOptions};

/// One extraction: a datafile, a datatype and the options to run it with
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionUnit {
    pub datafile: PathBuf,
    pub datatype: Datatype,
    pub options: ExtractionOptions,
}

impl ExecutionUnit {
    pub fn new(datafile: impl Into<PathBuf>, datatype: Datatype, options: ExtractionOptions) -> Self {
        Self {
            datafile: datafile.into(),
            datatype,
            options,
        }
    }

    /// Short label used in logs and summaries
    pub fn label(&self) -> String {
        let name = self
            .datafile
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.datafile.display().to_string());
        format!("{}:{}", name, self.datatype)
    }
}

/// The ordered, deduplicated list of extractions for one run.
///
/// Units are sorted by the order in which their datafile was first seen and
/// then by datatype priority. The plan is read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionPlan {
    units: Vec<ExecutionUnit>,
}

impl ExecutionPlan {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a plan from units in the order they were produced
    pub fn from_units(units: Vec<ExecutionUnit>) -> Self {
        let mut file_order: HashMap<PathBuf, usize> = HashMap::new();
        let mut seen: HashSet<(PathBuf, Datatype)> = HashSet::new();
        let mut kept = Vec::with_capacity(units.len());

        for unit in units {
            if !seen.insert((unit.datafile.clone(), unit.datatype)) {
                warn!("Dropping repeated unit {}", unit.label());
                continue;
            }
            let next = file_order.len();
            file_order.entry(unit.datafile.clone()).or_insert(next);
            kept.push(unit);
        }

        kept.sort_by_key(|unit| (file_order[&unit.datafile], unit.datatype));
        Self { units: kept }
    }

    pub fn units(&self) -> &[ExecutionUnit] {
        &self.units
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExecutionUnit> {
        self.units.iter()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Distinct datafiles in plan order
    pub fn datafiles(&self) -> Vec<&Path> {
        let mut files: Vec<&Path> = Vec::new();
        for unit in &self.units {
            if !files.contains(&unit.datafile.as_path()) {
                files.push(unit.datafile.as_path());
            }
        }
        files
    }

    /// Pairs of (datafile, datatype), mostly for assertions and logs
    pub fn pairs(&self) -> Vec<(&Path, Datatype)> {
        self.units
            .iter()
            .map(|unit| (unit.datafile.as_path(), unit.datatype))
            .collect()
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize execution plan")
    }
}

impl<'a> IntoIterator for &'a ExecutionPlan {
    type Item = &'a ExecutionUnit;
    type IntoIter = std::slice::Iter<'a, ExecutionUnit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(file: &str, datatype: Datatype) -> ExecutionUnit {
        ExecutionUnit::new(file, datatype, ExtractionOptions::new())
    }

    #[test]
    fn test_orders_by_file_then_priority() {
        let plan = ExecutionPlan::from_units(vec![
            unit("/run/B.DATA", Datatype::Grid),
            unit("/run/A.DATA", Datatype::Vfp),
            unit("/run/B.DATA", Datatype::Summary),
            unit("/run/A.DATA", Datatype::Rft),
        ]);

        let pairs: Vec<(String, Datatype)> = plan
            .iter()
            .map(|u| (u.datafile.display().to_string(), u.datatype))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("/run/B.DATA".to_string(), Datatype::Summary),
                ("/run/B.DATA".to_string(), Datatype::Grid),
                ("/run/A.DATA".to_string(), Datatype::Rft),
                ("/run/A.DATA".to_string(), Datatype::Vfp),
            ]
        );
        assert_eq!(
            plan.datafiles(),
            vec![Path::new("/run/B.DATA"), Path::new("/run/A.DATA")]
        );
    }

    #[test]
    fn test_duplicates_dropped() {
        let plan = ExecutionPlan::from_units(vec![
            unit("/run/A.DATA", Datatype::Summary),
            unit("/run/A.DATA", Datatype::Summary),
        ]);
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn test_empty_plan() {
        let plan = ExecutionPlan::empty();
        assert!(plan.is_empty());
        assert!(plan.datafiles().is_empty());
    }

    #[test]
    fn test_yaml_dump() {
        let plan = ExecutionPlan::from_units(vec![unit("/run/A.DATA", Datatype::Wellcompletiondata)]);
        let yaml = plan.to_yaml().unwrap();
        assert!(yaml.contains("units:"));
        assert!(yaml.contains("datatype: wellcompletiondata"));
        assert!(yaml.contains("/run/A.DATA"));
    }

    #[test]
    fn test_label() {
        assert_eq!(unit("/run/A.DATA", Datatype::Rft).label(), "A.DATA:rft");
    }
}
