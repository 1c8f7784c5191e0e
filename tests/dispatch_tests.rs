//! Integration tests for dispatching plans to the extraction and upload
//! collaborators.

mod common;

use std::collections::HashMap;
use std::fs;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};

use common::{datafile, realization, section};
use sim2sumo::cloud::{LocalExporter, UploadReceipt, Uploader};
use sim2sumo::config::{Datatype, DatatypeRegistry, GlobalConfig, Overrides};
use sim2sumo::dispatch::{Dispatcher, Stage, UnitStatus};
use sim2sumo::extract::{Extraction, Extractor};
use sim2sumo::metadata::{MetadataBuilder, SumoObject};
use sim2sumo::planner::{build_plan, ExecutionUnit};

/// Produces a small CSV per unit and counts the calls
#[derive(Default)]
struct CsvExtractor {
    calls: Mutex<HashMap<String, usize>>,
    fail_on: Option<Datatype>,
}

#[async_trait::async_trait]
impl Extractor for CsvExtractor {
    async fn extract(&self, unit: &ExecutionUnit) -> Result<Extraction> {
        *self.calls.lock().unwrap().entry(unit.label()).or_insert(0) += 1;
        if self.fail_on == Some(unit.datatype) {
            return Err(anyhow!("no output for {}", unit.datatype));
        }
        Ok(Extraction::csv(format!("DATATYPE\n{}\n", unit.datatype).into_bytes()))
    }
}

/// Keeps uploaded objects in memory
#[derive(Default)]
struct MemoryUploader {
    objects: Mutex<Vec<SumoObject>>,
}

#[async_trait::async_trait]
impl Uploader for MemoryUploader {
    fn target_name(&self) -> String {
        "memory".to_string()
    }

    async fn upload(&self, object: &SumoObject) -> Result<UploadReceipt> {
        self.objects.lock().unwrap().push(object.clone());
        Ok(UploadReceipt {
            location: object.relative_path().to_string(),
            metadata_location: String::new(),
            bytes: object.bytes.len() as u64,
        })
    }
}

fn metadata_builder() -> Arc<MetadataBuilder> {
    let global = GlobalConfig::from_yaml_str(
        "masterdata:\n  smda:\n    country: [{identifier: Norway}]\naccess:\n  asset: {name: Drogon}\n",
    )
    .unwrap();
    Arc::new(MetadataBuilder::new(&global, DatatypeRegistry::standard()).unwrap())
}

#[tokio::test]
async fn test_each_unit_extracted_and_uploaded_once() -> Result<()> {
    let (_guard, runpath) = realization("drogon_case", 2);
    datafile(&runpath, "eclipse/model/DROGON-2.DATA");
    let plan = build_plan(
        Some(&section("datatypes: [summary, rft, vfp]\n")),
        &Overrides::default(),
        &runpath,
    )?;

    let extractor = Arc::new(CsvExtractor::default());
    let uploader = Arc::new(MemoryUploader::default());
    let dispatcher = Dispatcher::new(extractor.clone(), metadata_builder(), uploader.clone())
        .with_concurrency(2);

    let summary = dispatcher.dispatch(&plan).await;
    assert_eq!(summary.len(), 3);
    assert!(!summary.has_failures());
    assert!(extractor.calls.lock().unwrap().values().all(|count| *count == 1));

    let objects = uploader.objects.lock().unwrap();
    let mut paths: Vec<&str> = objects.iter().map(|o| o.relative_path()).collect();
    paths.sort();
    assert_eq!(
        paths,
        vec![
            "realization-2/iter-0/share/results/tables/DROGON--rft.csv",
            "realization-2/iter-0/share/results/tables/DROGON--summary.csv",
            "realization-2/iter-0/share/results/tables/DROGON--vfp.csv",
        ]
    );
    assert!(objects.iter().all(|o| o.case_name() == Some("drogon_case")));
    Ok(())
}

#[tokio::test]
async fn test_failed_unit_does_not_stop_others() -> Result<()> {
    let (_guard, runpath) = realization("drogon_case", 0);
    datafile(&runpath, "eclipse/model/DROGON-0.DATA");
    let plan = build_plan(
        Some(&section("datatypes: [summary, rft, grid]\n")),
        &Overrides::default(),
        &runpath,
    )?;

    let extractor = Arc::new(CsvExtractor {
        fail_on: Some(Datatype::Rft),
        ..Default::default()
    });
    let uploader = Arc::new(MemoryUploader::default());
    let summary = Dispatcher::new(extractor, metadata_builder(), uploader.clone())
        .dispatch(&plan)
        .await;

    assert!(summary.has_failures());
    assert_eq!(summary.succeeded(), 2);
    assert_eq!(uploader.objects.lock().unwrap().len(), 2);

    let statuses: Vec<(Datatype, bool)> = summary
        .outcomes
        .iter()
        .map(|o| (o.unit.datatype, o.is_failure()))
        .collect();
    assert_eq!(
        statuses,
        vec![
            (Datatype::Summary, false),
            (Datatype::Rft, true),
            (Datatype::Grid, false),
        ]
    );
    match &summary.outcomes[1].status {
        UnitStatus::Failed { stage, error } => {
            assert_eq!(*stage, Stage::Extract);
            assert!(error.contains("no output for rft"));
        }
        other => panic!("expected a failure, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_local_export_writes_objects_and_sidecars() -> Result<()> {
    let (_guard, runpath) = realization("drogon_case", 1);
    datafile(&runpath, "eclipse/model/DROGON-1.DATA");
    let plan = build_plan(
        Some(&section("datatypes: [satfunc]\n")),
        &Overrides::default(),
        &runpath,
    )?;

    let out = tempfile::TempDir::new()?;
    let exporter = Arc::new(LocalExporter::new(out.path(), "dev"));
    let summary = Dispatcher::new(Arc::new(CsvExtractor::default()), metadata_builder(), exporter)
        .dispatch(&plan)
        .await;
    assert!(!summary.has_failures());

    let tables = out
        .path()
        .join("dev/drogon_case/realization-1/iter-0/share/results/tables");
    assert_eq!(fs::read_to_string(tables.join("DROGON--satfunc.csv"))?, "DATATYPE\nsatfunc\n");

    let sidecar = fs::read_to_string(tables.join(".DROGON--satfunc.csv.yml"))?;
    assert!(sidecar.contains("content: relperm"));
    assert!(sidecar.contains("masterdata:"));
    assert!(sidecar.contains("event: created"));
    Ok(())
}
