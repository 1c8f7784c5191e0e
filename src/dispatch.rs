//! Runs an execution plan: extract, describe and upload every unit.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future;
use log::{debug, info, warn};
use serde::Serialize;
use tokio::sync::Semaphore;

use crate::constants::DEFAULT_UPLOAD_THREADS;
use crate::cloud::Uploader;
use crate::extract::Extractor;
use crate::metadata::MetadataBuilder;
use crate::planner::{ExecutionPlan, ExecutionUnit};

/// Upper bound on concurrently dispatched units
const MAX_CONCURRENCY: usize = 32;

/// Step of a unit that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Extract,
    Metadata,
    Upload,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Extract => write!(f, "extract"),
            Stage::Metadata => write!(f, "metadata"),
            Stage::Upload => write!(f, "upload"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UnitStatus {
    Uploaded { location: String, bytes: u64 },
    Failed { stage: Stage, error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitOutcome {
    #[serde(flatten)]
    pub unit: ExecutionUnit,
    #[serde(flatten)]
    pub status: UnitStatus,
}

impl UnitOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, UnitStatus::Failed { .. })
    }
}

/// Result of dispatching a plan, in plan order
#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchSummary {
    pub outcomes: Vec<UnitOutcome>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl DispatchSummary {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_failure()).count()
    }

    pub fn failed(&self) -> Vec<&UnitOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure()).collect()
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(UnitOutcome::is_failure)
    }

    pub fn uploaded_bytes(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|o| match &o.status {
                UnitStatus::Uploaded { bytes, .. } => *bytes,
                UnitStatus::Failed { .. } => 0,
            })
            .sum()
    }
}

/// Drives the extraction, metadata and upload collaborators over a plan
pub struct Dispatcher {
    extractor: Arc<dyn Extractor>,
    metadata: Arc<MetadataBuilder>,
    uploader: Arc<dyn Uploader>,
    concurrency: usize,
}

impl Dispatcher {
    pub fn new(
        extractor: Arc<dyn Extractor>,
        metadata: Arc<MetadataBuilder>,
        uploader: Arc<dyn Uploader>,
    ) -> Self {
        Self {
            extractor,
            metadata,
            uploader,
            concurrency: DEFAULT_UPLOAD_THREADS,
        }
    }

    /// Limit the number of units in flight (clamped to 1..=32)
    pub fn with_concurrency(mut self, threads: usize) -> Self {
        self.concurrency = threads.clamp(1, MAX_CONCURRENCY);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Run every unit once. Failures are recorded, never retried.
    pub async fn dispatch(&self, plan: &ExecutionPlan) -> DispatchSummary {
        let start = Instant::now();
        info!(
            "Dispatching {} unit(s) to {} with {} concurrent task(s)",
            plan.len(),
            self.uploader.target_name(),
            self.concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let futures = plan.iter().map(|unit| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                let status = match semaphore.acquire().await {
                    Ok(_permit) => self.run_unit(unit).await,
                    Err(e) => UnitStatus::Failed {
                        stage: Stage::Extract,
                        error: format!("Dispatcher shut down: {}", e),
                    },
                };
                UnitOutcome {
                    unit: unit.clone(),
                    status,
                }
            }
        });

        let outcomes = future::join_all(futures).await;
        let summary = DispatchSummary {
            outcomes,
            elapsed: start.elapsed(),
        };

        info!(
            "Dispatch finished in {:?}: {} uploaded, {} failed",
            summary.elapsed,
            summary.succeeded(),
            summary.failed().len()
        );
        summary
    }

    async fn run_unit(&self, unit: &ExecutionUnit) -> UnitStatus {
        debug!("Extracting {}", unit.label());
        let extraction = match self.extractor.extract(unit).await {
            Ok(extraction) => extraction,
            Err(e) => return failed(unit, Stage::Extract, e),
        };

        let object = match self.metadata.build(unit, &extraction) {
            Ok(object) => object,
            Err(e) => return failed(unit, Stage::Metadata, e),
        };

        match self.uploader.upload(&object).await {
            Ok(receipt) => {
                info!("Uploaded {} to {}", unit.label(), receipt.location);
                UnitStatus::Uploaded {
                    location: receipt.location,
                    bytes: receipt.bytes,
                }
            }
            Err(e) => failed(unit, Stage::Upload, e),
        }
    }
}

fn failed(unit: &ExecutionUnit, stage: Stage, error: anyhow::Error) -> UnitStatus {
    warn!("{} failed during {}: {:#}", unit.label(), stage, error);
    UnitStatus::Failed {
        stage,
        error: format!("{:#}", error),
    }
}
