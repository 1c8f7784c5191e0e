//! # sim2sumo
//!
//! Extracts tables from reservoir simulator runs, attaches standardized
//! metadata and uploads them to Sumo.
//!
//! ## Overview
//!
//! sim2sumo runs as a forward model after the simulator has finished a
//! realization. It reads the `sim2sumo` section of the global variables
//! file, works out which datafiles to read and which datatypes to extract
//! from each, and then extracts, describes and uploads every pair once.
//!
//! ## Usage
//!
//! ### Planning
//!
//! ```no_run
//! use sim2sumo::config::{load_global_config, DatatypeRegistry, Overrides};
//! use sim2sumo::planner::Planner;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let global = load_global_config(Path::new("fmuconfig/output/global_variables.yml"))?;
//! let registry = DatatypeRegistry::standard();
//!
//! let plan = Planner::new(&registry, ".").plan_section(global.section(), &Overrides::default())?;
//! for unit in &plan {
//!     println!("{} -> {}", unit.datafile.display(), unit.datatype);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Dispatch
//!
//! ```no_run
//! use sim2sumo::cloud::LocalExporter;
//! use sim2sumo::config::{DatatypeRegistry, GlobalConfig};
//! use sim2sumo::dispatch::Dispatcher;
//! use sim2sumo::extract::CommandExtractor;
//! use sim2sumo::metadata::MetadataBuilder;
//! use sim2sumo::planner::ExecutionPlan;
//! use std::sync::Arc;
//!
//! # async fn example(plan: ExecutionPlan) -> anyhow::Result<()> {
//! let metadata = MetadataBuilder::new(&GlobalConfig::default(), DatatypeRegistry::standard())?;
//! let dispatcher = Dispatcher::new(
//!     Arc::new(CommandExtractor::default()),
//!     Arc::new(metadata),
//!     Arc::new(LocalExporter::new("/tmp/export", "test")),
//! );
//! let summary = dispatcher.dispatch(&plan).await;
//! println!("{} uploaded, {} failed", summary.succeeded(), summary.failed().len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`cli`]: Command-line interface definitions and argument parsing
//! - [`config`]: Global config loading, registry and normalization
//! - [`planner`]: Datafile resolution, datatype expansion and plan building
//! - [`extract`]: Extraction collaborator
//! - [`metadata`]: Object metadata
//! - [`cloud`]: Upload collaborators (S3, local directory)
//! - [`dispatch`]: Concurrent execution of a plan
//! - [`utils`]: Hashing and run summaries
//! - [`constants`]: Application-wide constants

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Configuration loading, the datatype registry and normalization
pub mod config;

/// Typed errors raised while planning
pub mod error;

/// Datafile resolution and execution planning
pub mod planner;

/// Extraction of tables from simulator output
pub mod extract;

/// Metadata attached to uploaded objects
pub mod metadata;

/// Cloud storage integration (S3) and local export
pub mod cloud;

/// Concurrent execution of a plan
pub mod dispatch;

/// Help text per datatype
pub mod help;

/// Utility functions for hashing and reporting
pub mod utils;

/// Application constants and configuration values
pub mod constants;

/// Test utilities and helpers
#[cfg(test)]
pub mod test_utils;

pub use error::{PlanError, PlanResult};
