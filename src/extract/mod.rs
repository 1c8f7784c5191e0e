//! Extraction of tables from simulator output.
//!
//! Reading binary simulator output is the job of an external tool; this
//! module only defines the seam ([`Extractor`]) and a command-line driver for
//! it ([`CommandExtractor`]).

use anyhow::Result;

use crate::planner::ExecutionUnit;

/// Command-line driven extractor
pub mod command;

pub use command::CommandExtractor;

/// Format of an extracted table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Arrow,
}

impl TableFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Arrow => "arrow",
        }
    }
}

/// The payload produced for one execution unit
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub bytes: Vec<u8>,
    pub format: TableFormat,
}

impl Extraction {
    pub fn csv(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            format: TableFormat::Csv,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Extracts the table for one execution unit
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, unit: &ExecutionUnit) -> Result<Extraction>;
}
