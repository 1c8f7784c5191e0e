//! Upload of extracted tables and their metadata.
//!
//! Every object is written twice: the table itself under its relative path,
//! and its metadata as a YAML sidecar next to it.
//!
//! ```text
//! <env>/<case>/realization-0/iter-0/share/results/tables/DROGON--summary.csv
//! <env>/<case>/realization-0/iter-0/share/results/tables/.DROGON--summary.csv.yml
//! ```
//!
//! ## Targets
//!
//! - **Amazon S3** ([`s3::S3Uploader`]): object plus sidecar in a bucket
//! - **Local directory** ([`local::LocalExporter`]): same layout on disk
//!
//! Uploads are attempted once. Retrying is left to the client library.

use anyhow::Result;

use crate::metadata::SumoObject;

/// Shared S3 client construction
pub mod client;

/// Export to a local directory
pub mod local;

/// Amazon S3 upload
pub mod s3;

pub use local::LocalExporter;
pub use s3::S3Uploader;

/// Case folder used when the datafile is not inside a realization
pub const UNKNOWN_CASE: &str = "no_case";

/// Where one object ended up
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReceipt {
    pub location: String,
    pub metadata_location: String,
    pub bytes: u64,
}

/// Receives finished objects
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Uploader: Send + Sync {
    /// Get the unique identifier for this target (for logs/errors)
    fn target_name(&self) -> String;

    async fn upload(&self, object: &SumoObject) -> Result<UploadReceipt>;
}

/// `<dir>/<file>` -> `<dir>/.<file>.yml`
pub fn sidecar_path(relative_path: &str) -> String {
    match relative_path.rsplit_once('/') {
        Some((dir, file)) => format!("{}/.{}.yml", dir, file),
        None => format!(".{}.yml", relative_path),
    }
}

/// Key of an object below the environment and case folders
pub fn object_key(env: &str, object: &SumoObject) -> String {
    let case = object.case_name().unwrap_or(UNKNOWN_CASE);
    format!("{}/{}/{}", env, case, object.relative_path())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidecar_path() {
        assert_eq!(
            sidecar_path("realization-0/iter-0/share/results/tables/DROGON--rft.csv"),
            "realization-0/iter-0/share/results/tables/.DROGON--rft.csv.yml"
        );
        assert_eq!(sidecar_path("DROGON--rft.csv"), ".DROGON--rft.csv.yml");
    }
}
