use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;

use crate::cloud::{object_key, sidecar_path, UploadReceipt, Uploader};
use crate::constants::ERROR_FAILED_TO_WRITE_FILE;
use crate::metadata::SumoObject;

/// Writes objects and sidecars below a local directory, using the same
/// `<env>/<case>/<relative path>` layout as the S3 uploader
pub struct LocalExporter {
    root: PathBuf,
    env: String,
}

impl LocalExporter {
    pub fn new(root: impl Into<PathBuf>, env: &str) -> Self {
        Self {
            root: root.into(),
            env: env.to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn write(path: &Path, contents: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create directory: {}", parent.display()))?;
        }
        tokio::fs::write(path, contents)
            .await
            .context(format!("{}: {}", ERROR_FAILED_TO_WRITE_FILE, path.display()))
    }
}

#[async_trait::async_trait]
impl Uploader for LocalExporter {
    fn target_name(&self) -> String {
        self.root.join(&self.env).display().to_string()
    }

    async fn upload(&self, object: &SumoObject) -> Result<UploadReceipt> {
        let key = object_key(&self.env, object);
        let path = self.root.join(&key);
        let metadata_path = self.root.join(sidecar_path(&key));

        Self::write(&path, &object.bytes).await?;
        Self::write(&metadata_path, object.metadata.to_yaml()?.as_bytes()).await?;
        debug!("Exported {} bytes to {}", object.bytes.len(), path.display());

        Ok(UploadReceipt {
            location: path.display().to_string(),
            metadata_location: metadata_path.display().to_string(),
            bytes: object.bytes.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Datatype, DatatypeRegistry, ExtractionOptions, GlobalConfig};
    use crate::extract::Extraction;
    use crate::metadata::MetadataBuilder;
    use crate::planner::ExecutionUnit;
    use crate::utils::hash::sha256_bytes;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_export_layout() {
        let out = TempDir::new().unwrap();
        let exporter = LocalExporter::new(out.path(), "test");

        let builder = MetadataBuilder::new(&GlobalConfig::default(), DatatypeRegistry::standard()).unwrap();
        let unit = ExecutionUnit::new(
            "/scratch/drogon/realization-1/iter-0/eclipse/model/DROGON-1.DATA",
            Datatype::Summary,
            ExtractionOptions::new(),
        );
        let object = builder
            .build(&unit, &Extraction::csv(b"DATE,FOPT\n".to_vec()))
            .unwrap();

        let receipt = exporter.upload(&object).await.unwrap();
        let expected = out
            .path()
            .join("test/drogon/realization-1/iter-0/share/results/tables/DROGON--summary.csv");
        assert_eq!(receipt.location, expected.display().to_string());
        assert_eq!(receipt.bytes, 10);
        assert_eq!(
            sha256_bytes(&std::fs::read(&expected).unwrap()),
            object.metadata.file.checksum_sha256
        );

        let sidecar = expected.with_file_name(".DROGON--summary.csv.yml");
        let metadata = std::fs::read_to_string(sidecar).unwrap();
        assert!(metadata.contains("tagname: summary"));
        assert!(metadata.contains("content: timeseries"));
    }
}
