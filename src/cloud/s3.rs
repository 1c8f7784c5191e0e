use std::sync::Arc;

use anyhow::{anyhow, Result};
use log::debug;
use rusoto_core::ByteStream;
use rusoto_s3::{PutObjectRequest, S3Client, S3};

use crate::cloud::client::create_s3_client;
use crate::cloud::{object_key, sidecar_path, UploadReceipt, Uploader};
use crate::constants::ERROR_FAILED_TO_UPLOAD;
use crate::metadata::SumoObject;

/// Uploads objects and their metadata sidecars to an S3 bucket.
///
/// Keys are `<env>/<case>/<relative path>`. A failed `PutObject` is reported
/// as is, without retrying.
pub struct S3Uploader {
    bucket: String,
    env: String,
    client: Arc<S3Client>,
}

impl S3Uploader {
    pub fn new(bucket: &str, env: &str, region_name: Option<&str>, profile: Option<&str>) -> Result<Self> {
        Ok(Self::with_client(bucket, env, create_s3_client(region_name, profile)?))
    }

    pub fn with_client(bucket: &str, env: &str, client: Arc<S3Client>) -> Self {
        Self {
            bucket: bucket.to_string(),
            env: env.to_string(),
            client,
        }
    }

    async fn put_object(&self, key: &str, contents: Vec<u8>, content_type: &str) -> Result<()> {
        let request = PutObjectRequest {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            content_length: Some(contents.len() as i64),
            content_type: Some(content_type.to_string()),
            body: Some(ByteStream::from(contents)),
            ..Default::default()
        };

        self.client
            .put_object(request)
            .await
            .map_err(|e| anyhow!("{} s3://{}/{}: {}", ERROR_FAILED_TO_UPLOAD, self.bucket, key, e))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Uploader for S3Uploader {
    fn target_name(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.env)
    }

    async fn upload(&self, object: &SumoObject) -> Result<UploadReceipt> {
        let key = object_key(&self.env, object);
        let metadata_key = sidecar_path(&key);
        let metadata = object.metadata.to_yaml()?;

        debug!(
            "Uploading {} bytes to s3://{}/{}",
            object.bytes.len(),
            self.bucket,
            key
        );
        self.put_object(&key, object.bytes.clone(), content_type(&object.metadata.format))
            .await?;
        self.put_object(&metadata_key, metadata.into_bytes(), "application/x-yaml")
            .await?;

        Ok(UploadReceipt {
            location: format!("s3://{}/{}", self.bucket, key),
            metadata_location: format!("s3://{}/{}", self.bucket, metadata_key),
            bytes: object.bytes.len() as u64,
        })
    }
}

fn content_type(format: &str) -> &'static str {
    match format {
        "arrow" => "application/vnd.apache.arrow.file",
        _ => "text/csv",
    }
}
