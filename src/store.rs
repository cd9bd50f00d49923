use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;

use crate::config::SpacesConfig;

/// Key-addressed object storage. The rest of the crate only ever needs
/// get/put-by-key, so the S3 client stays behind this seam and tests can
/// substitute an in-memory map.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Vec<u8>>;
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()>;
}

/// S3-compatible store (DigitalOcean Spaces in the deployed setup).
pub struct SpacesStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl SpacesStore {
    pub fn new(cfg: &SpacesConfig) -> Self {
        let credentials = Credentials::new(
            cfg.access_key.clone(),
            cfg.secret_key.clone(),
            None,
            None,
            "spaces-env",
        );
        let s3_cfg = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .endpoint_url(cfg.endpoint.clone())
            .credentials_provider(credentials)
            .build();
        Self {
            client: aws_sdk_s3::Client::from_conf(s3_cfg),
            bucket: cfg.bucket.clone(),
        }
    }
}

#[async_trait]
impl BlobStore for SpacesStore {
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let out = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("failed to fetch object {key}"))?;
        let data = out
            .body
            .collect()
            .await
            .with_context(|| format!("failed to read body of object {key}"))?;
        Ok(data.into_bytes().to_vec())
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .with_context(|| format!("failed to upload object {key}"))?;
        Ok(())
    }
}
