//! MinIO / S3-compatible object storage client.
//!
//! Wraps `aws-sdk-s3` to provide upload, presigned URL generation, and
//! deletion for listing photos, profile pictures, and verification
//! documents.

use anyhow::{Context, Result};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::{
    Client,
    config::{Builder as S3Builder, Credentials, Region},
    primitives::ByteStream,
};
use std::time::Duration;

/// How long presigned document/photo URLs stay valid.
pub const PRESIGN_TTL_SECS: u64 = 3600;

/// S3/MinIO storage client — wraps the AWS SDK.
#[derive(Clone)]
pub struct StorageClient {
    inner: Client,
    bucket: String,
}

impl StorageClient {
    /// Initialise client from config.
    pub fn new(cfg: &haven_common::config::StorageConfig) -> Result<Self> {
        let creds = Credentials::new(
            &cfg.access_key,
            &cfg.secret_key,
            None, // session token
            None, // expiry
            "haven-storage",
        );

        let s3_cfg = S3Builder::new()
            .endpoint_url(&cfg.endpoint)
            .credentials_provider(creds)
            .region(Region::new(cfg.region.clone()))
            // Force path-style URLs (required for MinIO)
            .force_path_style(true)
            .build();

        Ok(Self {
            inner: Client::from_conf(s3_cfg),
            bucket: cfg.bucket.clone(),
        })
    }

    /// Upload bytes to the given key. Returns the storage key on success.
    pub async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        let stream = ByteStream::from(data);

        self.inner
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(stream)
            .send()
            .await
            .with_context(|| format!("Failed to upload {key} to object storage"))?;

        Ok(key.to_string())
    }

    /// Generate a presigned GET URL valid for `expiry_secs` seconds.
    pub async fn presigned_get_url(&self, key: &str, expiry_secs: u64) -> Result<String> {
        let presigning_cfg = PresigningConfig::expires_in(Duration::from_secs(expiry_secs))
            .context("Failed to build presigning config")?;

        let req = self
            .inner
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning_cfg)
            .await
            .with_context(|| format!("Failed to create presigned URL for {key}"))?;

        Ok(req.uri().to_string())
    }

    /// Delete an object by its storage key.
    pub async fn delete_object(&self, key: &str) -> Result<()> {
        self.inner
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("Failed to delete {key} from object storage"))?;

        Ok(())
    }

    /// Ensure the bucket exists; create it if absent.
    pub async fn ensure_bucket(&self) -> Result<()> {
        match self.inner.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => {
                tracing::debug!(bucket = %self.bucket, "Bucket already exists");
                Ok(())
            }
            Err(_) => {
                tracing::info!(bucket = %self.bucket, "Bucket does not exist, creating");
                self.inner
                    .create_bucket()
                    .bucket(&self.bucket)
                    .send()
                    .await
                    .context("Failed to create object storage bucket")?;
                Ok(())
            }
        }
    }
}

/// Build a storage key for an uploaded file, preserving the extension of
/// the original filename.
pub fn object_key(prefix: &str, owner: uuid::Uuid, filename: &str) -> String {
    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin");
    format!("{prefix}/{owner}/{}.{ext}", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::object_key;

    #[test]
    fn object_keys_keep_extension_and_namespace() {
        let owner = uuid::Uuid::now_v7();
        let key = object_key("properties", owner, "kitchen.JPG");
        assert!(key.starts_with(&format!("properties/{owner}/")));
        assert!(key.ends_with(".JPG"));
    }

    #[test]
    fn object_keys_fall_back_on_missing_extension() {
        let owner = uuid::Uuid::now_v7();
        let key = object_key("verifications", owner, "idcard");
        assert!(key.ends_with(".bin"));
    }
}
