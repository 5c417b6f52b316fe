//! S3 store implementation
//! Implements the ObjectStore trait over the signed path-style client.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{StreamExt, TryStreamExt};

use crate::config::S3StorageConfig;
use crate::error::Result;
use crate::storage::s3::client::Client;
use crate::storage::{ByteStream, ObjectStore};

/// S3-compatible object store (MinIO in the reference deployment)
pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub fn new(config: &S3StorageConfig) -> Self {
        let client = Client::new(
            &config.endpoint,
            &config.bucket,
            &config.access_key,
            &config.secret_key,
        );
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, key: &str, data: Bytes) -> Result<()> {
        // Guess content type from the key
        let content_type = mime_guess::from_path(key).first_or_octet_stream().to_string();
        self.client.put_object(key, data, &content_type).await
    }

    async fn get(&self, key: &str) -> Result<ByteStream> {
        let resp = self.client.get_object(key).await?;
        let stream = resp
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));
        Ok(stream.boxed())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.client.head_object(key).await
    }

    async fn ensure_ready(&self) -> Result<()> {
        self.client.ensure_bucket().await
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}
