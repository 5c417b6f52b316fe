use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;

use crate::error::Result;

/// Lazy, finite, non-restartable sequence of blob chunks.
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

/// Object store trait - opaque blobs addressed by key
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store a blob under `key`. Puts are idempotent by key.
    async fn put(&self, key: &str, data: Bytes) -> Result<()>;

    /// Open the blob at `key` for reading. `NotFound` when no blob exists.
    async fn get(&self, key: &str) -> Result<ByteStream>;

    /// Check if a blob exists
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Create the backing bucket/directory if absent. Called once at startup.
    async fn ensure_ready(&self) -> Result<()>;

    /// Get the storage backend name
    fn backend_name(&self) -> &'static str;
}
