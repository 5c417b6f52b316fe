use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

use crate::error::{AppError, Result};
use crate::storage::{ByteStream, ObjectStore};

/// Local file system object store
pub struct LocalStore {
    base_path: PathBuf,
}

impl LocalStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn full_path(&self, key: &str) -> PathBuf {
        self.base_path.join(key)
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn put(&self, key: &str, data: Bytes) -> Result<()> {
        let full_path = self.full_path(key);

        // Ensure parent directory exists
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write blob
        let mut file = fs::File::create(&full_path).await?;
        file.write_all(&data).await?;
        file.flush().await?;

        tracing::debug!("Saved blob to {:?}", full_path);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<ByteStream> {
        let full_path = self.full_path(key);

        let file = fs::File::open(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::NotFound(format!("Blob not found: {}", key))
            } else {
                AppError::Storage(format!("Failed to open blob: {}", e))
            }
        })?;

        Ok(ReaderStream::new(file).boxed())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.full_path(key).exists())
    }

    async fn ensure_ready(&self) -> Result<()> {
        fs::create_dir_all(&self.base_path).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn collect(mut stream: ByteStream) -> Vec<u8> {
        let mut buf = Vec::new();
        while let Some(chunk) = stream.next().await {
            buf.extend_from_slice(&chunk.unwrap());
        }
        buf
    }

    #[tokio::test]
    async fn put_then_get_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path());
        store.ensure_ready().await.unwrap();

        store
            .put("abc.pdf", Bytes::from_static(b"%PDF-1.4"))
            .await
            .unwrap();
        assert!(store.exists("abc.pdf").await.unwrap());

        let stream = store.get("abc.pdf").await.unwrap();
        assert_eq!(collect(stream).await, b"%PDF-1.4");
    }

    #[tokio::test]
    async fn get_missing_key_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path());
        store.ensure_ready().await.unwrap();

        let err = match store.get("missing.pdf").await {
            Ok(_) => panic!("expected error"),
            Err(e) => e,
        };
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(!store.exists("missing.pdf").await.unwrap());
    }

    #[tokio::test]
    async fn ensure_ready_creates_base_directory() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("nested").join("uploads");
        let store = LocalStore::new(&base);

        store.ensure_ready().await.unwrap();
        assert!(base.is_dir());
    }

    #[tokio::test]
    async fn put_overwrites_by_key() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path());
        store.ensure_ready().await.unwrap();

        store.put("k.pdf", Bytes::from_static(b"old")).await.unwrap();
        store.put("k.pdf", Bytes::from_static(b"new")).await.unwrap();

        let stream = store.get("k.pdf").await.unwrap();
        assert_eq!(collect(stream).await, b"new");
    }
}
