pub mod local;
pub mod provider;
pub mod s3;

pub use local::LocalStore;
pub use provider::{ByteStream, ObjectStore};
pub use s3::S3Store;

use std::sync::Arc;

use crate::config::{StorageBackend, StorageConfig};

/// Build the process-wide object store for the configured backend
pub fn build_store(config: &StorageConfig) -> Arc<dyn ObjectStore> {
    match config.backend {
        StorageBackend::Local => Arc::new(LocalStore::new(&config.local_path)),
        StorageBackend::S3 => Arc::new(S3Store::new(&config.s3)),
    }
}
