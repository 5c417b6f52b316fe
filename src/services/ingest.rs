use bytes::Bytes;
use uuid::Uuid;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{FileRecord, PDF_MEDIA_TYPE};
use crate::storage::ObjectStore;

/// Ingest coordinator
pub struct IngestService;

impl IngestService {
    /// Accept a PDF upload.
    ///
    /// The blob is written before the metadata row: an orphaned blob is
    /// invisible to clients, while a record without a blob would break
    /// retrieval.
    pub async fn ingest(
        db: &Database,
        store: &dyn ObjectStore,
        content: Bytes,
        media_type: &str,
        original_name: &str,
    ) -> Result<FileRecord> {
        // Validate before any storage write
        if !media_type.eq_ignore_ascii_case(PDF_MEDIA_TYPE) {
            return Err(AppError::InvalidMediaType(format!(
                "Only {} uploads are accepted",
                PDF_MEDIA_TYPE
            )));
        }
        if content.is_empty() {
            return Err(AppError::BadRequest("Empty file".to_string()));
        }
        if original_name.is_empty() {
            return Err(AppError::BadRequest("No file name provided".to_string()));
        }

        let id = Uuid::new_v4().to_string();
        // The key derives from the id alone, so the mapping is recoverable
        // even if metadata is lost.
        let stored_key = format!("{}.pdf", id);
        let size = content.len() as i64;

        store
            .put(&stored_key, content)
            .await
            .map_err(|e| AppError::StorageUnavailable(format!("Blob write failed: {}", e)))?;

        // The blob is durable from here on; a failed insert leaves it
        // orphaned. Clients never see it and cleanup is out of band.
        if let Err(e) = sqlx::query(
            "INSERT INTO uploaded_files (id, stored_key, original_name, size) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&stored_key)
        .bind(original_name)
        .bind(size)
        .execute(db.pool())
        .await
        {
            tracing::warn!("Orphaned blob {} after failed metadata insert", stored_key);
            return Err(AppError::IngestFailed(format!(
                "Metadata insert failed: {}",
                e
            )));
        }

        // Read the row back for the store-assigned created_at
        let record: FileRecord = sqlx::query_as("SELECT * FROM uploaded_files WHERE id = ?")
            .bind(&id)
            .fetch_one(db.pool())
            .await?;

        tracing::info!(
            "Ingested {} as {} ({} bytes)",
            record.original_name,
            record.id,
            record.size
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{ListingService, RetrieveService};
    use crate::storage::{ByteStream, LocalStore};
    use futures_util::StreamExt;
    use tempfile::TempDir;

    async fn test_db(dir: &TempDir) -> Database {
        let path = dir.path().join("test.db");
        let db = Database::new(path.to_str().unwrap()).await.unwrap();
        db.run_migrations().await.unwrap();
        db
    }

    fn test_store(dir: &TempDir) -> LocalStore {
        LocalStore::new(dir.path().join("blobs"))
    }

    async fn collect(mut stream: ByteStream) -> Vec<u8> {
        let mut buf = Vec::new();
        while let Some(chunk) = stream.next().await {
            buf.extend_from_slice(&chunk.unwrap());
        }
        buf
    }

    #[tokio::test]
    async fn ingest_then_retrieve_round_trip() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir).await;
        let store = test_store(&dir);

        let content = Bytes::from_static(b"%PDF-1.4 x");
        assert_eq!(content.len(), 10);

        let record =
            IngestService::ingest(&db, &store, content.clone(), "application/pdf", "a.pdf")
                .await
                .unwrap();
        assert_eq!(record.size, 10);
        assert_eq!(record.original_name, "a.pdf");
        assert_eq!(record.stored_key, format!("{}.pdf", record.id));
        assert!(!record.created_at.is_empty());

        let (found, stream) = RetrieveService::retrieve(&db, &store, &record.id)
            .await
            .unwrap();
        assert_eq!(found.id, record.id);
        assert_eq!(collect(stream).await, content.to_vec());

        let listed = ListingService::list_all(&db).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, record.id);
    }

    #[tokio::test]
    async fn non_pdf_media_type_is_rejected_before_any_write() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir).await;
        let store = test_store(&dir);

        let err = IngestService::ingest(
            &db,
            &store,
            Bytes::from_static(b"not a pdf"),
            "image/png",
            "a.png",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidMediaType(_)));

        // Neither store was touched
        assert!(ListingService::list_all(&db).await.unwrap().is_empty());
        assert!(!dir.path().join("blobs").exists());
    }

    #[tokio::test]
    async fn media_type_check_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir).await;
        let store = test_store(&dir);

        let record = IngestService::ingest(
            &db,
            &store,
            Bytes::from_static(b"%PDF-1.4"),
            "Application/PDF",
            "a.pdf",
        )
        .await
        .unwrap();
        assert_eq!(record.size, 8);
    }

    #[tokio::test]
    async fn empty_content_is_rejected() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir).await;
        let store = test_store(&dir);

        let err = IngestService::ingest(&db, &store, Bytes::new(), "application/pdf", "a.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir).await;
        let store = test_store(&dir);

        let err = IngestService::ingest(
            &db,
            &store,
            Bytes::from_static(b"%PDF-1.4"),
            "application/pdf",
            "",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn blob_write_failure_leaves_no_record() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir).await;

        // A base path that is a regular file makes every put fail
        let blocked = dir.path().join("not-a-dir");
        std::fs::write(&blocked, b"x").unwrap();
        let store = LocalStore::new(&blocked);

        let err = IngestService::ingest(
            &db,
            &store,
            Bytes::from_static(b"%PDF-1.4"),
            "application/pdf",
            "a.pdf",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::StorageUnavailable(_)));

        // Metadata was never touched, so the whole ingest is retryable
        assert!(ListingService::list_all(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn metadata_failure_leaves_orphan_blob() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir).await;
        let store = test_store(&dir);

        // Every insert fails once the pool is closed
        db.pool().close().await;

        let err = IngestService::ingest(
            &db,
            &store,
            Bytes::from_static(b"%PDF-1.4"),
            "application/pdf",
            "a.pdf",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::IngestFailed(_)));

        // The blob stayed behind as an orphan
        let orphans: Vec<_> = std::fs::read_dir(dir.path().join("blobs"))
            .unwrap()
            .collect();
        assert_eq!(orphans.len(), 1);
    }
}
