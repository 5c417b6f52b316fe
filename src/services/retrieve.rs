use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::FileRecord;
use crate::storage::{ByteStream, ObjectStore};

/// Retrieval service
pub struct RetrieveService;

impl RetrieveService {
    /// Look up a record by id
    pub async fn record_by_id(db: &Database, id: &str) -> Result<FileRecord> {
        let record: FileRecord = sqlx::query_as("SELECT * FROM uploaded_files WHERE id = ?")
            .bind(id)
            .fetch_optional(db.pool())
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        Ok(record)
    }

    /// Resolve a record to its blob and open it for streaming.
    ///
    /// A record whose blob is gone surfaces as `InconsistentState`, never as
    /// `NotFound`: "never existed" and "content missing" must stay
    /// distinguishable.
    pub async fn retrieve(
        db: &Database,
        store: &dyn ObjectStore,
        id: &str,
    ) -> Result<(FileRecord, ByteStream)> {
        let record = Self::record_by_id(db, id).await?;

        let stream = store.get(&record.stored_key).await.map_err(|e| match e {
            AppError::NotFound(_) => AppError::InconsistentState(format!(
                "Record {} exists but blob {} is missing",
                record.id, record.stored_key
            )),
            other => other,
        })?;

        Ok((record, stream))
    }
}
