use crate::db::Database;
use crate::error::Result;
use crate::models::FileRecord;

/// Listing service
pub struct ListingService;

impl ListingService {
    /// All records, most recent first. Timestamp ties fall back to insertion
    /// order (rowid is stable and monotonic).
    pub async fn list_all(db: &Database) -> Result<Vec<FileRecord>> {
        let records: Vec<FileRecord> = sqlx::query_as(
            "SELECT * FROM uploaded_files ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(db.pool())
        .await?;

        Ok(records)
    }
}
