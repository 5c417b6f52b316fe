use serde::Serialize;
use sqlx::FromRow;

/// The only media type the service accepts or serves.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// File record model - one row per successful upload, never mutated
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FileRecord {
    pub id: String,
    /// Object-store key, derived from `id` so the mapping survives metadata loss
    pub stored_key: String,
    pub original_name: String,
    pub size: i64,
    pub created_at: String,
}

/// File record as exposed at the API boundary
#[derive(Debug, Clone, Serialize)]
pub struct FileRecordResponse {
    pub id: String,
    pub name: String,
    pub size: i64,
    pub created_at: String,
}

impl From<FileRecord> for FileRecordResponse {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id,
            name: record.original_name,
            size: record.size,
            created_at: record.created_at,
        }
    }
}

/// File list response
#[derive(Debug, Serialize)]
pub struct FileListResponse {
    pub files: Vec<FileRecordResponse>,
}
