use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use bytes::Bytes;

use crate::error::{ApiResponse, AppError, Result};
use crate::models::{FileListResponse, FileRecordResponse, PDF_MEDIA_TYPE};
use crate::services::{IngestService, ListingService, RetrieveService};
use crate::AppState;

/// Upload a PDF
/// POST /api/v1/files/upload
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<FileRecordResponse>>> {
    let mut content: Option<Bytes> = None;
    let mut media_type: Option<String> = None;
    let mut original_name: Option<String> = None;

    // Process multipart fields
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(format!("Failed to process multipart: {}", e))
    })? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "pdf" => {
                original_name = field.file_name().map(|s| s.to_string());
                media_type = field.content_type().map(|s| s.to_string());
                content = Some(field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read file: {}", e))
                })?);
            }
            _ => {}
        }
    }

    let content = content.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;
    let original_name =
        original_name.ok_or_else(|| AppError::BadRequest("No file name provided".to_string()))?;
    let media_type = media_type.unwrap_or_default();

    let record = IngestService::ingest(
        &state.db,
        state.store.as_ref(),
        content,
        &media_type,
        &original_name,
    )
    .await?;

    Ok(Json(ApiResponse::success(FileRecordResponse::from(record))))
}

/// List uploaded files, most recent first
/// GET /api/v1/files
pub async fn list_files(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<FileListResponse>>> {
    let records = ListingService::list_all(&state.db).await?;

    Ok(Json(ApiResponse::success(FileListResponse {
        files: records.into_iter().map(FileRecordResponse::from).collect(),
    })))
}

/// Get file metadata
/// GET /api/v1/files/:id
pub async fn get_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FileRecordResponse>>> {
    let record = RetrieveService::record_by_id(&state.db, &id).await?;
    Ok(Json(ApiResponse::success(FileRecordResponse::from(record))))
}

/// Download a file
/// GET /api/v1/files/:id/download
pub async fn download_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let (record, stream) =
        RetrieveService::retrieve(&state.db, state.store.as_ref(), &id).await?;

    let fallback_name = record.original_name.replace(['"', '\\'], "_");
    let encoded_name = urlencoding::encode(&record.original_name);

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, PDF_MEDIA_TYPE)
        .header(header::CONTENT_LENGTH, record.size)
        .header(
            header::CONTENT_DISPOSITION,
            format!(
                "inline; filename=\"{}\"; filename*=UTF-8''{}",
                fallback_name, encoded_name
            ),
        )
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}
