//! File handlers.

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::file::UploadHandle;
use crate::web::dto::{ApiResponse, FileEnvelope, FileListEnvelope};
use crate::web::error::{ApiError, ErrorBody};
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// Content type assumed for a multipart part that does not declare one.
const DEFAULT_PART_CONTENT_TYPE: &str = "application/octet-stream";

/// GET /api/v1/files - List the caller's files.
#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    responses(
        (status = 200, description = "Files owned by the caller", body = FileListEnvelope),
        (status = 401, description = "Unauthorized", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<FileListEnvelope>, ApiError> {
    let files = state.files.list_files(user.owner_id).await?;

    Ok(Json(ApiResponse::new(files)))
}

/// GET /api/v1/files/:id - Download the bytes of one of the caller's files.
#[utoipa::path(
    get,
    path = "/files/{id}",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "File not found", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn read_file(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(file_id): Path<i64>,
) -> Result<Response<Body>, ApiError> {
    let content = state.files.read_file(file_id, user.owner_id).await?;

    let response = Response::builder()
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, content.len())
        .body(Body::from(content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })?;

    Ok(response)
}

/// POST /api/v1/files - Upload a file.
///
/// Request body: multipart/form-data with a "file" field.
#[utoipa::path(
    post,
    path = "/files",
    tag = "files",
    request_body(content = Vec<u8>, content_type = "multipart/form-data", description = "A single `file` part"),
    responses(
        (status = 201, description = "File uploaded", body = FileEnvelope),
        (status = 400, description = "Missing file, bad size or unsupported type", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut upload: Option<UploadHandle> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::debug!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_PART_CONTENT_TYPE)
            .to_string();
        let content = field.bytes().await.map_err(|e| {
            tracing::debug!("Failed to read file content: {}", e);
            ApiError::bad_request("Failed to read file")
        })?;

        upload = Some(UploadHandle::from_bytes(
            file_name,
            content_type,
            content.to_vec(),
        ));
        break;
    }

    let summary = state.files.upload_file(user.owner_id, upload).await?;
    let location = format!("/api/v1/files/{}", summary.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json::<FileEnvelope>(ApiResponse::new(summary)),
    )
        .into_response())
}
