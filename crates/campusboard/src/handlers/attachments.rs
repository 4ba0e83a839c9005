//! Attachment handlers.
//!
//! Uploads are `multipart/form-data` with a `file` part (its filename and
//! content type are taken from the part headers) and an `uploaded_by` text
//! part.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use campusboard_core::forum::{Attachment, AttachmentUpload};
use campusboard_core::storage::{Id, RepositoryError};

use crate::{forum::UnbindOutcome, handlers::AppError, state::AppState};

fn multipart_error(err: MultipartError, limit: u64) -> RepositoryError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        RepositoryError::TooLarge { size: limit + 1, limit }
    } else {
        RepositoryError::InvalidData(format!("malformed upload: {}", err.body_text()))
    }
}

/// Upload a file and attach it to a post (POST /api/posts/{post_id}/files).
pub async fn upload_file(
    State(state): State<AppState>,
    Path(post_id): Path<Id>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let limit = state.forum.attachments.max_bytes();
    let mut file: Option<(String, Option<String>, Vec<u8>)> = None;
    let mut uploaded_by: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, limit))?;
                file = Some((filename, content_type, bytes.to_vec()));
            }
            "uploaded_by" => {
                uploaded_by = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| multipart_error(e, limit))?,
                );
            }
            _ => {
                // Skip unknown fields
                continue;
            }
        }
    }

    let (filename, content_type, bytes) = file.ok_or_else(|| {
        RepositoryError::InvalidData("upload is missing the 'file' part".to_string())
    })?;
    let uploaded_by = uploaded_by.ok_or_else(|| {
        RepositoryError::InvalidData("upload is missing the 'uploaded_by' part".to_string())
    })?;
    let uploaded_by = Id::parse(uploaded_by.trim()).map_err(RepositoryError::from)?;

    let attachment = state
        .forum
        .attachments
        .upload(
            &post_id,
            AttachmentUpload {
                filename,
                content_type,
                bytes,
                uploaded_by,
            },
        )
        .await?;

    tracing::info!(
        post_id = %post_id,
        file_id = %attachment.file_id,
        size = attachment.size,
        "Uploaded attachment"
    );

    Ok((StatusCode::CREATED, Json(attachment)))
}

/// List a post's attachments (GET /api/posts/{post_id}/files).
pub async fn list_files(
    State(state): State<AppState>,
    Path(post_id): Path<Id>,
) -> Result<Json<Vec<Attachment>>, AppError> {
    let files = state.forum.attachments.list(&post_id).await?;
    Ok(Json(files))
}

/// Get one attachment's metadata (GET /api/posts/{post_id}/files/{file_id}).
pub async fn get_file(
    State(state): State<AppState>,
    Path((post_id, file_id)): Path<(Id, Id)>,
) -> Result<Json<Attachment>, AppError> {
    let file = state.forum.attachments.get(&post_id, &file_id).await?;
    Ok(Json(file))
}

/// Remove an attachment and its bytes (DELETE /api/posts/{post_id}/files/{file_id}).
pub async fn delete_file(
    State(state): State<AppState>,
    Path((post_id, file_id)): Path<(Id, Id)>,
) -> Result<Json<UnbindOutcome>, AppError> {
    let outcome = state.forum.attachments.unbind(&post_id, &file_id).await?;

    tracing::info!(
        post_id = %post_id,
        file_id = %file_id,
        removed = outcome.removed.is_some(),
        degraded = outcome.degraded,
        "Deleted attachment"
    );

    Ok(Json(outcome))
}
