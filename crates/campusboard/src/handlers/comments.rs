//! Comment CRUD handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use campusboard_core::forum::{
    Comment, CommentPatch, CreateCommentRequest, ReplaceCommentRequest,
};
use campusboard_core::storage::Id;

use crate::{handlers::AppError, state::AppState};

/// Add a comment to a post (POST /api/posts/{post_id}/comments).
pub async fn create_comment(
    State(state): State<AppState>,
    Path(post_id): Path<Id>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let comment = state
        .forum
        .repository
        .create_comment(&post_id, payload)
        .await?;

    tracing::info!(post_id = %post_id, comment_id = %comment.comment_id, "Created comment");

    Ok((StatusCode::CREATED, Json(comment)))
}

/// List a post's comments (GET /api/posts/{post_id}/comments).
pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<Id>,
) -> Result<Json<Vec<Comment>>, AppError> {
    let comments = state.forum.repository.list_comments(&post_id).await?;
    Ok(Json(comments))
}

/// Get a comment (GET /api/posts/{post_id}/comments/{comment_id}).
pub async fn get_comment(
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(Id, Id)>,
) -> Result<Json<Comment>, AppError> {
    let comment = state
        .forum
        .repository
        .get_comment(&post_id, &comment_id)
        .await?;
    Ok(Json(comment))
}

/// Replace a comment's content (PUT /api/posts/{post_id}/comments/{comment_id}).
pub async fn replace_comment(
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(Id, Id)>,
    Json(payload): Json<ReplaceCommentRequest>,
) -> Result<Json<Comment>, AppError> {
    let comment = state
        .forum
        .repository
        .replace_comment(&post_id, &comment_id, payload)
        .await?;

    tracing::info!(post_id = %post_id, comment_id = %comment_id, "Replaced comment");

    Ok(Json(comment))
}

/// Update some comment fields (PATCH /api/posts/{post_id}/comments/{comment_id}).
pub async fn patch_comment(
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(Id, Id)>,
    Json(patch): Json<CommentPatch>,
) -> Result<Json<Comment>, AppError> {
    let comment = state
        .forum
        .repository
        .patch_comment(&post_id, &comment_id, patch)
        .await?;

    tracing::info!(post_id = %post_id, comment_id = %comment_id, "Updated comment");

    Ok(Json(comment))
}

/// Delete a comment (DELETE /api/posts/{post_id}/comments/{comment_id}).
pub async fn delete_comment(
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(Id, Id)>,
) -> Result<StatusCode, AppError> {
    state
        .forum
        .repository
        .delete_comment(&post_id, &comment_id)
        .await?;

    tracing::info!(post_id = %post_id, comment_id = %comment_id, "Deleted comment");

    Ok(StatusCode::NO_CONTENT)
}
