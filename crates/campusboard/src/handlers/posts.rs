//! Post CRUD handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use campusboard_core::forum::{feeds, CreatePostRequest, Post, PostPatch, ReplacePostRequest};
use campusboard_core::storage::Id;

use crate::{handlers::AppError, state::AppState};

/// Query parameters for deleting a post.
#[derive(Debug, Default, Deserialize)]
pub struct DeletePostQuery {
    /// Also delete every comment, vote and attachment record of the post.
    #[serde(default)]
    pub cascade: bool,
}

/// Create a post (POST /api/posts).
pub async fn create_post(
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    let post = state.forum.repository.create_post(payload).await?;

    tracing::info!(post_id = %post.post_id, author_id = %post.author_id, "Created post");

    Ok((StatusCode::CREATED, Json(post)))
}

/// List every post, newest first (GET /api/posts).
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>, AppError> {
    let posts = state.forum.repository.list_posts().await?;
    let count = posts.len();
    Ok(Json(feeds::recent(posts, count)))
}

/// Get a post (GET /api/posts/{post_id}).
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<Id>,
) -> Result<Json<Post>, AppError> {
    let post = state.forum.repository.get_post(&post_id).await?;
    Ok(Json(post))
}

/// Replace a post's editable fields (PUT /api/posts/{post_id}).
pub async fn replace_post(
    State(state): State<AppState>,
    Path(post_id): Path<Id>,
    Json(payload): Json<ReplacePostRequest>,
) -> Result<Json<Post>, AppError> {
    let post = state
        .forum
        .repository
        .replace_post(&post_id, payload)
        .await?;

    tracing::info!(post_id = %post_id, "Replaced post");

    Ok(Json(post))
}

/// Update some of a post's fields (PATCH /api/posts/{post_id}).
pub async fn patch_post(
    State(state): State<AppState>,
    Path(post_id): Path<Id>,
    Json(patch): Json<PostPatch>,
) -> Result<Json<Post>, AppError> {
    let post = state.forum.repository.patch_post(&post_id, patch).await?;

    tracing::info!(post_id = %post_id, "Updated post");

    Ok(Json(post))
}

/// Delete a post (DELETE /api/posts/{post_id}).
///
/// Without `?cascade=true` only the post record goes; its comments, votes and
/// attachments stay under the post's partition.
pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<Id>,
    Query(query): Query<DeletePostQuery>,
) -> Result<impl IntoResponse, AppError> {
    if query.cascade {
        let removed = state
            .forum
            .repository
            .delete_post_cascade(&post_id)
            .await?;
        tracing::info!(post_id = %post_id, removed, "Deleted post and its children");
        return Ok(Json(json!({ "deleted": post_id, "removed": removed })));
    }

    state.forum.repository.delete_post(&post_id).await?;

    tracing::info!(post_id = %post_id, "Deleted post");

    Ok(Json(json!({ "deleted": post_id })))
}
