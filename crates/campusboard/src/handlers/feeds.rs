//! Feed handlers: recent, trending and search.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use campusboard_core::forum::Post;

use crate::{handlers::AppError, state::AppState};

/// Query parameters for recent and trending feeds.
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    /// Maximum posts to return; clamped to the configured ceiling.
    pub limit: Option<usize>,
}

/// Query parameters for search.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

/// Newest posts (GET /api/recent).
pub async fn recent(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<Post>>, AppError> {
    let posts = state.forum.feeds.recent(query.limit).await?;
    Ok(Json(posts))
}

/// Most-voted posts (GET /api/trending).
pub async fn trending(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<Post>>, AppError> {
    let posts = state.forum.feeds.trending(query.limit).await?;
    Ok(Json(posts))
}

/// Posts containing `q` in title or content (GET /api/search).
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Post>>, AppError> {
    let posts = state.forum.feeds.search(&query.q, query.limit).await?;

    tracing::debug!(query = %query.q, hits = posts.len(), "Search");

    Ok(Json(posts))
}
