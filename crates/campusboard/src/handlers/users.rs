//! Profile handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use campusboard_core::forum::{CreateProfileRequest, ProfilePatch, UserProfile};
use campusboard_core::storage::Id;

use crate::{handlers::AppError, state::AppState};

/// Register a profile (POST /api/users).
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let profile = state.forum.repository.put_profile(payload).await?;

    tracing::info!(user_id = %profile.user_id, username = %profile.username, "Created profile");

    Ok((StatusCode::CREATED, Json(profile)))
}

/// Get a profile (GET /api/users/{user_id}).
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Id>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = state.forum.repository.get_profile(&user_id).await?;
    Ok(Json(profile))
}

/// Update some profile fields (PATCH /api/users/{user_id}).
pub async fn patch_user(
    State(state): State<AppState>,
    Path(user_id): Path<Id>,
    Json(patch): Json<ProfilePatch>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = state.forum.repository.patch_profile(&user_id, patch).await?;

    tracing::info!(user_id = %user_id, "Updated profile");

    Ok(Json(profile))
}
