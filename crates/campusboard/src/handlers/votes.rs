//! Vote handlers.
//!
//! A cast whose counter update failed still answers 200, with
//! `"degraded": true` in the body.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use campusboard_core::forum::{RetractVoteRequest, VoteRequest, VoteTarget};
use campusboard_core::storage::Id;

use crate::{
    forum::{ReconcileReport, VoteOutcome},
    handlers::AppError,
    state::AppState,
};

/// Query parameters for reconciling counters.
#[derive(Debug, Default, Deserialize)]
pub struct ReconcileQuery {
    /// Recount one comment of the post instead of the post itself.
    pub comment_id: Option<Id>,
}

async fn cast(
    state: &AppState,
    target: VoteTarget,
    payload: VoteRequest,
) -> Result<Json<VoteOutcome>, AppError> {
    let outcome = state
        .forum
        .votes
        .cast(&target, &payload.user_id, payload.vote_type)
        .await?;

    tracing::info!(
        target_ref = %target,
        user_id = %payload.user_id,
        vote_type = payload.vote_type.as_str(),
        changed = outcome.changed,
        degraded = outcome.degraded,
        "Vote cast"
    );

    Ok(Json(outcome))
}

async fn retract(
    state: &AppState,
    target: VoteTarget,
    payload: RetractVoteRequest,
) -> Result<Json<VoteOutcome>, AppError> {
    let outcome = state
        .forum
        .votes
        .retract(&target, &payload.user_id, payload.vote_type)
        .await?;

    tracing::info!(
        target_ref = %target,
        user_id = %payload.user_id,
        changed = outcome.changed,
        degraded = outcome.degraded,
        "Vote retracted"
    );

    Ok(Json(outcome))
}

/// Vote on a post (POST /api/posts/{post_id}/vote).
pub async fn vote_post(
    State(state): State<AppState>,
    Path(post_id): Path<Id>,
    Json(payload): Json<VoteRequest>,
) -> Result<Json<VoteOutcome>, AppError> {
    cast(&state, VoteTarget::Post { post_id }, payload).await
}

/// Retract a post vote (DELETE /api/posts/{post_id}/vote).
pub async fn retract_post_vote(
    State(state): State<AppState>,
    Path(post_id): Path<Id>,
    Json(payload): Json<RetractVoteRequest>,
) -> Result<Json<VoteOutcome>, AppError> {
    retract(&state, VoteTarget::Post { post_id }, payload).await
}

/// Vote on a comment (POST /api/posts/{post_id}/comments/{comment_id}/vote).
pub async fn vote_comment(
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(Id, Id)>,
    Json(payload): Json<VoteRequest>,
) -> Result<Json<VoteOutcome>, AppError> {
    let target = VoteTarget::Comment {
        post_id,
        comment_id,
    };
    cast(&state, target, payload).await
}

/// Retract a comment vote (DELETE /api/posts/{post_id}/comments/{comment_id}/vote).
pub async fn retract_comment_vote(
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(Id, Id)>,
    Json(payload): Json<RetractVoteRequest>,
) -> Result<Json<VoteOutcome>, AppError> {
    let target = VoteTarget::Comment {
        post_id,
        comment_id,
    };
    retract(&state, target, payload).await
}

/// Recount votes and fix drifted counters (POST /api/posts/{post_id}/reconcile).
pub async fn reconcile(
    State(state): State<AppState>,
    Path(post_id): Path<Id>,
    Query(query): Query<ReconcileQuery>,
) -> Result<Json<ReconcileReport>, AppError> {
    let target = match query.comment_id {
        None => VoteTarget::Post { post_id },
        Some(comment_id) => VoteTarget::Comment {
            post_id,
            comment_id,
        },
    };
    let report = state.forum.votes.reconcile(&target).await?;
    Ok(Json(report))
}
