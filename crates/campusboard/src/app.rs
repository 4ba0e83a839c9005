use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method, StatusCode},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    handlers::{
        attachments::{delete_file, get_file, list_files, upload_file},
        comments::{
            create_comment, delete_comment, get_comment, list_comments, patch_comment,
            replace_comment,
        },
        feeds::{recent, search, trending},
        health::{health, livez},
        posts::{create_post, delete_post, get_post, list_posts, patch_post, replace_post},
        users::{create_user, get_user, patch_user},
        votes::{reconcile, retract_comment_vote, retract_post_vote, vote_comment, vote_post},
    },
    state::AppState,
};

/// Room for multipart framing on top of the attachment ceiling.
const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    // CORS configuration for API endpoints
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    let upload_limit = state
        .config
        .max_attachment_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let upload_limit = usize::try_from(upload_limit).unwrap_or(usize::MAX);

    // API routes with CORS
    let api_routes = Router::new()
        .route("/health", get(health))
        // Profile routes
        .route("/users", post(create_user))
        .route("/users/{user_id}", get(get_user).patch(patch_user))
        // Post routes
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/{post_id}",
            get(get_post)
                .put(replace_post)
                .patch(patch_post)
                .delete(delete_post),
        )
        // Comment routes
        .route(
            "/posts/{post_id}/comments",
            get(list_comments).post(create_comment),
        )
        .route(
            "/posts/{post_id}/comments/{comment_id}",
            get(get_comment)
                .put(replace_comment)
                .patch(patch_comment)
                .delete(delete_comment),
        )
        // Vote routes
        .route(
            "/posts/{post_id}/vote",
            post(vote_post).delete(retract_post_vote),
        )
        .route(
            "/posts/{post_id}/comments/{comment_id}/vote",
            post(vote_comment).delete(retract_comment_vote),
        )
        .route("/posts/{post_id}/reconcile", post(reconcile))
        // Attachment routes
        .route(
            "/posts/{post_id}/files",
            get(list_files)
                .post(upload_file)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/posts/{post_id}/files/{file_id}",
            get(get_file).delete(delete_file),
        )
        // Feed routes
        .route("/recent", get(recent))
        .route("/trending", get(trending))
        .route("/search", get(search))
        .layer(cors);

    let timeout = state.config.request_timeout();

    // Main application router
    Router::new()
        .route("/livez", get(livez))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .with_state(state)
}
