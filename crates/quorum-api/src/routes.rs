//! API route definitions

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Create the full API router with application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health_check))
        .route("/health/live", get(handlers::liveness))
        .route("/health/ready", get(handlers::readiness))
        // Invitation and provisioning endpoints
        .nest("/auth", auth_routes())
        .with_state(state)
}

/// Invitation and provisioning routes
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/user", post(handlers::users::create_user))
        .route("/user/welcome", get(handlers::users::welcome))
        .route("/user/{id}", get(handlers::users::get_user))
        .route("/user/{id}/auth", get(handlers::users::get_user_auth))
        .route("/invite", get(handlers::invites::redeem_redirect))
        .route("/invites", get(handlers::invites::list_invites))
        .route("/invites/{id}", get(handlers::invites::get_invite))
        .route("/invites/{id}", put(handlers::invites::redeem_invite))
}
