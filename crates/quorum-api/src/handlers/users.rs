//! User provisioning and lookup handlers

use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, warn};

use crate::dto::{CreateUserQuery, CreateUserResponse, WelcomeQuery};
use crate::handlers::error_to_response;
use crate::state::AppState;
use crate::validation::validate_email;
use quorum_core::{AccessRecord, DirectoryAccount, ObjectId};

/// Run the full invitation workflow for an email and permission request.
///
/// Returns the created account, access record, invite, and invite URL; any
/// workflow-stage failure is a 400 with the stage's reason. Earlier stages
/// are not rolled back, so a failed call can leave a provisioned account
/// behind (surfaced in the reason string).
pub async fn create_user(
    State(state): State<AppState>,
    Query(query): Query<CreateUserQuery>,
) -> Result<Json<CreateUserResponse>, (StatusCode, String)> {
    validate_email(&query.email).map_err(|e| error_to_response(&e))?;

    info!(email = %query.email, "Creating user and issuing invitation");

    let outcome = state
        .workflow
        .create_and_invite(&query.email, &query.permission)
        .await
        .map_err(|e| {
            warn!(email = %query.email, "Invitation workflow failed: {}", e);
            error_to_response(&e)
        })?;

    Ok(Json(outcome.into()))
}

/// Fetch a directory account by its object id.
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DirectoryAccount>, (StatusCode, String)> {
    let account = state
        .directory
        .get_by_id(&id)
        .await
        .map_err(|e| error_to_response(&e))?;

    match account {
        Some(account) => Ok(Json(account)),
        None => Err((StatusCode::NOT_FOUND, "User not found".to_string())),
    }
}

/// Fetch the access record for a directory account.
pub async fn get_user_auth(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AccessRecord>, (StatusCode, String)> {
    // A malformed id cannot key a record; indistinguishable from absent.
    let object_id = ObjectId::from_str(&id)
        .map_err(|_| (StatusCode::NOT_FOUND, "Access record not found".to_string()))?;

    let record = state
        .access
        .get(object_id)
        .await
        .map_err(|e| error_to_response(&e))?;

    match record {
        Some(record) => Ok(Json(record)),
        None => Err((
            StatusCode::NOT_FOUND,
            "Access record not found".to_string(),
        )),
    }
}

/// Send the welcome email. Guarded by a shared-secret query parameter; this
/// is placeholder auth for an internal hook, not a user-facing surface.
pub async fn welcome(
    State(state): State<AppState>,
    Query(query): Query<WelcomeQuery>,
) -> Result<StatusCode, (StatusCode, String)> {
    if query.key != state.welcome_key {
        return Err((StatusCode::UNAUTHORIZED, "Invalid key".to_string()));
    }

    validate_email(&query.email).map_err(|e| error_to_response(&e))?;

    state
        .workflow
        .send_welcome(&query.email)
        .await
        .map_err(|e| {
            warn!(email = %query.email, "Welcome email failed: {}", e);
            error_to_response(&e)
        })?;

    Ok(StatusCode::OK)
}
