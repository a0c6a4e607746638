//! Invite listing, lookup, and redemption handlers

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    Json,
};
use tracing::info;

use crate::dto::RedeemQuery;
use crate::handlers::error_to_response;
use crate::state::AppState;
use quorum_core::{Invite, InviteId};

/// List all unredeemed invites (including expired ones, which remain listed
/// until redeemed or purged out of band).
pub async fn list_invites(
    State(state): State<AppState>,
) -> Result<Json<Vec<Invite>>, (StatusCode, String)> {
    let invites = state
        .invites
        .list_unredeemed()
        .await
        .map_err(|e| error_to_response(&e))?;

    Ok(Json(invites))
}

/// Fetch a currently-valid invite. Expired, redeemed, and nonexistent
/// invites all answer 404.
pub async fn get_invite(
    State(state): State<AppState>,
    Path(id): Path<InviteId>,
) -> Result<Json<Invite>, (StatusCode, String)> {
    let invite = state
        .invites
        .get_valid(id)
        .await
        .map_err(|e| error_to_response(&e))?;

    match invite {
        Some(invite) => Ok(Json(invite)),
        None => Err((StatusCode::NOT_FOUND, "Invite not found".to_string())),
    }
}

/// Redeem an invite by id. At most one of any number of concurrent attempts
/// succeeds; the rest see 404.
pub async fn redeem_invite(
    State(state): State<AppState>,
    Path(id): Path<InviteId>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .invites
        .redeem(id)
        .await
        .map_err(|e| error_to_response(&e))?;

    info!(invite_id = %id, "Invite redeemed");
    Ok(StatusCode::NO_CONTENT)
}

/// Redirect the bearer of a minted token to the provider-hosted redemption
/// page. Pure URL construction; the invite record itself is validated and
/// consumed through the store endpoints, not here.
pub async fn redeem_redirect(
    State(state): State<AppState>,
    Query(query): Query<RedeemQuery>,
) -> (StatusCode, [(header::HeaderName, String); 1]) {
    info!(email = %query.email, "Redirecting invite redemption to provider");

    let location = state.workflow.redeem_redirect(&query.token);
    (StatusCode::FOUND, [(header::LOCATION, location)])
}
