//! Data Transfer Objects for API requests and responses

use serde::{Deserialize, Serialize};

use quorum_core::{AccessRecord, DirectoryAccount, Invite};
use quorum_invite::InviteOutcome;

/// Everything the creation workflow produced, echoed back to the caller.
#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub user: DirectoryAccount,
    #[serde(rename = "userAuth")]
    pub user_auth: AccessRecord,
    pub invite: Invite,
    #[serde(rename = "inviteUrl")]
    pub invite_url: String,
}

impl From<InviteOutcome> for CreateUserResponse {
    fn from(outcome: InviteOutcome) -> Self {
        Self {
            user: outcome.account,
            user_auth: outcome.access_record,
            invite: outcome.invite,
            invite_url: outcome.invite_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserQuery {
    pub email: String,
    #[serde(default)]
    pub permission: String,
}

#[derive(Debug, Deserialize)]
pub struct RedeemQuery {
    pub token: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct WelcomeQuery {
    pub email: String,
    pub key: String,
}
