//! Domain models for the Quorum invitation platform
//!
//! Persisted field names are contract-significant: `Invite` serializes as
//! `{id, email, expiry, redeemed}` and `AccessRecord` as
//! `{objectId, scopes}`. Directory account fields follow the Graph wire
//! naming so the same type deserializes directory API responses.

use crate::ids::*;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Invite
// =============================================================================

/// A time-boxed, single-use token record permitting one account-claim action.
///
/// An invite is *valid* iff `now < expiry && !redeemed`. Once redeemed it is
/// permanently inactive; records are never deleted (soft-expired by time).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invite {
    pub id: InviteId,
    pub email: String,
    pub expiry: DateTime<Utc>,
    pub redeemed: bool,
}

impl Invite {
    /// Create a new invite expiring `ttl_hours` from now.
    pub fn new(email: impl Into<String>, ttl_hours: i64) -> Self {
        Self {
            id: InviteId::new(),
            email: email.into(),
            expiry: Utc::now() + Duration::hours(ttl_hours),
            redeemed: false,
        }
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now < self.expiry && !self.redeemed
    }
}

// =============================================================================
// Access Record
// =============================================================================

/// The authorization-scope grant associated with a directory account.
///
/// Exactly one record exists per directory account id; scopes are computed
/// at creation and immutable thereafter (no update path).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessRecord {
    #[serde(rename = "objectId")]
    pub object_id: ObjectId,
    pub scopes: Vec<String>,
}

impl AccessRecord {
    pub fn new(object_id: ObjectId, scopes: Vec<String>) -> Self {
        Self { object_id, scopes }
    }
}

// =============================================================================
// Directory Account (external entity, referenced not owned)
// =============================================================================

/// The identity provider's representation of a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryAccount {
    pub id: String,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    pub mail: Option<String>,
    #[serde(rename = "userPrincipalName")]
    pub user_principal_name: Option<String>,
    #[serde(rename = "accountEnabled")]
    pub account_enabled: Option<bool>,
    #[serde(default)]
    pub identities: Vec<ObjectIdentity>,
}

/// An external-identity binding on a directory account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectIdentity {
    #[serde(rename = "signInType")]
    pub sign_in_type: String,
    pub issuer: String,
    #[serde(rename = "issuerAssignedId")]
    pub issuer_assigned_id: String,
}
