//! Core traits for the Quorum invitation platform

use crate::{error::Result, ids::*, models::*};
use async_trait::async_trait;

// =============================================================================
// Invite Store
// =============================================================================

/// Persistence for invite records.
#[async_trait]
pub trait InviteStore: Send + Sync {
    /// Persist a new invite. Fails with a write conflict if the underlying
    /// store does not report successful creation.
    async fn create(&self, invite: &Invite) -> Result<Invite>;

    /// Fetch an invite iff it is currently valid (`now < expiry && !redeemed`).
    /// Expired, redeemed, and nonexistent invites are all `None` so callers
    /// cannot distinguish whether an invite ever existed.
    async fn get_valid(&self, id: InviteId) -> Result<Option<Invite>>;

    /// Atomically transition `redeemed: false -> true` for an invite selected
    /// by the same validity predicate as `get_valid`. Implementations must use
    /// a conditional write so that at most one of two concurrent redemption
    /// attempts succeeds.
    async fn redeem(&self, id: InviteId) -> Result<()>;

    /// All currently-unredeemed invites, irrespective of expiry.
    async fn list_unredeemed(&self) -> Result<Vec<Invite>>;

    /// Force-expire any still-valid invites for an email, returning the count.
    /// Supports the replace-on-reinvite policy: at most one token stays valid
    /// per email.
    async fn expire_active_for_email(&self, email: &str) -> Result<u64>;
}

// =============================================================================
// Access Record Store
// =============================================================================

/// Persistence for authorization-scope grants.
#[async_trait]
pub trait AccessRecordStore: Send + Sync {
    /// Persist a new access record. A pre-existing record for the same object
    /// id is a write conflict, not an overwrite.
    async fn create(&self, record: &AccessRecord) -> Result<AccessRecord>;

    async fn get(&self, object_id: ObjectId) -> Result<Option<AccessRecord>>;
}

// =============================================================================
// Identity Provisioner
// =============================================================================

/// Directory account provisioning against the external identity provider.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// Look up the account for `email`, creating a new disabled account with
    /// an email-address identity binding if none exists. Idempotent: an
    /// already-existing account is returned unchanged, never an error.
    async fn create_or_get(&self, email: &str) -> Result<DirectoryAccount>;

    async fn get_by_email(&self, email: &str) -> Result<Option<DirectoryAccount>>;

    async fn get_by_id(&self, id: &str) -> Result<Option<DirectoryAccount>>;

    /// All directory accounts, following continuation pages until exhausted.
    async fn list_all(&self) -> Result<Vec<DirectoryAccount>>;

    async fn delete(&self, id: &str) -> Result<()>;

    /// Issue a fresh random credential requiring change on next sign-in.
    async fn reset_credential(&self, id: &str) -> Result<()>;
}

// =============================================================================
// Mail Dispatcher
// =============================================================================

/// Templated transactional email delivery.
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send_invitation(&self, recipient: &str, invite_url: &str) -> Result<()>;

    async fn send_welcome(&self, recipient: &str) -> Result<()>;
}

// =============================================================================
// Invite Token Mint
// =============================================================================

/// The external authorization-redirect exchange that mints and redeems
/// single-use invite tokens.
#[async_trait]
pub trait InviteTokenMinter: Send + Sync {
    /// Mint an invite token bound to `email` by driving the provider's
    /// redirect exchange. Returns the token extracted from the redirect
    /// location, or a typed mint failure for any deviation.
    async fn mint(&self, email: &str, invite_id: InviteId) -> Result<String>;

    /// Build the provider-hosted redemption URL embedding `token` and a
    /// fresh nonce. Pure construction; performs no validation.
    fn redeem_url(&self, token: &str) -> String;
}
