//! Invite workflow orchestration
//!
//! Drives the full invitation sequence: scope computation, directory account
//! provisioning, access record persistence, invite persistence, token mint,
//! and email delivery. Each step's failure maps to a stage-named error and
//! earlier steps are never rolled back: a provisioned account survives a
//! failed email send, and the operator resolves partial states out of band.

use std::str::FromStr;
use std::sync::Arc;

use tracing::{info, instrument, warn};

use quorum_core::{
    compute_scopes, AccessRecord, AccessRecordStore, DirectoryAccount, DirectoryService, Invite,
    InviteStore, InviteTokenMinter, MailSender, ObjectId, QuorumError, Result,
};

/// Everything the creation workflow produced before (and if) it completed.
#[derive(Debug, Clone)]
pub struct InviteOutcome {
    pub account: DirectoryAccount,
    pub access_record: AccessRecord,
    pub invite: Invite,
    pub invite_url: String,
}

/// Orchestrator over the directory, the stores, the token mint, and mail.
pub struct InviteWorkflow {
    directory: Arc<dyn DirectoryService>,
    invites: Arc<dyn InviteStore>,
    access: Arc<dyn AccessRecordStore>,
    mail: Arc<dyn MailSender>,
    minter: Arc<dyn InviteTokenMinter>,
    invite_ttl_hours: i64,
}

impl InviteWorkflow {
    pub fn new(
        directory: Arc<dyn DirectoryService>,
        invites: Arc<dyn InviteStore>,
        access: Arc<dyn AccessRecordStore>,
        mail: Arc<dyn MailSender>,
        minter: Arc<dyn InviteTokenMinter>,
        invite_ttl_hours: i64,
    ) -> Self {
        Self {
            directory,
            invites,
            access,
            mail,
            minter,
            invite_ttl_hours,
        }
    }

    /// Provision an account for `email`, grant scopes derived from
    /// `permission_request`, persist a fresh invite, and email the redemption
    /// link. Fails fast at the first failing step without undoing earlier ones.
    #[instrument(skip(self))]
    pub async fn create_and_invite(
        &self,
        email: &str,
        permission_request: &str,
    ) -> Result<InviteOutcome> {
        let scopes = compute_scopes(permission_request);

        let account = self
            .directory
            .create_or_get(email)
            .await
            .map_err(|e| match e {
                QuorumError::ProvisioningFailed { .. } => e,
                other => QuorumError::provisioning_failed(other.to_string()),
            })?;

        let object_id = ObjectId::from_str(&account.id).map_err(|e| {
            QuorumError::provisioning_failed(format!(
                "Directory returned non-UUID account id '{}': {}",
                account.id, e
            ))
        })?;

        // Re-inviting an already-provisioned email hits the store's duplicate
        // conflict; the existing grant is reused unchanged (scopes are
        // immutable, never merged) so the rest of the sequence can run.
        let access_record = match self
            .access
            .create(&AccessRecord::new(object_id, scopes))
            .await
        {
            Ok(record) => record,
            Err(QuorumError::WriteConflict { .. }) => self
                .access
                .get(object_id)
                .await
                .map_err(|e| QuorumError::auth_record_creation_failed(e.to_string()))?
                .ok_or_else(|| {
                    QuorumError::auth_record_creation_failed(format!(
                        "Access record insert conflicted for object {} but no record was found",
                        object_id
                    ))
                })?,
            Err(e) => return Err(QuorumError::auth_record_creation_failed(e.to_string())),
        };

        // Replace policy: at most one valid invite per email.
        let expired = self.invites.expire_active_for_email(email).await?;
        if expired > 0 {
            warn!(expired, "Force-expired previous invites for email");
        }

        let invite = self
            .invites
            .create(&Invite::new(email, self.invite_ttl_hours))
            .await?;

        let token = self
            .minter
            .mint(email, invite.id)
            .await
            .map_err(|e| match e {
                QuorumError::InviteTokenMintFailed { .. } => e,
                other => QuorumError::invite_token_mint_failed(other.to_string()),
            })?;

        let invite_url = self.minter.redeem_url(&token);

        self.mail
            .send_invitation(email, &invite_url)
            .await
            .map_err(|e| QuorumError::invite_delivery_failed(e.to_string()))?;

        info!(invite_id = %invite.id, account_id = %account.id, "Invitation issued");

        Ok(InviteOutcome {
            account,
            access_record,
            invite,
            invite_url,
        })
    }

    /// Build the provider-hosted redemption URL for a minted token. Pure
    /// construction; invite-record validation lives on the store endpoints.
    pub fn redeem_redirect(&self, token: &str) -> String {
        self.minter.redeem_url(token)
    }

    pub async fn send_welcome(&self, email: &str) -> Result<()> {
        self.mail.send_welcome(email).await
    }
}
