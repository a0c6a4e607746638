//! Workflow tests over in-memory store and service implementations.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use quorum_core::{
    AccessRecord, AccessRecordStore, DirectoryAccount, DirectoryService, Invite, InviteId,
    InviteStore, InviteTokenMinter, MailSender, ObjectId, QuorumError, Result, SCOPE_READ,
    SCOPE_WRITE,
};
use quorum_invite::InviteWorkflow;

// =============================================================================
// In-memory doubles
// =============================================================================

#[derive(Default)]
struct MemoryInviteStore {
    invites: Mutex<HashMap<InviteId, Invite>>,
}

#[async_trait]
impl InviteStore for MemoryInviteStore {
    async fn create(&self, invite: &Invite) -> Result<Invite> {
        let mut invites = self.invites.lock().unwrap();
        if invites.contains_key(&invite.id) {
            return Err(QuorumError::write_conflict("Invite already exists"));
        }
        invites.insert(invite.id, invite.clone());
        Ok(invite.clone())
    }

    async fn get_valid(&self, id: InviteId) -> Result<Option<Invite>> {
        let invites = self.invites.lock().unwrap();
        Ok(invites
            .get(&id)
            .filter(|i| i.is_valid(Utc::now()))
            .cloned())
    }

    async fn redeem(&self, id: InviteId) -> Result<()> {
        let mut invites = self.invites.lock().unwrap();
        match invites.get_mut(&id) {
            Some(invite) if invite.is_valid(Utc::now()) => {
                invite.redeemed = true;
                Ok(())
            }
            _ => Err(QuorumError::not_found("invite", id.to_string())),
        }
    }

    async fn list_unredeemed(&self) -> Result<Vec<Invite>> {
        let invites = self.invites.lock().unwrap();
        Ok(invites.values().filter(|i| !i.redeemed).cloned().collect())
    }

    async fn expire_active_for_email(&self, email: &str) -> Result<u64> {
        let mut invites = self.invites.lock().unwrap();
        let now = Utc::now();
        let mut count = 0;
        for invite in invites.values_mut() {
            if invite.email == email && invite.is_valid(now) {
                invite.expiry = now;
                count += 1;
            }
        }
        Ok(count)
    }
}

#[derive(Default)]
struct MemoryAccessStore {
    records: Mutex<HashMap<ObjectId, AccessRecord>>,
}

#[async_trait]
impl AccessRecordStore for MemoryAccessStore {
    async fn create(&self, record: &AccessRecord) -> Result<AccessRecord> {
        let mut records = self.records.lock().unwrap();
        if records.contains_key(&record.object_id) {
            return Err(QuorumError::write_conflict(format!(
                "Access record already exists for object {}",
                record.object_id
            )));
        }
        records.insert(record.object_id, record.clone());
        Ok(record.clone())
    }

    async fn get(&self, object_id: ObjectId) -> Result<Option<AccessRecord>> {
        Ok(self.records.lock().unwrap().get(&object_id).cloned())
    }
}

#[derive(Default)]
struct MemoryDirectory {
    accounts: Mutex<HashMap<String, DirectoryAccount>>,
    creates: AtomicUsize,
}

fn account_for(email: &str, id: String) -> DirectoryAccount {
    DirectoryAccount {
        id,
        display_name: Some(email.to_string()),
        mail: Some(email.to_string()),
        user_principal_name: Some(format!("{}@tenant.example", email.replace('@', "_"))),
        account_enabled: Some(false),
        identities: vec![],
    }
}

#[async_trait]
impl DirectoryService for MemoryDirectory {
    async fn create_or_get(&self, email: &str) -> Result<DirectoryAccount> {
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(existing) = accounts.get(email) {
            return Ok(existing.clone());
        }
        self.creates.fetch_add(1, Ordering::SeqCst);
        let account = account_for(email, Uuid::new_v4().to_string());
        accounts.insert(email.to_string(), account.clone());
        Ok(account)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<DirectoryAccount>> {
        Ok(self.accounts.lock().unwrap().get(email).cloned())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<DirectoryAccount>> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<DirectoryAccount>> {
        Ok(self.accounts.lock().unwrap().values().cloned().collect())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.accounts.lock().unwrap().retain(|_, a| a.id != id);
        Ok(())
    }

    async fn reset_credential(&self, _id: &str) -> Result<()> {
        Ok(())
    }
}

/// Directory double returning an account id no store can key on.
struct BrokenIdDirectory;

#[async_trait]
impl DirectoryService for BrokenIdDirectory {
    async fn create_or_get(&self, email: &str) -> Result<DirectoryAccount> {
        Ok(account_for(email, "not-a-uuid".to_string()))
    }

    async fn get_by_email(&self, _email: &str) -> Result<Option<DirectoryAccount>> {
        Ok(None)
    }

    async fn get_by_id(&self, _id: &str) -> Result<Option<DirectoryAccount>> {
        Ok(None)
    }

    async fn list_all(&self) -> Result<Vec<DirectoryAccount>> {
        Ok(vec![])
    }

    async fn delete(&self, _id: &str) -> Result<()> {
        Ok(())
    }

    async fn reset_credential(&self, _id: &str) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
struct MemoryMailer {
    sent: Mutex<Vec<(String, String)>>,
    fail: AtomicBool,
}

#[async_trait]
impl MailSender for MemoryMailer {
    async fn send_invitation(&self, recipient: &str, invite_url: &str) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(QuorumError::delivery_failed("SMTP connection refused"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), invite_url.to_string()));
        Ok(())
    }

    async fn send_welcome(&self, recipient: &str) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(QuorumError::delivery_failed("SMTP connection refused"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), String::new()));
        Ok(())
    }
}

#[derive(Default)]
struct FakeMinter {
    fail: bool,
}

#[async_trait]
impl InviteTokenMinter for FakeMinter {
    async fn mint(&self, email: &str, _invite_id: InviteId) -> Result<String> {
        if self.fail {
            return Err(QuorumError::invite_token_mint_failed(
                "Provider returned HTTP 200 instead of a redirect",
            ));
        }
        Ok(format!("token-for-{}", email))
    }

    fn redeem_url(&self, token: &str) -> String {
        format!(
            "https://provider.example/authorize?id_token_hint={}&nonce={}",
            token,
            Uuid::new_v4()
        )
    }
}

struct Harness {
    directory: Arc<MemoryDirectory>,
    invites: Arc<MemoryInviteStore>,
    access: Arc<MemoryAccessStore>,
    mail: Arc<MemoryMailer>,
    workflow: InviteWorkflow,
}

fn harness_with(mail: MemoryMailer, minter: FakeMinter) -> Harness {
    let directory = Arc::new(MemoryDirectory::default());
    let invites = Arc::new(MemoryInviteStore::default());
    let access = Arc::new(MemoryAccessStore::default());
    let mail = Arc::new(mail);

    let workflow = InviteWorkflow::new(
        directory.clone(),
        invites.clone(),
        access.clone(),
        mail.clone(),
        Arc::new(minter),
        48,
    );

    Harness {
        directory,
        invites,
        access,
        mail,
        workflow,
    }
}

fn harness() -> Harness {
    harness_with(MemoryMailer::default(), FakeMinter::default())
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_create_and_invite_end_to_end() {
    let h = harness();

    let outcome = h
        .workflow
        .create_and_invite("jane@example.com", "readwrite")
        .await
        .unwrap();

    assert_eq!(outcome.account.mail.as_deref(), Some("jane@example.com"));
    assert_eq!(
        outcome.access_record.scopes,
        vec![SCOPE_READ.to_string(), SCOPE_WRITE.to_string()]
    );
    assert!(outcome.invite.is_valid(Utc::now()));
    assert!(outcome.invite_url.contains("token-for-jane%40example.com")
        || outcome.invite_url.contains("token-for-jane@example.com"));

    // Invite persisted and retrievable while valid.
    let stored = h.invites.get_valid(outcome.invite.id).await.unwrap();
    assert!(stored.is_some());

    // The email carried the same URL the caller got back.
    let sent = h.mail.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "jane@example.com");
    assert_eq!(sent[0].1, outcome.invite_url);
}

#[tokio::test]
async fn test_unrecognized_permission_grants_no_scopes() {
    let h = harness();

    let outcome = h
        .workflow
        .create_and_invite("jane@example.com", "superuser")
        .await
        .unwrap();

    assert!(outcome.access_record.scopes.is_empty());
}

#[tokio::test]
async fn test_existing_account_is_reused_not_recreated() {
    let h = harness();

    let first = h.directory.create_or_get("jane@example.com").await.unwrap();
    let outcome = h
        .workflow
        .create_and_invite("jane@example.com", "read")
        .await
        .unwrap();

    assert_eq!(outcome.account.id, first.id);
    assert_eq!(h.directory.creates.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_reinvite_reuses_existing_access_record() {
    let h = harness();

    let first = h
        .workflow
        .create_and_invite("jane@example.com", "read")
        .await
        .unwrap();

    let second = h
        .workflow
        .create_and_invite("jane@example.com", "readwrite")
        .await
        .unwrap();

    // Same account, same grant: scopes are never merged or widened on
    // re-invite.
    assert_eq!(second.account.id, first.account.id);
    assert_eq!(second.access_record.scopes, vec![SCOPE_READ.to_string()]);

    // Only the newer invite stays redeemable.
    assert!(h.invites.get_valid(first.invite.id).await.unwrap().is_none());
    assert!(h
        .invites
        .get_valid(second.invite.id)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_reinvite_after_delivery_failure_issues_fresh_invite() {
    let h = harness_with(
        MemoryMailer {
            fail: AtomicBool::new(true),
            ..MemoryMailer::default()
        },
        FakeMinter::default(),
    );

    // First attempt gets all the way to the send and dies there, leaving a
    // provisioned account, an access record, and a valid but undelivered
    // invite behind.
    let err = h
        .workflow
        .create_and_invite("jane@example.com", "read")
        .await
        .unwrap_err();
    assert!(matches!(err, QuorumError::InviteDeliveryFailed { .. }));

    let stale = h.invites.list_unredeemed().await.unwrap();
    assert_eq!(stale.len(), 1);

    // SMTP recovers; the retry must run the full sequence again.
    h.mail.fail.store(false, Ordering::SeqCst);
    let outcome = h
        .workflow
        .create_and_invite("jane@example.com", "read")
        .await
        .unwrap();

    // The undelivered invite is force-expired in favor of the new one.
    assert!(h.invites.get_valid(stale[0].id).await.unwrap().is_none());
    assert!(h
        .invites
        .get_valid(outcome.invite.id)
        .await
        .unwrap()
        .is_some());
    assert_eq!(outcome.access_record.scopes, vec![SCOPE_READ.to_string()]);
    assert_eq!(h.mail.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_reinvite_force_expires_previous_invite() {
    let h = harness();

    // A previous run left an active invite behind.
    let leftover = Invite::new("jane@example.com", 48);
    h.invites.create(&leftover).await.unwrap();

    let outcome = h
        .workflow
        .create_and_invite("jane@example.com", "read")
        .await
        .unwrap();

    assert!(h.invites.get_valid(leftover.id).await.unwrap().is_none());
    assert!(h.invites.get_valid(outcome.invite.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_mint_failure_keeps_earlier_steps() {
    let h = harness_with(MemoryMailer::default(), FakeMinter { fail: true });

    let err = h
        .workflow
        .create_and_invite("jane@example.com", "read")
        .await
        .unwrap_err();

    assert!(matches!(err, QuorumError::InviteTokenMintFailed { .. }));

    // Account, access record, and invite all survive the failed mint.
    assert!(h
        .directory
        .get_by_email("jane@example.com")
        .await
        .unwrap()
        .is_some());
    assert_eq!(h.invites.list_unredeemed().await.unwrap().len(), 1);
    assert!(h.mail.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_delivery_failure_keeps_earlier_steps() {
    let h = harness_with(
        MemoryMailer {
            fail: AtomicBool::new(true),
            ..MemoryMailer::default()
        },
        FakeMinter::default(),
    );

    let err = h
        .workflow
        .create_and_invite("jane@example.com", "read")
        .await
        .unwrap_err();

    assert!(matches!(err, QuorumError::InviteDeliveryFailed { .. }));

    let account = h
        .directory
        .get_by_email("jane@example.com")
        .await
        .unwrap()
        .unwrap();
    let object_id: ObjectId = account.id.parse().unwrap();
    assert!(h.access.get(object_id).await.unwrap().is_some());
    assert_eq!(h.invites.list_unredeemed().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_non_uuid_account_id_is_provisioning_failure() {
    let workflow = InviteWorkflow::new(
        Arc::new(BrokenIdDirectory),
        Arc::new(MemoryInviteStore::default()),
        Arc::new(MemoryAccessStore::default()),
        Arc::new(MemoryMailer::default()),
        Arc::new(FakeMinter::default()),
        48,
    );

    let err = workflow
        .create_and_invite("jane@example.com", "read")
        .await
        .unwrap_err();

    assert!(matches!(err, QuorumError::ProvisioningFailed { .. }));
}

#[tokio::test]
async fn test_redeem_redirect_embeds_token() {
    let h = harness();
    let url = h.workflow.redeem_redirect("tok123");
    assert!(url.contains("id_token_hint=tok123"));
}

#[tokio::test]
async fn test_concurrent_redeem_at_most_once() {
    let store = Arc::new(MemoryInviteStore::default());
    let invite = Invite::new("jane@example.com", 48);
    store.create(&invite).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = store.clone();
        let id = invite.id;
        handles.push(tokio::spawn(async move { store.redeem(id).await }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    assert_eq!(successes, 1);
}
