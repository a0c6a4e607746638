//! Application state for API handlers

use std::sync::Arc;

use sqlx::PgPool;

use quorum_core::{AccessRecordStore, DirectoryService, InviteStore};
use quorum_invite::InviteWorkflow;

/// Concrete application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub directory: Arc<dyn DirectoryService>,
    pub invites: Arc<dyn InviteStore>,
    pub access: Arc<dyn AccessRecordStore>,
    pub workflow: Arc<InviteWorkflow>,
    /// Shared secret guarding the welcome-mail endpoint
    pub welcome_key: String,
}

impl AppState {
    pub fn new(
        db_pool: PgPool,
        directory: Arc<dyn DirectoryService>,
        invites: Arc<dyn InviteStore>,
        access: Arc<dyn AccessRecordStore>,
        workflow: Arc<InviteWorkflow>,
        welcome_key: String,
    ) -> Self {
        Self {
            db_pool,
            directory,
            invites,
            access,
            workflow,
            welcome_key,
        }
    }
}
