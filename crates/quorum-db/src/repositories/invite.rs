//! Invite store implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;

use quorum_core::{Invite, InviteId, InviteStore, QuorumError, Result};

/// PostgreSQL implementation of InviteStore
pub struct PgInviteStore {
    pool: PgPool,
}

impl PgInviteStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn invite_from_row(row: &sqlx::postgres::PgRow) -> Invite {
    Invite {
        id: InviteId::from_uuid(row.get("id")),
        email: row.get("email"),
        expiry: row.get("expiry"),
        redeemed: row.get("redeemed"),
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|d| d.code())
        .map(|c| c == "23505")
        .unwrap_or(false)
}

#[async_trait]
impl InviteStore for PgInviteStore {
    #[instrument(skip(self, invite), fields(invite_id = %invite.id))]
    async fn create(&self, invite: &Invite) -> Result<Invite> {
        sqlx::query(
            r#"
            INSERT INTO invites (id, email, expiry, redeemed)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(invite.id.as_uuid())
        .bind(&invite.email)
        .bind(invite.expiry)
        .bind(invite.redeemed)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                QuorumError::write_conflict(format!("Invite {} already exists", invite.id))
            } else {
                QuorumError::database_error(e.to_string())
            }
        })?;

        Ok(invite.clone())
    }

    #[instrument(skip(self))]
    async fn get_valid(&self, id: InviteId) -> Result<Option<Invite>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, expiry, redeemed
            FROM invites
            WHERE id = $1 AND redeemed = FALSE AND expiry > NOW()
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| QuorumError::database_error(e.to_string()))?;

        Ok(row.as_ref().map(invite_from_row))
    }

    // Conditional write: the redeemed flag only transitions while the same
    // validity predicate as get_valid still holds, so two concurrent redeem
    // attempts cannot both succeed.
    #[instrument(skip(self))]
    async fn redeem(&self, id: InviteId) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE invites
            SET redeemed = TRUE
            WHERE id = $1 AND redeemed = FALSE AND expiry > NOW()
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| QuorumError::database_error(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(QuorumError::not_found("invite", id.to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_unredeemed(&self) -> Result<Vec<Invite>> {
        // Filters on redeemed only: expired-but-unredeemed invites are included.
        let rows = sqlx::query(
            r#"
            SELECT id, email, expiry, redeemed
            FROM invites
            WHERE redeemed = FALSE
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| QuorumError::database_error(e.to_string()))?;

        Ok(rows.iter().map(invite_from_row).collect())
    }

    #[instrument(skip(self))]
    async fn expire_active_for_email(&self, email: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE invites
            SET expiry = NOW()
            WHERE email = $1 AND redeemed = FALSE AND expiry > NOW()
            "#,
        )
        .bind(email)
        .execute(&self.pool)
        .await
        .map_err(|e| QuorumError::database_error(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
