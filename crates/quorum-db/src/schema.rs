//! Schema bootstrap
//!
//! Invite records are never deleted: expired invites stay in the table and
//! are filtered out at read time.

use quorum_core::{QuorumError, Result};
use sqlx::PgPool;
use tracing::info;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS invites (
    id UUID PRIMARY KEY,
    email TEXT NOT NULL,
    expiry TIMESTAMPTZ NOT NULL,
    redeemed BOOLEAN NOT NULL DEFAULT FALSE
);

CREATE INDEX IF NOT EXISTS invites_email_idx ON invites (email);

CREATE TABLE IF NOT EXISTS access_records (
    object_id UUID PRIMARY KEY,
    scopes JSONB NOT NULL
);
"#;

/// Create tables if they do not exist.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::raw_sql(SCHEMA_SQL)
        .execute(pool)
        .await
        .map_err(|e| QuorumError::database_error(format!("Schema bootstrap failed: {}", e)))?;

    info!("Database schema verified");
    Ok(())
}
