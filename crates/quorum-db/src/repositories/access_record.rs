//! Access record store implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;

use quorum_core::{AccessRecord, AccessRecordStore, ObjectId, QuorumError, Result};

/// PostgreSQL implementation of AccessRecordStore
pub struct PgAccessRecordStore {
    pool: PgPool,
}

impl PgAccessRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessRecordStore for PgAccessRecordStore {
    #[instrument(skip(self, record), fields(object_id = %record.object_id))]
    async fn create(&self, record: &AccessRecord) -> Result<AccessRecord> {
        let scopes_json = serde_json::to_value(&record.scopes)
            .map_err(|e| QuorumError::internal_error(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO access_records (object_id, scopes)
            VALUES ($1, $2)
            "#,
        )
        .bind(record.object_id.as_uuid())
        .bind(&scopes_json)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let unique_violation = e
                .as_database_error()
                .and_then(|d| d.code())
                .map(|c| c == "23505")
                .unwrap_or(false);

            if unique_violation {
                QuorumError::write_conflict(format!(
                    "Access record already exists for object {}",
                    record.object_id
                ))
            } else {
                QuorumError::database_error(e.to_string())
            }
        })?;

        Ok(record.clone())
    }

    #[instrument(skip(self))]
    async fn get(&self, object_id: ObjectId) -> Result<Option<AccessRecord>> {
        let row = sqlx::query(
            r#"
            SELECT object_id, scopes
            FROM access_records
            WHERE object_id = $1
            "#,
        )
        .bind(object_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| QuorumError::database_error(e.to_string()))?;

        match row {
            Some(row) => {
                let scopes_json: serde_json::Value = row.get("scopes");
                let scopes: Vec<String> = serde_json::from_value(scopes_json)
                    .map_err(|e| QuorumError::internal_error(e.to_string()))?;

                Ok(Some(AccessRecord {
                    object_id: ObjectId::from_uuid(row.get("object_id")),
                    scopes,
                }))
            }
            None => Ok(None),
        }
    }
}
