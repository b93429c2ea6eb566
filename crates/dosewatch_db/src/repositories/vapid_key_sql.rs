//! SQL implementation of the VAPID key repository

use crate::codec::{encode_timestamp, timestamp};
use crate::error::DbError;
use crate::repositories::vapid_key::VapidKeyRepository;
use crate::DbClient;
use dosewatch_common::models::VapidKeyPair;
use sqlx::Row;
use tracing::{debug, error, info};

#[derive(Debug, Clone)]
pub struct SqlVapidKeyRepository {
    db_client: DbClient,
}

impl SqlVapidKeyRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

impl VapidKeyRepository for SqlVapidKeyRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing VAPID key schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS vapid_keys (
                id TEXT PRIMARY KEY,
                public_key TEXT NOT NULL,
                private_key TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
        "#;
        self.db_client.execute(query).await?;

        info!("VAPID key schema initialized successfully");
        Ok(())
    }

    async fn latest(&self) -> Result<Option<VapidKeyPair>, DbError> {
        let row = sqlx::query(
            "SELECT id, public_key, private_key, created_at FROM vapid_keys \
             ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to load VAPID keys: {}", e);
            DbError::QueryError(e.to_string())
        })?;

        match row {
            Some(row) => Ok(Some(VapidKeyPair {
                id: row.try_get("id")?,
                public_key: row.try_get("public_key")?,
                private_key: row.try_get("private_key")?,
                created_at: timestamp(&row, "created_at")?,
            })),
            None => Ok(None),
        }
    }

    async fn insert(&self, pair: &VapidKeyPair) -> Result<(), DbError> {
        debug!("Storing VAPID key pair {}", pair.id);

        sqlx::query(
            "INSERT INTO vapid_keys (id, public_key, private_key, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&pair.id)
        .bind(&pair.public_key)
        .bind(&pair.private_key)
        .bind(encode_timestamp(pair.created_at))
        .execute(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to store VAPID key pair: {}", e);
            DbError::QueryError(e.to_string())
        })?;

        Ok(())
    }
}
