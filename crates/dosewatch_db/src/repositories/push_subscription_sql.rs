//! SQL implementation of the push subscription repository

use crate::codec::{encode_timestamp, timestamp};
use crate::error::DbError;
use crate::repositories::push_subscription::PushSubscriptionRepository;
use crate::DbClient;
use dosewatch_common::models::PushSubscription;
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info};

#[derive(Debug, Clone)]
pub struct SqlPushSubscriptionRepository {
    db_client: DbClient,
}

impl SqlPushSubscriptionRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn subscription_from_row(row: &AnyRow) -> Result<PushSubscription, DbError> {
    Ok(PushSubscription {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        endpoint: row.try_get("endpoint")?,
        p256dh: row.try_get("p256dh")?,
        auth: row.try_get("auth")?,
        created_at: timestamp(row, "created_at")?,
    })
}

impl PushSubscriptionRepository for SqlPushSubscriptionRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing push subscription schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS push_subscriptions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                endpoint TEXT NOT NULL UNIQUE,
                p256dh TEXT NOT NULL,
                auth TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
        "#;
        self.db_client.execute(query).await?;
        self.db_client
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_push_subscriptions_user \
                 ON push_subscriptions (user_id)",
            )
            .await?;

        info!("Push subscription schema initialized successfully");
        Ok(())
    }

    async fn upsert(&self, subscription: &PushSubscription) -> Result<PushSubscription, DbError> {
        debug!("Upserting push subscription for user: {}", subscription.user_id);

        let query = r#"
            INSERT INTO push_subscriptions (id, user_id, endpoint, p256dh, auth, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (endpoint) DO UPDATE SET
                user_id = excluded.user_id,
                p256dh = excluded.p256dh,
                auth = excluded.auth
        "#;

        sqlx::query(query)
            .bind(&subscription.id)
            .bind(&subscription.user_id)
            .bind(&subscription.endpoint)
            .bind(&subscription.p256dh)
            .bind(&subscription.auth)
            .bind(encode_timestamp(subscription.created_at))
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to upsert push subscription: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        self.find_by_endpoint(&subscription.endpoint)
            .await?
            .ok_or_else(|| DbError::QueryError("push subscription vanished after upsert".into()))
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<PushSubscription>, DbError> {
        debug!("Finding push subscriptions for user: {}", user_id);

        let rows = sqlx::query(
            r#"
            SELECT id, user_id, endpoint, p256dh, auth, created_at
            FROM push_subscriptions
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to find push subscriptions: {}", e);
            DbError::QueryError(e.to_string())
        })?;

        rows.iter().map(subscription_from_row).collect()
    }

    async fn find_by_endpoint(&self, endpoint: &str) -> Result<Option<PushSubscription>, DbError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, endpoint, p256dh, auth, created_at
            FROM push_subscriptions
            WHERE endpoint = $1
            "#,
        )
        .bind(endpoint)
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to find push subscription: {}", e);
            DbError::QueryError(e.to_string())
        })?;

        row.as_ref().map(subscription_from_row).transpose()
    }

    async fn delete_by_endpoint(&self, endpoint: &str) -> Result<bool, DbError> {
        debug!("Deleting push subscription: {}", endpoint);

        let result = sqlx::query("DELETE FROM push_subscriptions WHERE endpoint = $1")
            .bind(endpoint)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to delete push subscription: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }
}
