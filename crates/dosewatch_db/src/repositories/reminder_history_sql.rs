//! SQL implementation of the reminder history repository

use crate::codec::{encode_timestamp, optional, timestamp};
use crate::error::DbError;
use crate::repositories::reminder_history::{HistoryFilter, ReminderHistoryRepository};
use crate::DbClient;
use dosewatch_common::models::ReminderHistory;
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info};

pub const DEFAULT_HISTORY_LIMIT: u32 = 100;
pub const MAX_HISTORY_LIMIT: u32 = 1000;

#[derive(Debug, Clone)]
pub struct SqlReminderHistoryRepository {
    db_client: DbClient,
}

impl SqlReminderHistoryRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn history_from_row(row: &AnyRow) -> Result<ReminderHistory, DbError> {
    let channel: String = row.try_get("type")?;
    let status: String = row.try_get("status")?;

    Ok(ReminderHistory {
        id: row.try_get("id")?,
        medication_id: optional(row, "medication_id")?,
        user_id: optional(row, "user_id")?,
        channel: channel.parse().map_err(DbError::DecodeError)?,
        status: status.parse().map_err(DbError::DecodeError)?,
        error_message: optional(row, "error_message")?,
        sent_at: timestamp(row, "sent_at")?,
    })
}

impl ReminderHistoryRepository for SqlReminderHistoryRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing reminder history schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS reminder_history (
                id TEXT PRIMARY KEY,
                medication_id TEXT,
                user_id TEXT,
                type TEXT NOT NULL,
                status TEXT NOT NULL,
                error_message TEXT,
                sent_at TEXT NOT NULL
            )
        "#;
        self.db_client.execute(query).await?;
        self.db_client
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_reminder_history_medication \
                 ON reminder_history (medication_id, sent_at)",
            )
            .await?;

        info!("Reminder history schema initialized successfully");
        Ok(())
    }

    async fn insert(&self, entry: &ReminderHistory) -> Result<(), DbError> {
        debug!(
            "Recording {} {} for medication {:?}",
            entry.channel,
            entry.status.as_str(),
            entry.medication_id
        );

        sqlx::query(
            r#"
            INSERT INTO reminder_history (id, medication_id, user_id, type, status, error_message, sent_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&entry.id)
        .bind(entry.medication_id.clone())
        .bind(entry.user_id.clone())
        .bind(entry.channel.as_str())
        .bind(entry.status.as_str())
        .bind(entry.error_message.clone())
        .bind(encode_timestamp(entry.sent_at))
        .execute(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to insert reminder history: {}", e);
            DbError::QueryError(e.to_string())
        })?;

        Ok(())
    }

    async fn list(&self, filter: &HistoryFilter) -> Result<Vec<ReminderHistory>, DbError> {
        let mut conditions = Vec::new();
        let mut binds = Vec::new();
        if let Some(medication_id) = &filter.medication_id {
            binds.push(medication_id.clone());
            conditions.push(format!("medication_id = ${}", binds.len()));
        }
        if let Some(user_id) = &filter.user_id {
            binds.push(user_id.clone());
            conditions.push(format!("user_id = ${}", binds.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let limit = filter
            .limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT);

        let query = format!(
            "SELECT id, medication_id, user_id, type, status, error_message, sent_at \
             FROM reminder_history {} ORDER BY sent_at DESC, id DESC LIMIT ${}",
            where_clause,
            binds.len() + 1
        );
        debug!("Listing reminder history: {}", query);

        let mut statement = sqlx::query(&query);
        for value in &binds {
            statement = statement.bind(value);
        }
        let rows = statement
            .bind(i64::from(limit))
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to list reminder history: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        rows.iter().map(history_from_row).collect()
    }
}
