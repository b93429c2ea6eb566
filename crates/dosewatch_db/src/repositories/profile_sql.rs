//! SQL implementation of the profile repository

use crate::codec::{encode_flag, encode_timestamp, flag, optional, timestamp};
use crate::error::DbError;
use crate::repositories::profile::ProfileRepository;
use crate::DbClient;
use dosewatch_common::models::Profile;
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info};

#[derive(Debug, Clone)]
pub struct SqlProfileRepository {
    db_client: DbClient,
}

impl SqlProfileRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn profile_from_row(row: &AnyRow) -> Result<Profile, DbError> {
    Ok(Profile {
        id: row.try_get("id")?,
        email: optional(row, "email")?,
        phone_number: optional(row, "phone_number")?,
        name: optional(row, "name")?,
        email_reminder_enabled: flag(row, "email_reminder_enabled")?,
        sms_reminder_enabled: flag(row, "sms_reminder_enabled")?,
        push_reminder_enabled: flag(row, "push_reminder_enabled")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}

impl ProfileRepository for SqlProfileRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing profile schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS profiles (
                id TEXT PRIMARY KEY,
                email TEXT,
                phone_number TEXT,
                name TEXT,
                email_reminder_enabled BIGINT NOT NULL DEFAULT 0,
                sms_reminder_enabled BIGINT NOT NULL DEFAULT 0,
                push_reminder_enabled BIGINT NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
        "#;
        self.db_client.execute(query).await?;

        info!("Profile schema initialized successfully");
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Profile>, DbError> {
        debug!("Finding profile: {}", id);

        let row = sqlx::query(
            r#"
            SELECT id, email, phone_number, name, email_reminder_enabled,
                   sms_reminder_enabled, push_reminder_enabled, created_at, updated_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to find profile: {}", e);
            DbError::QueryError(e.to_string())
        })?;

        row.as_ref().map(profile_from_row).transpose()
    }

    async fn upsert(&self, profile: &Profile) -> Result<Profile, DbError> {
        debug!("Upserting profile: {}", profile.id);

        let query = r#"
            INSERT INTO profiles (id, email, phone_number, name, email_reminder_enabled,
                                  sms_reminder_enabled, push_reminder_enabled, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                email = excluded.email,
                phone_number = excluded.phone_number,
                name = excluded.name,
                email_reminder_enabled = excluded.email_reminder_enabled,
                sms_reminder_enabled = excluded.sms_reminder_enabled,
                push_reminder_enabled = excluded.push_reminder_enabled,
                updated_at = excluded.updated_at
        "#;

        sqlx::query(query)
            .bind(&profile.id)
            .bind(profile.email.clone())
            .bind(profile.phone_number.clone())
            .bind(profile.name.clone())
            .bind(encode_flag(profile.email_reminder_enabled))
            .bind(encode_flag(profile.sms_reminder_enabled))
            .bind(encode_flag(profile.push_reminder_enabled))
            .bind(encode_timestamp(profile.created_at))
            .bind(encode_timestamp(profile.updated_at))
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to upsert profile: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        self.find_by_id(&profile.id)
            .await?
            .ok_or_else(|| DbError::QueryError(format!("profile {} vanished after upsert", profile.id)))
    }
}
