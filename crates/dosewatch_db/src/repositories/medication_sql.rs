//! SQL implementation of the medication repository

use crate::codec::{
    encode_flag, encode_timestamp, flag, optional, optional_flag, optional_timestamp, timestamp,
};
use crate::error::DbError;
use crate::repositories::medication::MedicationRepository;
use crate::DbClient;
use chrono::{DateTime, Utc};
use dosewatch_common::models::{ContactPreferences, DueReminder, Medication};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info};

const MEDICATION_COLUMNS: &str = "id, user_id, name, dosage, frequency, interval_hours, \
     time_of_day, notes, image_url, reminder_enabled, next_reminder, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct SqlMedicationRepository {
    db_client: DbClient,
}

impl SqlMedicationRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn medication_from_row(row: &AnyRow) -> Result<Medication, DbError> {
    let time_of_day: String = row.try_get("time_of_day")?;
    let time_of_day: Vec<String> = serde_json::from_str(&time_of_day)
        .map_err(|e| DbError::DecodeError(format!("bad time_of_day: {}", e)))?;
    let interval_hours: i64 = row.try_get("interval_hours")?;
    let interval_hours = u32::try_from(interval_hours)
        .map_err(|_| DbError::DecodeError(format!("bad interval_hours: {}", interval_hours)))?;

    Ok(Medication {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        dosage: row.try_get("dosage")?,
        frequency: row.try_get("frequency")?,
        interval_hours,
        time_of_day,
        notes: optional(row, "notes")?,
        image_url: optional(row, "image_url")?,
        reminder_enabled: flag(row, "reminder_enabled")?,
        next_reminder: optional_timestamp(row, "next_reminder")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}

fn due_reminder_from_row(row: &AnyRow) -> Result<DueReminder, DbError> {
    let medication = medication_from_row(row)?;
    let profile_id: Option<String> = optional(row, "profile_id")?;

    let contact = match profile_id {
        None => ContactPreferences::default(),
        Some(_) => {
            let defaults = ContactPreferences::default();
            ContactPreferences {
                email: optional(row, "profile_email")?,
                phone_number: optional(row, "profile_phone_number")?,
                email_enabled: optional_flag(row, "profile_email_enabled")?
                    .unwrap_or(defaults.email_enabled),
                sms_enabled: optional_flag(row, "profile_sms_enabled")?
                    .unwrap_or(defaults.sms_enabled),
                push_enabled: optional_flag(row, "profile_push_enabled")?
                    .unwrap_or(defaults.push_enabled),
            }
        }
    };

    Ok(DueReminder { medication, contact })
}

fn encode_time_of_day(medication: &Medication) -> Result<String, DbError> {
    serde_json::to_string(&medication.time_of_day)
        .map_err(|e| DbError::QueryError(format!("bad time_of_day: {}", e)))
}

impl MedicationRepository for SqlMedicationRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing medication schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS medications (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                dosage TEXT NOT NULL,
                frequency TEXT NOT NULL,
                interval_hours BIGINT NOT NULL,
                time_of_day TEXT NOT NULL DEFAULT '[]',
                notes TEXT,
                image_url TEXT,
                reminder_enabled BIGINT NOT NULL DEFAULT 1,
                next_reminder TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
        "#;
        self.db_client.execute(query).await?;

        self.db_client
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_medications_due \
                 ON medications (reminder_enabled, next_reminder)",
            )
            .await?;
        self.db_client
            .execute("CREATE INDEX IF NOT EXISTS idx_medications_user ON medications (user_id)")
            .await?;

        info!("Medication schema initialized successfully");
        Ok(())
    }

    async fn create(&self, medication: &Medication) -> Result<Medication, DbError> {
        debug!("Creating medication {} for user: {}", medication.id, medication.user_id);

        let query = format!(
            "INSERT INTO medications ({}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
            MEDICATION_COLUMNS
        );

        sqlx::query(&query)
            .bind(&medication.id)
            .bind(&medication.user_id)
            .bind(&medication.name)
            .bind(&medication.dosage)
            .bind(&medication.frequency)
            .bind(i64::from(medication.interval_hours))
            .bind(encode_time_of_day(medication)?)
            .bind(medication.notes.clone())
            .bind(medication.image_url.clone())
            .bind(encode_flag(medication.reminder_enabled))
            .bind(medication.next_reminder.map(encode_timestamp))
            .bind(encode_timestamp(medication.created_at))
            .bind(encode_timestamp(medication.updated_at))
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to insert medication: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        info!("Medication {} created", medication.id);
        Ok(medication.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Medication>, DbError> {
        debug!("Finding medication: {}", id);

        let query = format!("SELECT {} FROM medications WHERE id = $1", MEDICATION_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to find medication: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        row.as_ref().map(medication_from_row).transpose()
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Medication>, DbError> {
        debug!("Finding medications for user: {}", user_id);

        let query = format!(
            "SELECT {} FROM medications WHERE user_id = $1 ORDER BY created_at ASC, id ASC",
            MEDICATION_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to find medications: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        rows.iter().map(medication_from_row).collect()
    }

    async fn update(&self, medication: &Medication) -> Result<bool, DbError> {
        debug!("Updating medication: {}", medication.id);

        let query = r#"
            UPDATE medications
            SET name = $1, dosage = $2, frequency = $3, interval_hours = $4,
                time_of_day = $5, notes = $6, image_url = $7, reminder_enabled = $8,
                next_reminder = $9, updated_at = $10
            WHERE id = $11
        "#;

        let result = sqlx::query(query)
            .bind(&medication.name)
            .bind(&medication.dosage)
            .bind(&medication.frequency)
            .bind(i64::from(medication.interval_hours))
            .bind(encode_time_of_day(medication)?)
            .bind(medication.notes.clone())
            .bind(medication.image_url.clone())
            .bind(encode_flag(medication.reminder_enabled))
            .bind(medication.next_reminder.map(encode_timestamp))
            .bind(encode_timestamp(medication.updated_at))
            .bind(&medication.id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to update medication: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> Result<bool, DbError> {
        debug!("Deleting medication: {}", id);

        let result = sqlx::query("DELETE FROM medications WHERE id = $1")
            .bind(id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to delete medication: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<DueReminder>, DbError> {
        debug!("Selecting medications due at or before {}", now);

        let query = r#"
            SELECT m.id AS id, m.user_id AS user_id, m.name AS name, m.dosage AS dosage,
                   m.frequency AS frequency, m.interval_hours AS interval_hours,
                   m.time_of_day AS time_of_day, m.notes AS notes, m.image_url AS image_url,
                   m.reminder_enabled AS reminder_enabled, m.next_reminder AS next_reminder,
                   m.created_at AS created_at, m.updated_at AS updated_at,
                   p.id AS profile_id, p.email AS profile_email,
                   p.phone_number AS profile_phone_number,
                   p.email_reminder_enabled AS profile_email_enabled,
                   p.sms_reminder_enabled AS profile_sms_enabled,
                   p.push_reminder_enabled AS profile_push_enabled
            FROM medications m
            LEFT JOIN profiles p ON p.id = m.user_id
            WHERE m.reminder_enabled = 1
              AND m.next_reminder IS NOT NULL
              AND m.next_reminder <= $1
            ORDER BY m.next_reminder ASC, m.id ASC
        "#;

        let rows = sqlx::query(query)
            .bind(encode_timestamp(now))
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to select due medications: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        rows.iter().map(due_reminder_from_row).collect()
    }

    async fn claim(
        &self,
        id: &str,
        observed: DateTime<Utc>,
        lease_until: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        let query = r#"
            UPDATE medications
            SET next_reminder = $1
            WHERE id = $2 AND reminder_enabled = 1 AND next_reminder = $3
        "#;

        let result = sqlx::query(query)
            .bind(encode_timestamp(lease_until))
            .bind(id)
            .bind(encode_timestamp(observed))
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to claim medication {}: {}", id, e);
                DbError::QueryError(e.to_string())
            })?;

        let claimed = result.rows_affected() == 1;
        debug!("Claim of medication {}: {}", id, claimed);
        Ok(claimed)
    }

    async fn release_claim(
        &self,
        id: &str,
        lease_until: DateTime<Utc>,
        next_reminder: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        let query = r#"
            UPDATE medications
            SET next_reminder = $1, updated_at = $2
            WHERE id = $3 AND next_reminder = $4
        "#;

        let result = sqlx::query(query)
            .bind(encode_timestamp(next_reminder))
            .bind(encode_timestamp(updated_at))
            .bind(id)
            .bind(encode_timestamp(lease_until))
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to release claim on medication {}: {}", id, e);
                DbError::QueryError(e.to_string())
            })?;

        let released = result.rows_affected() == 1;
        debug!("Release of medication {} to {}: {}", id, next_reminder, released);
        Ok(released)
    }

    async fn update_next_reminder(
        &self,
        id: &str,
        next_reminder: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        debug!("Setting next reminder of {} to {}", id, next_reminder);

        let result = sqlx::query(
            "UPDATE medications SET next_reminder = $1, updated_at = $2 WHERE id = $3",
        )
        .bind(encode_timestamp(next_reminder))
        .bind(encode_timestamp(updated_at))
        .bind(id)
        .execute(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to update next reminder of {}: {}", id, e);
            DbError::QueryError(e.to_string())
        })?;

        Ok(result.rows_affected() > 0)
    }
}
