// --- File: crates/dosewatch_reminders/src/catalog.rs ---
//! Medication and profile management.
//!
//! Request bodies use the stored column names, so a client that used to write
//! rows directly can send the same JSON here.

use chrono::{DateTime, NaiveTime, Utc};
use dosewatch_common::models::{new_id, Medication, Profile};
use dosewatch_db::{MedicationRepository, ProfileRepository};
use serde::Deserialize;
use tracing::info;

use crate::context::ReminderContext;
use crate::error::ReminderError;
use crate::interval::{frequency_label, next_after, parse_frequency, validate_interval};

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateMedicationRequest {
    pub user_id: String,
    pub name: String,
    pub dosage: String,
    /// Display text; parsed for the interval when `interval_hours` is absent
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub interval_hours: Option<u32>,
    #[serde(default)]
    pub time_of_day: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub reminder_enabled: bool,
    #[serde(default)]
    pub next_reminder: Option<DateTime<Utc>>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateMedicationRequest {
    pub name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub interval_hours: Option<u32>,
    pub time_of_day: Option<Vec<String>>,
    pub notes: Option<String>,
    pub image_url: Option<String>,
    pub reminder_enabled: Option<bool>,
    pub next_reminder: Option<DateTime<Utc>>,
}

/// Partial profile; absent fields keep their stored value (or the default for
/// a new profile).
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ProfileRequest {
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub name: Option<String>,
    pub email_reminder_enabled: Option<bool>,
    pub sms_reminder_enabled: Option<bool>,
    pub push_reminder_enabled: Option<bool>,
}

fn default_true() -> bool {
    true
}

fn require(value: &str, field: &str) -> Result<(), ReminderError> {
    if value.trim().is_empty() {
        Err(ReminderError::Validation(format!("{} must not be empty", field)))
    } else {
        Ok(())
    }
}

fn validate_times(times: &[String]) -> Result<(), ReminderError> {
    for time in times {
        NaiveTime::parse_from_str(time, "%H:%M").map_err(|_| {
            ReminderError::Validation(format!("time_of_day entry '{}' is not HH:MM", time))
        })?;
    }
    Ok(())
}

/// Interval from the explicit field, else from the frequency text.
fn resolve_interval(interval_hours: Option<u32>, frequency: Option<&str>) -> Result<u32, ReminderError> {
    match (interval_hours, frequency) {
        (Some(hours), _) => validate_interval(hours),
        (None, Some(text)) => parse_frequency(text),
        (None, None) => Err(ReminderError::Validation(
            "either interval_hours or frequency is required".into(),
        )),
    }
}

pub async fn create_medication(
    ctx: &ReminderContext,
    request: CreateMedicationRequest,
) -> Result<Medication, ReminderError> {
    require(&request.user_id, "user_id")?;
    require(&request.name, "name")?;
    require(&request.dosage, "dosage")?;
    validate_times(&request.time_of_day)?;

    let frequency = request.frequency.filter(|f| !f.trim().is_empty());
    let interval_hours = resolve_interval(request.interval_hours, frequency.as_deref())?;
    let now = ctx.clock.now();

    let next_reminder = match (request.reminder_enabled, request.next_reminder) {
        (_, Some(at)) => Some(at),
        (true, None) => Some(next_after(now, interval_hours)),
        (false, None) => None,
    };

    let medication = Medication {
        id: new_id(),
        user_id: request.user_id,
        name: request.name.trim().to_string(),
        dosage: request.dosage.trim().to_string(),
        frequency: frequency.unwrap_or_else(|| frequency_label(interval_hours)),
        interval_hours,
        time_of_day: request.time_of_day,
        notes: request.notes,
        image_url: request.image_url,
        reminder_enabled: request.reminder_enabled,
        next_reminder,
        created_at: now,
        updated_at: now,
    };

    let stored = ctx.medications.create(&medication).await?;
    info!(
        "Created medication {} for user {} (every {}h)",
        stored.id, stored.user_id, stored.interval_hours
    );
    Ok(stored)
}

pub async fn get_medication(ctx: &ReminderContext, id: &str) -> Result<Medication, ReminderError> {
    ctx.medications
        .find_by_id(id)
        .await?
        .ok_or_else(|| ReminderError::NotFound(format!("Medication {}", id)))
}

pub async fn list_medications(
    ctx: &ReminderContext,
    user_id: &str,
) -> Result<Vec<Medication>, ReminderError> {
    require(user_id, "user_id")?;
    Ok(ctx.medications.find_by_user(user_id).await?)
}

pub async fn update_medication(
    ctx: &ReminderContext,
    id: &str,
    request: UpdateMedicationRequest,
) -> Result<Medication, ReminderError> {
    let mut medication = get_medication(ctx, id).await?;
    let now = ctx.clock.now();

    if let Some(name) = request.name {
        require(&name, "name")?;
        medication.name = name.trim().to_string();
    }
    if let Some(dosage) = request.dosage {
        require(&dosage, "dosage")?;
        medication.dosage = dosage.trim().to_string();
    }
    if let Some(times) = request.time_of_day {
        validate_times(&times)?;
        medication.time_of_day = times;
    }
    if request.notes.is_some() {
        medication.notes = request.notes;
    }
    if request.image_url.is_some() {
        medication.image_url = request.image_url;
    }

    match (request.interval_hours, request.frequency) {
        (Some(hours), frequency) => {
            medication.interval_hours = validate_interval(hours)?;
            medication.frequency = frequency
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| frequency_label(hours));
        }
        (None, Some(frequency)) => {
            medication.interval_hours = parse_frequency(&frequency)?;
            medication.frequency = frequency;
        }
        (None, None) => {}
    }

    if let Some(enabled) = request.reminder_enabled {
        medication.reminder_enabled = enabled;
    }
    if let Some(at) = request.next_reminder {
        medication.next_reminder = Some(at);
    } else if medication.reminder_enabled && medication.next_reminder.is_none() {
        medication.next_reminder = Some(next_after(now, medication.interval_hours));
    }
    medication.updated_at = now;

    if !ctx.medications.update(&medication).await? {
        return Err(ReminderError::NotFound(format!("Medication {}", id)));
    }
    Ok(medication)
}

pub async fn delete_medication(ctx: &ReminderContext, id: &str) -> Result<(), ReminderError> {
    if ctx.medications.delete(id).await? {
        info!("Deleted medication {}", id);
        Ok(())
    } else {
        Err(ReminderError::NotFound(format!("Medication {}", id)))
    }
}

pub async fn get_profile(ctx: &ReminderContext, id: &str) -> Result<Profile, ReminderError> {
    ctx.profiles
        .find_by_id(id)
        .await?
        .ok_or_else(|| ReminderError::NotFound(format!("Profile {}", id)))
}

pub async fn upsert_profile(
    ctx: &ReminderContext,
    id: &str,
    request: ProfileRequest,
) -> Result<Profile, ReminderError> {
    require(id, "profile id")?;
    let now = ctx.clock.now();

    let mut profile = ctx.profiles.find_by_id(id).await?.unwrap_or_else(|| Profile {
        id: id.to_string(),
        email: None,
        phone_number: None,
        name: None,
        email_reminder_enabled: false,
        sms_reminder_enabled: false,
        push_reminder_enabled: true,
        created_at: now,
        updated_at: now,
    });

    if let Some(email) = request.email {
        if !email.trim().is_empty() && !email.contains('@') {
            return Err(ReminderError::Validation(format!(
                "'{}' is not an email address",
                email
            )));
        }
        profile.email = Some(email).filter(|e| !e.trim().is_empty());
    }
    if let Some(phone) = request.phone_number {
        profile.phone_number = Some(phone).filter(|p| !p.trim().is_empty());
    }
    if let Some(name) = request.name {
        profile.name = Some(name);
    }
    if let Some(enabled) = request.email_reminder_enabled {
        profile.email_reminder_enabled = enabled;
    }
    if let Some(enabled) = request.sms_reminder_enabled {
        profile.sms_reminder_enabled = enabled;
    }
    if let Some(enabled) = request.push_reminder_enabled {
        profile.push_reminder_enabled = enabled;
    }
    profile.updated_at = now;

    Ok(ctx.profiles.upsert(&profile).await?)
}
