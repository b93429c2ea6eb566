// --- File: crates/dosewatch_common/src/models.rs ---

// Domain records shared by the repositories, the reminder workflow and the
// HTTP layer. Field names follow the stored column names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Creates a new random record id.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// A medication with its reminder schedule.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub dosage: String,
    /// Display text such as "Every 8 hours". Never parsed after creation.
    pub frequency: String,
    /// Hours between reminders, fixed when the medication is created or edited.
    pub interval_hours: u32,
    /// Preferred times of day ("HH:MM"); informational only.
    pub time_of_day: Vec<String>,
    pub notes: Option<String>,
    pub image_url: Option<String>,
    pub reminder_enabled: bool,
    pub next_reminder: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-user contact details and channel preferences.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Same value as the user id.
    pub id: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub name: Option<String>,
    pub email_reminder_enabled: bool,
    pub sms_reminder_enabled: bool,
    pub push_reminder_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn contact_preferences(&self) -> ContactPreferences {
        ContactPreferences {
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
            email_enabled: self.email_reminder_enabled,
            sms_enabled: self.sms_reminder_enabled,
            push_enabled: self.push_reminder_enabled,
        }
    }
}

/// The part of a profile the dispatcher needs.
///
/// Users without a profile row get the default: push only, no contacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactPreferences {
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub email_enabled: bool,
    pub sms_enabled: bool,
    pub push_enabled: bool,
}

impl Default for ContactPreferences {
    fn default() -> Self {
        Self {
            email: None,
            phone_number: None,
            email_enabled: false,
            sms_enabled: false,
            push_enabled: true,
        }
    }
}

impl ContactPreferences {
    /// The email address, if email reminders are on and the address is not blank.
    pub fn email_target(&self) -> Option<&str> {
        non_blank(self.email.as_deref()).filter(|_| self.email_enabled)
    }

    /// The phone number, if SMS reminders are on and the number is not blank.
    pub fn sms_target(&self) -> Option<&str> {
        non_blank(self.phone_number.as_deref()).filter(|_| self.sms_enabled)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A medication selected for dispatch together with its owner's preferences.
#[derive(Debug, Clone, PartialEq)]
pub struct DueReminder {
    pub medication: Medication,
    pub contact: ContactPreferences,
}

/// A browser push endpoint. Keys are base64url without padding.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub id: String,
    pub user_id: String,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    pub created_at: DateTime<Utc>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderChannel {
    Email,
    Sms,
    Push,
    Snooze,
}

impl ReminderChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderChannel::Email => "email",
            ReminderChannel::Sms => "sms",
            ReminderChannel::Push => "push",
            ReminderChannel::Snooze => "snooze",
        }
    }
}

impl fmt::Display for ReminderChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(ReminderChannel::Email),
            "sms" => Ok(ReminderChannel::Sms),
            "push" => Ok(ReminderChannel::Push),
            "snooze" => Ok(ReminderChannel::Snooze),
            other => Err(format!("unknown reminder channel '{}'", other)),
        }
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Success,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Success => "success",
            DeliveryStatus::Failed => "failed",
        }
    }
}

impl FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(DeliveryStatus::Success),
            "failed" => Ok(DeliveryStatus::Failed),
            other => Err(format!("unknown delivery status '{}'", other)),
        }
    }
}

/// One row of the append-only reminder history.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderHistory {
    pub id: String,
    pub medication_id: Option<String>,
    pub user_id: Option<String>,
    #[serde(rename = "type")]
    pub channel: ReminderChannel,
    pub status: DeliveryStatus,
    pub error_message: Option<String>,
    pub sent_at: DateTime<Utc>,
}

impl ReminderHistory {
    pub fn success(medication: &Medication, channel: ReminderChannel, sent_at: DateTime<Utc>) -> Self {
        Self::entry(medication, channel, DeliveryStatus::Success, None, sent_at)
    }

    pub fn failed(
        medication: &Medication,
        channel: ReminderChannel,
        error_message: String,
        sent_at: DateTime<Utc>,
    ) -> Self {
        Self::entry(
            medication,
            channel,
            DeliveryStatus::Failed,
            Some(error_message),
            sent_at,
        )
    }

    fn entry(
        medication: &Medication,
        channel: ReminderChannel,
        status: DeliveryStatus,
        error_message: Option<String>,
        sent_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            medication_id: Some(medication.id.clone()),
            user_id: Some(medication.user_id.clone()),
            channel,
            status,
            error_message,
            sent_at,
        }
    }
}

/// The shared VAPID key pair. Both halves are base64url without padding.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VapidKeyPair {
    pub id: String,
    pub public_key: String,
    #[serde(skip_serializing)]
    pub private_key: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_profile_defaults_to_push_only() {
        let contact = ContactPreferences::default();
        assert!(contact.push_enabled);
        assert!(contact.email_target().is_none());
        assert!(contact.sms_target().is_none());
    }

    #[test]
    fn test_blank_contact_fields_are_not_targets() {
        let contact = ContactPreferences {
            email: Some("   ".into()),
            phone_number: Some("".into()),
            email_enabled: true,
            sms_enabled: true,
            push_enabled: false,
        };
        assert!(contact.email_target().is_none());
        assert!(contact.sms_target().is_none());
    }

    #[test]
    fn test_disabled_channel_hides_contact() {
        let contact = ContactPreferences {
            email: Some("ana@example.com".into()),
            phone_number: Some("+15550001111".into()),
            email_enabled: false,
            sms_enabled: true,
            push_enabled: true,
        };
        assert!(contact.email_target().is_none());
        assert_eq!(contact.sms_target(), Some("+15550001111"));
    }

    #[test]
    fn test_history_serializes_channel_as_type() {
        let now = Utc::now();
        let row = ReminderHistory {
            id: "h1".into(),
            medication_id: Some("m1".into()),
            user_id: Some("u1".into()),
            channel: ReminderChannel::Snooze,
            status: DeliveryStatus::Success,
            error_message: None,
            sent_at: now,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["type"], "snooze");
        assert_eq!(json["status"], "success");
    }

    #[test]
    fn test_vapid_private_key_not_serialized() {
        let pair = VapidKeyPair {
            id: "k1".into(),
            public_key: "pub".into(),
            private_key: "priv".into(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&pair).unwrap();
        assert!(json.get("private_key").is_none());
    }
}
