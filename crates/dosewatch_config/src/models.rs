// --- File: crates/dosewatch_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8086,
        }
    }
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. sqlite://data/dosewatch.db, set via DOSEWATCH__DATABASE__URL
}

// --- Logging Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory for daily rolling log files. Stdout only when unset.
    #[serde(default)]
    pub directory: Option<String>,
    /// Also ship events to journald (Linux only, ignored elsewhere).
    #[serde(default)]
    pub journald: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
            journald: false,
        }
    }
}

// --- Web Push Config ---
// The VAPID pair may come from here or from the vapid_keys table; config wins.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PushConfig {
    /// Contact URI placed in the VAPID `sub` claim, e.g. mailto:support@example.com
    pub vapid_subject: String,
    pub vapid_public_key: Option<String>,
    pub vapid_private_key: Option<String>, // usually "secret_from_env"
    #[serde(default = "default_click_url")]
    pub click_url: String,
    #[serde(default)]
    pub sound: Option<String>,
    #[serde(default = "default_push_ttl")]
    pub ttl_secs: u32,
}

fn default_click_url() -> String {
    "/dashboard".to_string()
}

fn default_push_ttl() -> u32 {
    86_400
}

// --- Email Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmailConfig {
    pub api_key: String, // "secret_from_env" -> DOSEWATCH_SECRET_EMAIL_API_KEY or EMAIL_API_KEY
    pub from: String,    // e.g. "DoseWatch <reminders@dosewatch.app>"
    #[serde(default = "default_email_api_base_url")]
    pub api_base_url: String,
}

fn default_email_api_base_url() -> String {
    "https://api.resend.com".to_string()
}

// --- Twilio Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TwilioConfig {
    pub account_sid: String, // DOSEWATCH__TWILIO__ACCOUNT_SID or TWILIO_ACCOUNT_SID
    pub auth_token: String,  // "secret_from_env" -> TWILIO_AUTH_TOKEN
    pub phone_number: String,
    #[serde(default = "default_twilio_api_base_url")]
    pub api_base_url: String,
}

fn default_twilio_api_base_url() -> String {
    "https://api.twilio.com".to_string()
}

// --- Reminder workflow Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ReminderConfig {
    /// Externally reachable base URL, used to build snooze links.
    pub public_base_url: String,
    /// HMAC key for snooze links. Links are omitted when unset.
    pub link_secret: Option<String>,
    pub sms_snooze_links: bool,
    pub snooze_link_hours: Vec<u32>,
    pub snooze_link_ttl_hours: i64,
    pub claim_lease_secs: i64,
    pub max_snooze_hours: f64,
    /// IANA zone used when rendering times in messages.
    pub display_timezone: String,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            public_base_url: "http://localhost:8086".to_string(),
            link_secret: None,
            sms_snooze_links: true,
            snooze_link_hours: vec![1, 3, 24],
            snooze_link_ttl_hours: 48,
            claim_lease_secs: 300,
            max_snooze_hours: 168.0,
            display_timezone: "UTC".to_string(),
        }
    }
}

// --- Scheduler Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SchedulerConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 60,
        }
    }
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_push: bool,
    #[serde(default)]
    pub use_email: bool,
    #[serde(default)]
    pub use_sms: bool,

    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,

    // --- Optional channel configurations ---
    #[serde(default)]
    pub push: Option<PushConfig>,
    #[serde(default)]
    pub email: Option<EmailConfig>,
    #[serde(default)]
    pub twilio: Option<TwilioConfig>,

    #[serde(default)]
    pub reminders: ReminderConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}
