// --- File: crates/dosewatch_reminders/src/context.rs ---
//! Everything a reminder operation needs, built once at startup and passed
//! explicitly to handlers and the scheduler job.

use chrono::Duration;
use chrono_tz::Tz;
use dosewatch_common::services::{EmailSender, PushSender, ServiceFactory, SmsSender};
use dosewatch_config::{PushConfig, ReminderConfig};
use dosewatch_db::{
    DbClient, MedicationRepository, ProfileRepository, PushSubscriptionRepository,
    RepositoryFactory, ReminderHistoryRepository, SqlMedicationRepository, SqlProfileRepository,
    SqlPushSubscriptionRepository, SqlReminderHistoryRepository, SqlRepositoryFactory,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::ReminderError;
use crate::links::SnoozeLinkSigner;

/// Reminder settings resolved from configuration.
#[derive(Debug, Clone)]
pub struct ReminderSettings {
    pub claim_lease: Duration,
    pub max_snooze_hours: f64,
    pub display_timezone: Tz,
    pub push_click_url: String,
    pub push_sound: Option<String>,
    pub sms_snooze_links: bool,
    pub snooze_link_hours: Vec<u32>,
    pub snooze_link_ttl: Duration,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            claim_lease: Duration::seconds(300),
            max_snooze_hours: 168.0,
            display_timezone: Tz::UTC,
            push_click_url: "/dashboard".to_string(),
            push_sound: None,
            sms_snooze_links: false,
            snooze_link_hours: vec![1, 3, 24],
            snooze_link_ttl: Duration::hours(48),
        }
    }
}

impl ReminderSettings {
    pub fn from_config(
        reminders: &ReminderConfig,
        push: Option<&PushConfig>,
    ) -> Result<Self, ReminderError> {
        let display_timezone: Tz = reminders.display_timezone.parse().map_err(|_| {
            ReminderError::Validation(format!(
                "unknown reminders.display_timezone '{}'",
                reminders.display_timezone
            ))
        })?;
        if !(reminders.max_snooze_hours.is_finite() && reminders.max_snooze_hours > 0.0) {
            return Err(ReminderError::Validation(
                "reminders.max_snooze_hours must be a positive number".into(),
            ));
        }
        let claim_lease = bounded(
            "reminders.claim_lease_secs",
            reminders.claim_lease_secs,
            MAX_CLAIM_LEASE_SECS,
            Duration::try_seconds,
        )?;
        let snooze_link_ttl = bounded(
            "reminders.snooze_link_ttl_hours",
            reminders.snooze_link_ttl_hours,
            MAX_SNOOZE_LINK_TTL_HOURS,
            Duration::try_hours,
        )?;
        if let Some(hours) = reminders
            .snooze_link_hours
            .iter()
            .find(|&&h| h == 0 || f64::from(h) > reminders.max_snooze_hours)
        {
            return Err(ReminderError::Validation(format!(
                "reminders.snooze_link_hours entry {} is outside 1..={}",
                hours, reminders.max_snooze_hours
            )));
        }

        Ok(Self {
            claim_lease,
            max_snooze_hours: reminders.max_snooze_hours,
            display_timezone,
            push_click_url: push
                .map(|p| p.click_url.clone())
                .unwrap_or_else(|| "/dashboard".to_string()),
            push_sound: push.and_then(|p| p.sound.clone()),
            sms_snooze_links: reminders.sms_snooze_links && reminders.link_secret.is_some(),
            snooze_link_hours: reminders.snooze_link_hours.clone(),
            snooze_link_ttl,
        })
    }
}

/// Upper bounds for the configured durations.
const MAX_CLAIM_LEASE_SECS: i64 = 86_400;
const MAX_SNOOZE_LINK_TTL_HOURS: i64 = 24 * 365;

/// Positive, at most `max`, and representable as a [`Duration`].
fn bounded(
    name: &str,
    value: i64,
    max: i64,
    to_duration: fn(i64) -> Option<Duration>,
) -> Result<Duration, ReminderError> {
    if value <= 0 || value > max {
        return Err(ReminderError::Validation(format!(
            "{} must be between 1 and {}, got {}",
            name, max, value
        )));
    }
    to_duration(value)
        .ok_or_else(|| ReminderError::Validation(format!("{} is out of range", name)))
}

#[derive(Clone)]
pub struct ReminderContext {
    pub medications: SqlMedicationRepository,
    pub profiles: SqlProfileRepository,
    pub subscriptions: SqlPushSubscriptionRepository,
    pub history: SqlReminderHistoryRepository,
    pub push: Option<Arc<dyn PushSender>>,
    pub email: Option<Arc<dyn EmailSender>>,
    pub sms: Option<Arc<dyn SmsSender>>,
    pub clock: Arc<dyn Clock>,
    pub links: Option<SnoozeLinkSigner>,
    pub settings: ReminderSettings,
}

impl ReminderContext {
    /// A context without any channel senders, using the system clock.
    pub fn new(db_client: DbClient, settings: ReminderSettings) -> Self {
        let factory = SqlRepositoryFactory::new();
        Self {
            medications: factory.create_repository(db_client.clone()),
            profiles: factory.create_repository(db_client.clone()),
            subscriptions: factory.create_repository(db_client.clone()),
            history: factory.create_repository(db_client),
            push: None,
            email: None,
            sms: None,
            clock: Arc::new(SystemClock),
            links: None,
            settings,
        }
    }

    /// Builds the context from configuration and the enabled channel senders.
    pub fn from_config(
        db_client: DbClient,
        services: &dyn ServiceFactory,
        reminders: &ReminderConfig,
        push: Option<&PushConfig>,
    ) -> Result<Self, ReminderError> {
        let settings = ReminderSettings::from_config(reminders, push)?;
        let links = match reminders.link_secret.as_deref() {
            Some(secret) => Some(SnoozeLinkSigner::new(secret, &reminders.public_base_url)?),
            None => {
                if reminders.sms_snooze_links {
                    warn!("reminders.link_secret is not set; SMS reminders go out without snooze links");
                }
                None
            }
        };

        let context = Self::new(db_client, settings)
            .with_push(services.push_sender())
            .with_email(services.email_sender())
            .with_sms(services.sms_sender())
            .with_links(links);

        info!(
            "Reminder channels: push={} email={} sms={}",
            context.push.is_some(),
            context.email.is_some(),
            context.sms.is_some()
        );
        Ok(context)
    }

    pub fn with_push(mut self, sender: Option<Arc<dyn PushSender>>) -> Self {
        self.push = sender;
        self
    }

    pub fn with_email(mut self, sender: Option<Arc<dyn EmailSender>>) -> Self {
        self.email = sender;
        self
    }

    pub fn with_sms(mut self, sender: Option<Arc<dyn SmsSender>>) -> Self {
        self.sms = sender;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_links(mut self, links: Option<SnoozeLinkSigner>) -> Self {
        self.links = links;
        self
    }

    /// Creates every table the workflow touches.
    pub async fn init_schema(&self) -> Result<(), ReminderError> {
        self.profiles.init_schema().await?;
        self.medications.init_schema().await?;
        self.subscriptions.init_schema().await?;
        self.history.init_schema().await?;
        Ok(())
    }
}
