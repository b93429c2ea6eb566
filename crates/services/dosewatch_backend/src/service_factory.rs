// --- File: crates/services/dosewatch_backend/src/service_factory.rs ---
//! Service factory implementation.
//!
//! Builds the channel senders that are compiled in, switched on with their
//! `use_*` flag, and configured. A channel whose client cannot be built is
//! logged and left out; the reminder workflow then skips it.
use dosewatch_common::services::{EmailSender, PushSender, ServiceFactory, SmsSender};
use dosewatch_config::AppConfig;
use std::sync::Arc;
#[allow(unused_imports)] // only some channels are compiled in
use {
    dosewatch_common::{create_client, shared_client},
    tracing::{error, info, warn},
};

#[cfg(feature = "push")]
use dosewatch_push::{VapidKeys, VapidSigner, WebPushClient};

#[cfg(feature = "email")]
use dosewatch_email::EmailClient;

#[cfg(feature = "twilio")]
use dosewatch_twilio::TwilioSmsClient;

/// Timeout for provider calls, in seconds.
#[allow(dead_code)]
const PROVIDER_TIMEOUT_SECS: u64 = 30;

#[derive(Default)]
pub struct DoseWatchServiceFactory {
    push: Option<Arc<dyn PushSender>>,
    email: Option<Arc<dyn EmailSender>>,
    sms: Option<Arc<dyn SmsSender>>,
}

impl DoseWatchServiceFactory {
    /// Email and SMS senders; push is added with [`Self::with_push`] once the
    /// VAPID key pair is resolved.
    #[allow(unused_variables, unused_mut)]
    pub fn new(config: &Arc<AppConfig>) -> Self {
        let mut factory = Self::default();

        #[cfg(feature = "email")]
        {
            if dosewatch_common::is_email_enabled(config) {
                factory.email = build_email(config);
            } else {
                info!("Email reminders are switched off");
            }
        }

        #[cfg(feature = "twilio")]
        {
            if dosewatch_common::is_twilio_enabled(config) {
                factory.sms = build_sms(config);
            } else {
                info!("SMS reminders are switched off");
            }
        }

        factory
    }

    /// Push stays off without a key pair.
    #[cfg(feature = "push")]
    pub fn with_push(mut self, config: &Arc<AppConfig>, vapid_keys: Option<&VapidKeys>) -> Self {
        if dosewatch_common::is_push_enabled(config) {
            self.push = build_push(config, vapid_keys);
        } else {
            info!("Push reminders are switched off");
        }
        self
    }
}

#[allow(dead_code)]
fn http_client() -> reqwest::Client {
    create_client(PROVIDER_TIMEOUT_SECS, false).unwrap_or_else(|err| {
        warn!("Falling back to the shared HTTP client: {}", err);
        shared_client()
    })
}

#[cfg(feature = "push")]
fn build_push(config: &Arc<AppConfig>, vapid_keys: Option<&VapidKeys>) -> Option<Arc<dyn PushSender>> {
    let push = config.push.as_ref()?;
    let Some(keys) = vapid_keys else {
        warn!("Push is enabled but no VAPID key pair is available");
        return None;
    };
    match VapidSigner::new(keys, &push.vapid_subject) {
        Ok(signer) => {
            info!("Web Push sender ready");
            Some(Arc::new(WebPushClient::new(http_client(), signer, push.ttl_secs)))
        }
        Err(err) => {
            error!("Cannot build the Web Push sender: {}", err);
            None
        }
    }
}

#[cfg(feature = "email")]
fn build_email(config: &Arc<AppConfig>) -> Option<Arc<dyn EmailSender>> {
    let email = config.email.as_ref()?;
    match EmailClient::new(http_client(), email.clone()) {
        Ok(client) => {
            info!("Email sender ready ({})", email.api_base_url);
            Some(Arc::new(client))
        }
        Err(err) => {
            error!("Cannot build the email sender: {}", err);
            None
        }
    }
}

#[cfg(feature = "twilio")]
fn build_sms(config: &Arc<AppConfig>) -> Option<Arc<dyn SmsSender>> {
    let twilio = config.twilio.as_ref()?;
    match TwilioSmsClient::new(http_client(), twilio.clone()) {
        Ok(client) => {
            info!("Twilio SMS sender ready");
            Some(Arc::new(client))
        }
        Err(err) => {
            error!("Cannot build the Twilio SMS sender: {}", err);
            None
        }
    }
}

impl ServiceFactory for DoseWatchServiceFactory {
    fn push_sender(&self) -> Option<Arc<dyn PushSender>> {
        self.push.clone()
    }

    fn email_sender(&self) -> Option<Arc<dyn EmailSender>> {
        self.email.clone()
    }

    fn sms_sender(&self) -> Option<Arc<dyn SmsSender>> {
        self.sms.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switched_off_channels_yield_no_senders() {
        let config = Arc::new(AppConfig::default());
        let factory = DoseWatchServiceFactory::new(&config);
        #[cfg(feature = "push")]
        let factory = factory.with_push(&config, None);
        assert!(factory.push_sender().is_none());
        assert!(factory.email_sender().is_none());
        assert!(factory.sms_sender().is_none());
    }

    #[cfg(feature = "email")]
    #[test]
    fn test_enabled_email_with_config_yields_sender() {
        let config = Arc::new(AppConfig {
            use_email: true,
            email: Some(dosewatch_config::EmailConfig {
                api_key: "re_123".into(),
                from: "DoseWatch <reminders@dosewatch.app>".into(),
                api_base_url: "https://api.resend.com".into(),
            }),
            ..AppConfig::default()
        });
        let factory = DoseWatchServiceFactory::new(&config);
        assert!(factory.email_sender().is_some());
    }
}
