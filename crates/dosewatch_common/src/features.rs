//! Feature flag handling for DoseWatch.
//!
//! A channel is live when its crate is compiled in (`push`, `email`, `twilio`
//! cargo features), its `use_*` flag is set, and its config section exists.

use dosewatch_config::AppConfig;
use std::sync::Arc;

/// Returns `true` when the runtime flag is on and the config section is present.
pub fn is_feature_enabled<T>(
    _config: &Arc<AppConfig>,
    use_feature: bool,
    feature_config: Option<&T>,
) -> bool {
    use_feature && feature_config.is_some()
}

#[cfg(feature = "push")]
pub fn is_push_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config, config.use_push, config.push.as_ref())
}

#[cfg(feature = "email")]
pub fn is_email_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config, config.use_email, config.email.as_ref())
}

#[cfg(feature = "twilio")]
pub fn is_twilio_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config, config.use_sms, config.twilio.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dosewatch_config::EmailConfig;

    #[test]
    fn test_flag_without_section_is_disabled() {
        let config = Arc::new(AppConfig {
            use_email: true,
            ..AppConfig::default()
        });
        assert!(!is_feature_enabled(&config, config.use_email, config.email.as_ref()));
    }

    #[test]
    fn test_flag_with_section_is_enabled() {
        let config = Arc::new(AppConfig {
            use_email: true,
            email: Some(EmailConfig {
                api_key: "re_123".into(),
                from: "DoseWatch <reminders@dosewatch.app>".into(),
                api_base_url: "https://api.resend.com".into(),
            }),
            ..AppConfig::default()
        });
        assert!(is_feature_enabled(&config, config.use_email, config.email.as_ref()));
    }
}
