// --- File: crates/dosewatch_twilio/src/twilio_sms.rs ---
use dosewatch_common::notifications::{SmsMessage, MAX_SMS_CHARS};
use dosewatch_config::TwilioConfig;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::service::TwilioError;

/// The subset of a Twilio Message resource we care about.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct TwilioMessage {
    pub sid: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TwilioErrorBody {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Clone)]
pub struct TwilioSmsClient {
    client: Client,
    config: TwilioConfig,
}

impl TwilioSmsClient {
    pub fn new(client: Client, config: TwilioConfig) -> Result<Self, TwilioError> {
        if config.account_sid.trim().is_empty()
            || config.auth_token.trim().is_empty()
            || config.phone_number.trim().is_empty()
        {
            return Err(TwilioError::ConfigError);
        }
        Ok(Self { client, config })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.account_sid
        )
    }

    /// Posts one message to the Messages API.
    pub async fn send_sms(&self, message: &SmsMessage) -> Result<TwilioMessage, TwilioError> {
        if message.to.trim().is_empty() {
            return Err(TwilioError::InvalidMessage("recipient is empty".into()));
        }
        if message.body.chars().count() > MAX_SMS_CHARS {
            return Err(TwilioError::InvalidMessage(format!(
                "body exceeds {} characters",
                MAX_SMS_CHARS
            )));
        }

        let params = [
            ("To", message.to.as_str()),
            ("From", self.config.phone_number.as_str()),
            ("Body", message.body.as_str()),
        ];
        debug!("Sending SMS to {}", message.to);

        let resp = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&params)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            error!("Twilio returned {}: {}", status, body);
            let message = match serde_json::from_str::<TwilioErrorBody>(&body) {
                Ok(TwilioErrorBody {
                    code: Some(code),
                    message: Some(msg),
                }) => format!("{} (code {})", msg, code),
                Ok(TwilioErrorBody {
                    message: Some(msg), ..
                }) => msg,
                _ => body,
            };
            return Err(TwilioError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let sent: TwilioMessage = serde_json::from_str(&body)
            .map_err(|e| TwilioError::InternalError(format!("unexpected Twilio response: {}", e)))?;
        info!("SMS {} accepted for {}", sent.sid, message.to);
        Ok(sent)
    }
}
