use dosewatch_common::notifications::EmailMessage;
use dosewatch_config::EmailConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Email API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Email API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Email configuration missing or incomplete: {0}")]
    ConfigError(String),

    #[error("Invalid email: {0}")]
    InvalidMessage(String),
}

#[derive(Serialize, Debug)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
}

#[derive(Deserialize, Debug)]
pub struct SendEmailResponse {
    pub id: String,
}

#[derive(Deserialize, Debug)]
struct ApiErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct EmailClient {
    client: Client,
    config: EmailConfig,
}

impl EmailClient {
    pub fn new(client: Client, config: EmailConfig) -> Result<Self, EmailError> {
        if config.api_key.trim().is_empty() {
            return Err(EmailError::ConfigError("email.api_key is empty".into()));
        }
        if config.from.trim().is_empty() {
            return Err(EmailError::ConfigError("email.from is empty".into()));
        }
        Ok(Self { client, config })
    }

    pub async fn send(&self, message: &EmailMessage) -> Result<SendEmailResponse, EmailError> {
        if !message.to.contains('@') {
            return Err(EmailError::InvalidMessage(format!(
                "'{}' is not an email address",
                message.to
            )));
        }

        let url = format!("{}/emails", self.config.api_base_url.trim_end_matches('/'));
        let request = SendEmailRequest {
            from: &self.config.from,
            to: vec![message.to.as_str()],
            subject: &message.subject,
            html: &message.html,
        };
        debug!("Sending email '{}' to {}", message.subject, message.to);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("Email API returned {}: {}", status, body);
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(EmailError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let sent: SendEmailResponse = resp.json().await?;
        info!("Email {} accepted for {}", sent.id, message.to);
        Ok(sent)
    }
}
