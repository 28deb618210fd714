//! HTTP mail API client.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::config::MailConfig;
use crate::notify::{NotificationMessage, Notifier, NotifyError};

/// JSON payload posted to the mail service.
#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Delivers notifications through an HTTP mail API using basic auth.
///
/// The sender address is the account user name.
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    username: String,
    password: String,
    recipient: String,
}

impl HttpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            recipient: config.target_email.clone(),
        })
    }
}

#[async_trait]
impl Notifier for HttpMailer {
    async fn send(&self, message: &NotificationMessage) -> Result<(), NotifyError> {
        let payload = SendRequest {
            from: &self.username,
            to: &self.recipient,
            subject: &message.subject,
            text: &message.body,
        };

        let response = self
            .client
            .post(&self.api_url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(status = %status, "Mail service accepted message");
        Ok(())
    }
}
