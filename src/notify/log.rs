//! Notifier that only logs. For local development without mail credentials.

use async_trait::async_trait;

use crate::notify::{NotificationMessage, Notifier, NotifyError};

pub struct LogNotifier {
    recipient: String,
}

impl LogNotifier {
    pub fn new(recipient: &str) -> Self {
        Self {
            recipient: recipient.to_string(),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: &NotificationMessage) -> Result<(), NotifyError> {
        tracing::info!(
            to = %self.recipient,
            subject = %message.subject,
            body = %message.body,
            "Notification (log transport)"
        );
        Ok(())
    }
}
