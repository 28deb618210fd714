//! SMTP delivery.

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

use crate::config::MailConfig;
use crate::notify::{NotificationMessage, Notifier, NotifyError};

/// Sends notifications through an authenticated SMTP relay over STARTTLS.
///
/// The account user name doubles as the sender address. No connection is
/// opened until the first message is sent.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, NotifyError> {
        let from: Mailbox = config.username.parse()?;
        let to: Mailbox = config.target_email.parse()?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        Ok(Self { transport, from, to })
    }
}

#[async_trait]
impl Notifier for SmtpMailer {
    async fn send(&self, message: &NotificationMessage) -> Result<(), NotifyError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())?;

        let response = self.transport.send(email).await?;
        tracing::debug!(code = %response.code(), "SMTP server accepted message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MailConfig {
        MailConfig {
            username: "relay@gmail.com".into(),
            password: "app-password".into(),
            target_email: "inbox@example.com".into(),
            ..MailConfig::default()
        }
    }

    #[tokio::test]
    async fn test_builds_without_connecting() {
        let mailer = SmtpMailer::new(&config()).unwrap();
        assert_eq!(mailer.from.email.to_string(), "relay@gmail.com");
        assert_eq!(mailer.to.email.to_string(), "inbox@example.com");
    }

    #[test]
    fn test_rejects_bad_sender() {
        let mut config = config();
        config.username = "not an address".into();
        assert!(matches!(SmtpMailer::new(&config), Err(NotifyError::Address(_))));
    }
}
