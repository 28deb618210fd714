//! Outbound notifications.
//!
//! # Data Flow
//! ```text
//! SubmissionRequest (validated)
//!     → NotificationMessage (subject + body, built here)
//!     → Notifier::send
//!         → smtp.rs (SMTP relay with STARTTLS, default)
//!         → mailer.rs (HTTP mail API)
//!         → log.rs (log only, local development)
//! ```
//!
//! # Design Decisions
//! - One message per accepted submission, no retry on failure
//! - The recipient and sender are fixed by configuration

pub mod log;
pub mod mailer;
pub mod smtp;

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use crate::config::{MailConfig, MailTransport};
use crate::validation::SubmissionRequest;

pub use self::log::LogNotifier;
pub use mailer::HttpMailer;
pub use smtp::SmtpMailer;

/// Subject line of every notification.
pub const SUBJECT: &str = "Новая заявка";

/// Message derived from a validated submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationMessage {
    pub subject: String,
    pub body: String,
}

impl From<&SubmissionRequest> for NotificationMessage {
    fn from(request: &SubmissionRequest) -> Self {
        Self {
            subject: SUBJECT.to_string(),
            body: format!(
                "Имя: {}, Email: {}, Телефон: {}",
                request.name(),
                request.email(),
                request.phone()
            ),
        }
    }
}

/// Delivery failure.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("mail transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail service rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("could not build message: {0}")]
    Message(#[from] lettre::error::Error),
}

/// Sends a message to the configured recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &NotificationMessage) -> Result<(), NotifyError>;
}

/// Notifier selected by `mail.transport`.
pub fn build_notifier(config: &MailConfig) -> Result<Arc<dyn Notifier>, NotifyError> {
    match config.transport {
        MailTransport::Smtp => Ok(Arc::new(SmtpMailer::new(config)?)),
        MailTransport::Http => Ok(Arc::new(HttpMailer::new(config)?)),
        MailTransport::Log => Ok(Arc::new(LogNotifier::new(&config.target_email))),
    }
}
