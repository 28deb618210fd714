//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, port valid)
//! - Check mail settings needed by the selected transport
//! - Keep the mail timeout inside the request timeout
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ConfigIssue>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::{MailTransport, RelayConfig};
use crate::validation::schema::is_email;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ConfigIssue {
    pub field: &'static str,
    pub message: String,
}

impl ConfigIssue {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check `config` for semantic errors.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ConfigIssue>> {
    let mut issues = Vec::new();

    if config.listener.host.trim().is_empty() {
        issues.push(ConfigIssue::new("listener.host", "must not be empty"));
    }
    if config.listener.port == 0 {
        issues.push(ConfigIssue::new("listener.port", "must be greater than 0"));
    }

    if config.rate_limit.window_secs == 0 {
        issues.push(ConfigIssue::new("rate_limit.window_secs", "must be greater than 0"));
    }
    if config.rate_limit.max_requests == 0 {
        issues.push(ConfigIssue::new("rate_limit.max_requests", "must be greater than 0"));
    }

    if config.timeouts.request_secs == 0 {
        issues.push(ConfigIssue::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.security.max_body_size == 0 {
        issues.push(ConfigIssue::new("security.max_body_size", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        issues.push(ConfigIssue::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    let mail = &config.mail;
    match mail.transport {
        MailTransport::Smtp => {
            if mail.smtp_host.trim().is_empty() {
                issues.push(ConfigIssue::new("mail.smtp_host", "must not be empty"));
            }
            if mail.smtp_port == 0 {
                issues.push(ConfigIssue::new("mail.smtp_port", "must be greater than 0"));
            }
        }
        MailTransport::Http => match url::Url::parse(&mail.api_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => issues.push(ConfigIssue::new(
                "mail.api_url",
                format!("unsupported scheme '{}'", url.scheme()),
            )),
            Err(e) => issues.push(ConfigIssue::new("mail.api_url", e.to_string())),
        },
        MailTransport::Log => {}
    }
    if mail.transport != MailTransport::Log {
        if !is_email(&mail.username) {
            issues.push(ConfigIssue::new("mail.username", "must be the sender email address"));
        }
        if mail.transport == MailTransport::Smtp && mail.password.is_empty() {
            issues.push(ConfigIssue::new("mail.password", "must not be empty"));
        }
        if mail.timeout_secs == 0 {
            issues.push(ConfigIssue::new("mail.timeout_secs", "must be greater than 0"));
        } else if config.timeouts.request_secs > 0
            && mail.timeout_secs >= config.timeouts.request_secs
        {
            issues.push(ConfigIssue::new(
                "mail.timeout_secs",
                format!(
                    "must be less than timeouts.request_secs ({})",
                    config.timeouts.request_secs
                ),
            ));
        }
    }
    if !is_email(&mail.target_email) {
        issues.push(ConfigIssue::new("mail.target_email", "must be an email address"));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> RelayConfig {
        let mut config = RelayConfig::default();
        config.mail.username = "relay@example.com".into();
        config.mail.password = "app-password".into();
        config.mail.target_email = "inbox@example.com".into();
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_defaults_need_mail_addresses() {
        let issues = validate_config(&RelayConfig::default()).unwrap_err();
        let fields: Vec<_> = issues.iter().map(|i| i.field).collect();
        assert_eq!(fields, vec!["mail.username", "mail.password", "mail.target_email"]);
    }

    #[test]
    fn test_collects_every_issue() {
        let mut config = valid();
        config.listener.port = 0;
        config.rate_limit.max_requests = 0;
        config.mail.transport = MailTransport::Http;
        config.mail.api_url = "ftp://mail.example.com".into();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nowhere".into();

        let issues = validate_config(&config).unwrap_err();
        assert_eq!(issues.len(), 4);
    }

    #[test]
    fn test_http_transport_needs_api_url() {
        let mut config = valid();
        config.mail.transport = MailTransport::Http;
        let issues = validate_config(&config).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "mail.api_url");

        config.mail.api_url = "https://mail.example.com/v1/send".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_smtp_needs_host() {
        let mut config = valid();
        config.mail.smtp_host = " ".into();
        let issues = validate_config(&config).unwrap_err();
        assert_eq!(issues[0].field, "mail.smtp_host");
    }

    #[test]
    fn test_mail_timeout_must_fit_request_timeout() {
        let mut config = valid();
        config.mail.timeout_secs = 30;
        config.timeouts.request_secs = 30;

        let issues = validate_config(&config).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "mail.timeout_secs");

        config.mail.timeout_secs = 29;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_log_transport_skips_http_settings() {
        let mut config = valid();
        config.mail.transport = MailTransport::Log;
        config.mail.username.clear();
        config.mail.api_url = "not a url".into();
        assert!(validate_config(&config).is_ok());
    }
}
