//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Root configuration for the request relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (host and port).
    pub listener: ListenerConfig,

    /// Admission control settings.
    pub rate_limit: RateLimitConfig,

    /// Outbound mail settings.
    pub mail: MailConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host name or address to bind.
    pub host: String,

    /// TCP port to bind.
    pub port: u16,
}

impl ListenerConfig {
    /// `host:port` for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3000,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Window length in seconds.
    pub window_secs: u64,

    /// Accepted requests per client per window.
    pub max_requests: u32,

    /// Take the client identity from `X-Forwarded-For`. Only enable behind
    /// a proxy that overwrites the header.
    pub trust_forwarded_for: bool,

    /// Seconds between sweeps of expired counters (0 disables sweeping).
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 15 * 60,
            max_requests: 3,
            trust_forwarded_for: false,
            sweep_interval_secs: 60,
        }
    }
}

/// How notifications leave the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MailTransport {
    /// SMTP submission with STARTTLS.
    Smtp,
    /// POST to an HTTP mail API.
    Http,
    /// Write to the log only.
    Log,
}

impl FromStr for MailTransport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "smtp" => Ok(Self::Smtp),
            "http" => Ok(Self::Http),
            "log" => Ok(Self::Log),
            other => Err(format!("unknown mail transport '{other}'")),
        }
    }
}

/// Outbound mail configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MailConfig {
    pub transport: MailTransport,

    /// SMTP relay host, reached on `smtp_port` with STARTTLS.
    pub smtp_host: String,

    pub smtp_port: u16,

    /// Mail API endpoint receiving send requests (`http` transport only).
    pub api_url: String,

    /// Account user name, also used as the sender address.
    pub username: String,

    /// Account password.
    pub password: String,

    /// Address every notification is sent to.
    pub target_email: String,

    /// Timeout for a single send, in seconds.
    pub timeout_secs: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            transport: MailTransport::Smtp,
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            api_url: String::new(),
            username: String::new(),
            password: String::new(),
            target_email: String::new(),
            timeout_secs: 10,
        }
    }
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("transport", &self.transport)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("api_url", &self.api_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("target_email", &self.target_email)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 16 * 1024,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "request_relay=info,tower_http=info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9100".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.listener.bind_address(), "localhost:3000");
        assert_eq!(config.rate_limit.window_secs, 900);
        assert_eq!(config.rate_limit.max_requests, 3);
        assert!(!config.rate_limit.trust_forwarded_for);
        assert_eq!(config.mail.transport, MailTransport::Smtp);
        assert_eq!(config.mail.smtp_host, "smtp.gmail.com");
        assert_eq!(config.mail.smtp_port, 587);
        assert!(config.mail.api_url.is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: RelayConfig = toml::from_str(
            r#"
            [listener]
            port = 8080

            [mail]
            transport = "log"
            target_email = "inbox@example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.host, "localhost");
        assert_eq!(config.listener.port, 8080);
        assert_eq!(config.mail.transport, MailTransport::Log);
        assert_eq!(config.mail.timeout_secs, 10);
        assert_eq!(config.rate_limit.max_requests, 3);
    }

    #[test]
    fn test_mail_debug_hides_password() {
        let mail = MailConfig {
            password: "hunter2".into(),
            ..MailConfig::default()
        };
        assert!(!format!("{mail:?}").contains("hunter2"));
    }

    #[test]
    fn test_transport_from_str() {
        assert_eq!("SMTP".parse::<MailTransport>(), Ok(MailTransport::Smtp));
        assert_eq!("HTTP".parse::<MailTransport>(), Ok(MailTransport::Http));
        assert_eq!(" log ".parse::<MailTransport>(), Ok(MailTransport::Log));
        assert!("pigeon".parse::<MailTransport>().is_err());
    }
}
