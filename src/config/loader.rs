//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::{MailTransport, RelayConfig};
use crate::config::validation::{validate_config, ConfigIssue};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {message}")]
    Env { var: &'static str, message: String },

    #[error("Validation failed: {}", join_issues(.0))]
    Validation(Vec<ConfigIssue>),
}

fn join_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: optional TOML file, then process environment
/// overrides, then validation.
pub fn load_config(path: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_file(path)?,
        None => RelayConfig::default(),
    };

    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn parse_file(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Overlay environment variables onto `config`.
///
/// | Variable         | Field                |
/// |------------------|----------------------|
/// | `HOST`           | `listener.host`      |
/// | `PORT`           | `listener.port`      |
/// | `EMAIL_USER`     | `mail.username`      |
/// | `EMAIL_PASS`     | `mail.password`      |
/// | `TARGET_EMAIL`   | `mail.target_email`  |
/// | `SMTP_HOST`      | `mail.smtp_host`     |
/// | `SMTP_PORT`      | `mail.smtp_port`     |
/// | `MAIL_API_URL`   | `mail.api_url`       |
/// | `MAIL_TRANSPORT` | `mail.transport`     |
pub fn apply_env_overrides<F>(config: &mut RelayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("HOST") {
        config.listener.host = host;
    }
    if let Some(port) = lookup("PORT") {
        config.listener.port = port.trim().parse().map_err(|e| ConfigError::Env {
            var: "PORT",
            message: format!("'{port}': {e}"),
        })?;
    }
    if let Some(user) = lookup("EMAIL_USER") {
        config.mail.username = user;
    }
    if let Some(pass) = lookup("EMAIL_PASS") {
        config.mail.password = pass;
    }
    if let Some(target) = lookup("TARGET_EMAIL") {
        config.mail.target_email = target;
    }
    if let Some(host) = lookup("SMTP_HOST") {
        config.mail.smtp_host = host;
    }
    if let Some(port) = lookup("SMTP_PORT") {
        config.mail.smtp_port = port.trim().parse().map_err(|e| ConfigError::Env {
            var: "SMTP_PORT",
            message: format!("'{port}': {e}"),
        })?;
    }
    if let Some(url) = lookup("MAIL_API_URL") {
        config.mail.api_url = url;
    }
    if let Some(transport) = lookup("MAIL_TRANSPORT") {
        config.mail.transport = transport
            .parse::<MailTransport>()
            .map_err(|message| ConfigError::Env {
                var: "MAIL_TRANSPORT",
                message,
            })?;
    }
    Ok(())
}
