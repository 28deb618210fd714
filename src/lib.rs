//! Contact form relay library.
//!
//! Accepts `POST /api/request` submissions (name, email, phone), limits each
//! client to a few submissions per window, validates the body and forwards
//! it as an email to a fixed recipient.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod notify;
pub mod observability;
pub mod security;
pub mod validation;

pub use config::schema::RelayConfig;
pub use error::RelayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
