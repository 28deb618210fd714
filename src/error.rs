//! Errors surfaced by the submission endpoint.
//!
//! Each variant maps to one HTTP status in `http::response`.

use crate::notify::NotifyError;
use crate::security::RateLimitInfo;
use crate::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Client sent a body that failed validation (400).
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Client exceeded its submission quota (429).
    #[error("rate limit exceeded, resets in {}s", .0.reset.as_secs())]
    RateLimited(RateLimitInfo),

    /// The notification could not be delivered (502).
    #[error("notification delivery failed: {0}")]
    Delivery(#[from] NotifyError),
}
