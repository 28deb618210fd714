//! Response bodies and headers for the submission endpoint.
//!
//! # Responsibilities
//! - Map `RelayError` variants to status codes and JSON bodies
//! - Attach rate limit headers (`RateLimit-Policy`, `RateLimit`, `Retry-After`)
//!
//! # Design Decisions
//! - Reset information travels in headers only, never in the body
//! - No legacy `X-RateLimit-*` headers

use axum::{
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::RelayError;
use crate::security::RateLimitInfo;
use crate::validation::FieldIssue;

pub const RATELIMIT: HeaderName = HeaderName::from_static("ratelimit");
pub const RATELIMIT_POLICY: HeaderName = HeaderName::from_static("ratelimit-policy");

const RATE_LIMITED_MESSAGE: &str = "Too many requests, please try again later.";

/// Body of a successful submission.
#[derive(Debug, Serialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub fn new() -> Self {
        Self { success: true }
    }
}

impl Default for Success {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    issues: Option<&'a [FieldIssue]>,
}

impl<'a> ErrorBody<'a> {
    fn new(error: &'static str) -> Self {
        Self {
            success: false,
            error,
            message: None,
            issues: None,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            RelayError::Validation(err) => {
                let body = ErrorBody {
                    issues: Some(err.issues()),
                    ..ErrorBody::new("validation_failed")
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            RelayError::RateLimited(info) => {
                let body = ErrorBody {
                    message: Some(RATE_LIMITED_MESSAGE),
                    ..ErrorBody::new("rate_limited")
                };
                let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
                let headers = response.headers_mut();
                apply_rate_limit_headers(headers, &info);
                headers.insert(header::RETRY_AFTER, HeaderValue::from(ceil_secs(&info)));
                response
            }
            RelayError::Delivery(_) => {
                (StatusCode::BAD_GATEWAY, Json(ErrorBody::new("notification_failed"))).into_response()
            }
        }
    }
}

/// Set the combined `RateLimit` header and its policy.
pub fn apply_rate_limit_headers(headers: &mut HeaderMap, info: &RateLimitInfo) {
    let policy = format!("{};w={}", info.limit, info.window.as_secs());
    let state = format!(
        "limit={}, remaining={}, reset={}",
        info.limit,
        info.remaining,
        ceil_secs(info)
    );

    if let Ok(value) = HeaderValue::from_str(&policy) {
        headers.insert(RATELIMIT_POLICY, value);
    }
    if let Ok(value) = HeaderValue::from_str(&state) {
        headers.insert(RATELIMIT, value);
    }
}

/// Seconds until reset, rounded up so clients never retry early.
fn ceil_secs(info: &RateLimitInfo) -> u64 {
    let reset = info.reset;
    reset.as_secs() + u64::from(reset.subsec_nanos() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{IssueCode, ValidationError};
    use std::time::Duration;

    fn info(remaining: u32, reset: Duration) -> RateLimitInfo {
        RateLimitInfo {
            limit: 3,
            remaining,
            reset,
            window: Duration::from_secs(900),
        }
    }

    #[test]
    fn test_rate_limit_headers() {
        let mut headers = HeaderMap::new();
        apply_rate_limit_headers(&mut headers, &info(1, Duration::from_millis(600_200)));

        assert_eq!(headers[RATELIMIT_POLICY], "3;w=900");
        assert_eq!(headers[RATELIMIT], "limit=3, remaining=1, reset=601");
        assert!(headers.keys().all(|k| !k.as_str().starts_with("x-ratelimit")));
    }

    #[test]
    fn test_rate_limited_response() {
        let response = RelayError::RateLimited(info(0, Duration::from_secs(120))).into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "120");
        assert_eq!(response.headers()[RATELIMIT], "limit=3, remaining=0, reset=120");
    }

    #[test]
    fn test_validation_response_status() {
        let err = ValidationError::new(vec![FieldIssue::new("phone", IssueCode::InvalidLength, "bad")]);
        let response = RelayError::Validation(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
