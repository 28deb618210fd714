//! Request inspection helpers.
//!
//! # Responsibilities
//! - Read the request ID set by the request-id layer
//! - Derive the client identity used for admission control
//!
//! # Design Decisions
//! - `X-Forwarded-For` is only honoured when explicitly trusted; otherwise
//!   any client could pick its own identity

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Identity of the client a request was admitted for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity(pub String);

/// Request ID from the headers, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Client identity for rate limiting.
///
/// Uses the first `X-Forwarded-For` address when `trust_forwarded_for` is
/// set and the header holds a valid IP, the peer address otherwise.
pub fn client_identity(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_forwarded_for: bool,
) -> Option<String> {
    if trust_forwarded_for {
        let forwarded = headers
            .get(X_FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|first| first.trim().parse::<IpAddr>().ok());

        if let Some(ip) = forwarded {
            return Some(ip.to_string());
        }
    }

    peer.map(|addr| addr.ip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<SocketAddr> {
        Some("192.168.1.7:51234".parse().unwrap())
    }

    #[test]
    fn test_identity_from_peer() {
        let headers = HeaderMap::new();
        assert_eq!(client_identity(&headers, peer(), false), Some("192.168.1.7".into()));
    }

    #[test]
    fn test_forwarded_for_ignored_unless_trusted() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("203.0.113.9, 10.0.0.1"));

        assert_eq!(client_identity(&headers, peer(), false), Some("192.168.1.7".into()));
        assert_eq!(client_identity(&headers, peer(), true), Some("203.0.113.9".into()));
    }

    #[test]
    fn test_garbage_forwarded_for_falls_back_to_peer() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("not-an-ip"));
        assert_eq!(client_identity(&headers, peer(), true), Some("192.168.1.7".into()));
    }

    #[test]
    fn test_no_identity() {
        assert_eq!(client_identity(&HeaderMap::new(), None, true), None);
    }

    #[test]
    fn test_request_id_default() {
        assert_eq!(request_id(&HeaderMap::new()), "unknown");
    }
}
