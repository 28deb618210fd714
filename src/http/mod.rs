//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, limits, timeout)
//!     → security::rate_limit (admission, POST /api/request only)
//!     → handler.rs (decode body, validate, notify)
//!     → response.rs (status, JSON body, rate limit headers)
//!     → Send to client
//! ```

pub mod handler;
pub mod request;
pub mod response;
pub mod server;

pub use request::{ClientIdentity, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
