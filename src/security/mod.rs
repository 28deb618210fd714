//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (identify client, check and record hit)
//!         → store.rs (per-identity window counters)
//!         → clock.rs (time source)
//!     → Pass to the submission handler
//! ```
//!
//! # Design Decisions
//! - Fail closed: a request without a client identity is refused
//! - Admission runs before body parsing, so malformed requests still count

pub mod clock;
pub mod rate_limit;
pub mod store;

pub use clock::{Clock, MockClock, SystemClock};
pub use rate_limit::{rate_limit_middleware, Decision, RateLimitInfo, RateLimiter};
pub use store::{CounterStore, MemoryStore, WindowCounter};
