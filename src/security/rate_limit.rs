//! Fixed-window admission control per client identity.

use std::sync::Arc;
use std::time::{Duration, Instant};
use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use tokio::sync::broadcast;
use tokio::time;

use crate::config::RateLimitConfig;
use crate::error::RelayError;
use crate::http::request::{client_identity, ClientIdentity};
use crate::http::response::apply_rate_limit_headers;
use crate::observability::metrics;
use crate::security::clock::{Clock, SystemClock};
use crate::security::store::{CounterStore, MemoryStore, WindowCounter};

/// Rate limit state reported back to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Maximum accepted requests per window.
    pub limit: u32,
    /// Requests left in the current window.
    pub remaining: u32,
    /// Time until the current window ends.
    pub reset: Duration,
    /// Length of a window.
    pub window: Duration,
}

/// Outcome of a single admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub info: RateLimitInfo,
}

/// Admission controller: at most `max_requests` per identity per `window`.
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    clock: Arc<dyn Clock>,
    window: Duration,
    max_requests: u32,
    trust_forwarded_for: bool,
}

impl RateLimiter {
    /// Limiter with an in-memory store and the system clock.
    pub fn new(config: &RateLimitConfig) -> Self {
        Self::with_parts(config, Arc::new(MemoryStore::new()), Arc::new(SystemClock))
    }

    /// Limiter over an injected store and clock.
    pub fn with_parts(
        config: &RateLimitConfig,
        store: Arc<dyn CounterStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            clock,
            window: Duration::from_secs(config.window_secs),
            max_requests: config.max_requests,
            trust_forwarded_for: config.trust_forwarded_for,
        }
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn trust_forwarded_for(&self) -> bool {
        self.trust_forwarded_for
    }

    /// Record a hit for `identity` at `now` and decide whether to admit it.
    ///
    /// Denied hits are recorded too, so a throttled client stays throttled
    /// until its window ends.
    pub fn check_and_record(&self, identity: &str, now: Instant) -> Decision {
        let counter = self
            .store
            .set_if_absent_or_expired(identity, now, self.window)
            .or_else(|| self.store.increment(identity))
            // Swept between the two calls; treat as a first hit.
            .unwrap_or(WindowCounter {
                window_start: now,
                count: 1,
            });

        Decision {
            allowed: counter.count <= self.max_requests,
            info: RateLimitInfo {
                limit: self.max_requests,
                remaining: self.max_requests.saturating_sub(counter.count),
                reset: counter.remaining_window(now, self.window),
                window: self.window,
            },
        }
    }

    /// Info sent when a request is refused without a known identity.
    pub fn unidentified(&self) -> RateLimitInfo {
        RateLimitInfo {
            limit: self.max_requests,
            remaining: 0,
            reset: self.window,
            window: self.window,
        }
    }

    /// Drop expired counters.
    pub fn sweep(&self) -> usize {
        self.store.sweep_expired(self.clock.now(), self.window)
    }

    pub fn tracked_clients(&self) -> usize {
        self.store.len()
    }

    /// Periodically sweep expired counters until shutdown.
    pub async fn run_sweeper(self: Arc<Self>, every: Duration, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(interval_secs = every.as_secs(), "Counter sweeper starting");

        let mut ticker = time::interval(every);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.sweep();
                    let tracked = self.tracked_clients();
                    metrics::record_tracked_clients(tracked);
                    if removed > 0 {
                        tracing::debug!(removed, tracked, "Swept expired rate limit counters");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Counter sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}

/// Middleware enforcing the limiter before the request reaches its handler.
///
/// Requests without a determinable client identity are refused.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let Some(identity) = client_identity(request.headers(), peer, limiter.trust_forwarded_for()) else {
        tracing::warn!("Client identity unavailable, refusing request");
        metrics::record_rate_limited();
        return RelayError::RateLimited(limiter.unidentified()).into_response();
    };

    let decision = limiter.check_and_record(&identity, limiter.now());
    if !decision.allowed {
        tracing::warn!(
            client = %identity,
            reset_secs = decision.info.reset.as_secs(),
            "Rate limit exceeded"
        );
        metrics::record_rate_limited();
        return RelayError::RateLimited(decision.info).into_response();
    }

    request.extensions_mut().insert(ClientIdentity(identity));
    let mut response = next.run(request).await;
    apply_rate_limit_headers(response.headers_mut(), &decision.info);
    response
}
