//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the submission and health handlers
//! - Wire up middleware (request ID, tracing, metrics, limits, timeout)
//! - Put the rate limiter in front of the submission route only, outside
//!   the body limit so oversized bodies still count against the client
//! - Run the counter sweeper alongside the server
//! - Serve until the shutdown signal fires

use axum::{
    extract::{MatchedPath, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::http::handler::{health, submit};
use crate::notify::{build_notifier, Notifier, NotifyError};
use crate::observability::metrics;
use crate::security::rate_limit::{rate_limit_middleware, RateLimiter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub notifier: Arc<dyn Notifier>,
}

/// HTTP server for the submission relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
    limiter: Arc<RateLimiter>,
}

impl HttpServer {
    /// Create a server with the notifier and limiter described by `config`.
    pub fn new(config: RelayConfig) -> Result<Self, NotifyError> {
        let notifier = build_notifier(&config.mail)?;
        let limiter = Arc::new(RateLimiter::new(&config.rate_limit));
        Ok(Self::with_parts(config, notifier, limiter))
    }

    /// Create a server around an existing notifier and limiter.
    pub fn with_parts(
        config: RelayConfig,
        notifier: Arc<dyn Notifier>,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        let state = AppState { notifier };
        let router = Self::build_router(&config, state, limiter.clone());
        Self {
            router,
            config,
            limiter,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RelayConfig, state: AppState, limiter: Arc<RateLimiter>) -> Router {
        let submissions = Router::new()
            .route("/api/request", post(submit))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .route_layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));

        Router::new()
            .route("/health", get(health))
            .merge(submissions)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::from_fn(record_metrics))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let sweep_every = self.config.rate_limit.sweep_interval_secs;
        if sweep_every > 0 {
            let limiter = self.limiter.clone();
            let sweeper_shutdown = shutdown.resubscribe();
            tokio::spawn(async move {
                limiter
                    .run_sweeper(Duration::from_secs(sweep_every), sweeper_shutdown)
                    .await;
            });
        }

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// The router without connection handling, for driving requests directly.
    pub fn into_router(self) -> Router {
        self.router
    }
}

async fn record_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = route_label(&request);

    let response = next.run(request).await;
    metrics::record_request(&method, &path, response.status().as_u16(), start);
    response
}

/// Route template for metric labels. Unrouted paths share one label.
fn route_label(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned())
}
