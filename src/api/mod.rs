//! # HTTP API
//!
//! ## Endpoints
//!
//! - `POST /api/score` - Evaluate a handwritten character image
//! - `OPTIONS /api/score` - CORS preflight
//! - `GET /health` - Liveness and credential pool size
//! - `GET /metrics` - Prometheus metrics
//!
//! ## Example
//!
//! ```no_run
//! use scribe::api::{create_router, AppState};
//! use scribe::config::ScribeConfig;
//! use scribe::pool::CredentialPool;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(ScribeConfig::default());
//! let pool = Arc::new(CredentialPool::from_delimited("key-a,key-b", ",")?);
//!
//! let state = Arc::new(AppState::from_config(config, pool)?);
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Errors are returned as:
//! ```json
//! {
//!   "error": {
//!     "message": "All 3 credentials are rate limited, try again later",
//!     "type": "rate_limit_error",
//!     "code": "rate_limited"
//!   }
//! }
//! ```

mod health;
mod score;
pub mod types;

pub use types::*;

use crate::config::ScribeConfig;
use crate::dispatch::FailoverDispatcher;
use crate::metrics::PrometheusHandle;
use crate::pool::CredentialPool;
use crate::upstream::GeminiCaller;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub config: Arc<ScribeConfig>,
    pub dispatcher: Arc<FailoverDispatcher>,
    /// Server startup time for uptime tracking
    pub start_time: Instant,
    pub metrics: PrometheusHandle,
}

impl AppState {
    /// Create application state around an already-built dispatcher.
    pub fn new(config: Arc<ScribeConfig>, dispatcher: Arc<FailoverDispatcher>) -> Self {
        Self {
            config,
            dispatcher,
            start_time: Instant::now(),
            metrics: crate::metrics::metrics_handle(),
        }
    }

    /// Create application state that calls the configured Gemini endpoint.
    pub fn from_config(
        config: Arc<ScribeConfig>,
        pool: Arc<CredentialPool>,
    ) -> Result<Self, reqwest::Error> {
        let caller = Arc::new(GeminiCaller::from_config(&config.upstream)?);
        let dispatcher = FailoverDispatcher::new(pool, caller, config.prompt.clone())
            .with_reply_logging(config.logging.log_model_replies);
        Ok(Self::new(config, Arc::new(dispatcher)))
    }
}

/// Create the main API router with all endpoints configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/score", post(score::handle).options(score::preflight))
        .route("/health", get(health::handle))
        .route("/metrics", get(crate::metrics::handler::metrics_handler))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.config.server.max_body_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
