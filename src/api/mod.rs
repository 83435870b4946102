//! # HTTP API
//!
//! Endpoints used by the browser game and by operators.
//!
//! ## Endpoints
//!
//! - `POST /judge` - Judge a webcam snapshot against an emoji (always HTTP 200)
//! - `GET /health` - Liveness plus judge readiness
//! - `GET /metrics` - Prometheus text exposition
//!
//! ## Example
//!
//! ```no_run
//! use emoji_judge::api::{create_router, AppState};
//! use emoji_judge::config::JudgeAppConfig;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(JudgeAppConfig::default());
//! let state = Arc::new(AppState::new(config));
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
//! `/judge` never answers with a non-200 status. Failures are reported in
//! the body with `status: "error"` and a player-facing explanation:
//! ```json
//! {
//!   "status": "error",
//!   "verdict": "fail",
//!   "explanation": "`image` is required.",
//!   "confidence": 0,
//!   "score": 0
//! }
//! ```

mod health;
mod judge;
pub mod payload;

pub use health::HealthResponse;
pub use payload::{normalize_json, normalize_request, ValidationError};

use crate::config::JudgeAppConfig;
use crate::health::HealthTracker;
use crate::judge::JudgeService;
use crate::metrics::MetricsCollector;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub config: Arc<JudgeAppConfig>,
    /// Judge success/failure timestamps for readiness
    pub health: HealthTracker,
    pub judge: JudgeService,
    /// Server startup time for uptime tracking
    pub start_time: Instant,
    pub metrics_collector: Arc<MetricsCollector>,
}

impl AppState {
    /// State whose judge builds its Gemini agent on first use.
    pub fn new(config: Arc<JudgeAppConfig>) -> Self {
        let judge = JudgeService::new(config.judge.clone())
            .with_content_logging(config.logging.enable_content_logging);
        Self::with_judge(config, judge)
    }

    /// State around an already constructed judge.
    pub fn with_judge(config: Arc<JudgeAppConfig>, judge: JudgeService) -> Self {
        // Safe to call more than once: later calls get a detached handle.
        let prometheus_handle = crate::metrics::metrics_handle();

        Self {
            config,
            health: HealthTracker::new(),
            judge,
            start_time: Instant::now(),
            metrics_collector: Arc::new(MetricsCollector::new(prometheus_handle)),
        }
    }
}

/// Create the main API router with all endpoints configured.
///
/// The body limit is applied as a default, not a hard layer, so `/judge`
/// can turn an oversized upload into its usual error body instead of a 413.
pub fn create_router(state: Arc<AppState>) -> Router {
    let max_body_bytes = state.config.server.max_body_bytes;
    Router::new()
        .route("/judge", post(judge::handle))
        .route("/health", get(health::handle))
        .route("/metrics", get(crate::metrics::handler::metrics_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
