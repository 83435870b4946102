//! Health check endpoint handler.

use crate::api::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Health check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always "ok" while the process can answer
    pub status: String,
    pub uptime_seconds: u64,
    /// True when a passing verdict was produced within the readiness window
    pub judge_ready: bool,
    /// Epoch ms of the last passing verdict (0 = never)
    pub last_judge_success_ms: u64,
    /// Epoch ms of the last failed request (0 = never)
    pub last_judge_failure_ms: u64,
}

/// GET /health - Return liveness and judge readiness.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let snapshot = state.health.snapshot();

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs_f64().round() as u64,
        judge_ready: state
            .health
            .is_ready(state.config.judge.ready_window_ms()),
        last_judge_success_ms: snapshot.last_success_ms,
        last_judge_failure_ms: snapshot.last_failure_ms,
    })
}
