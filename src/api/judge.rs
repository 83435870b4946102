//! `POST /judge` handler.

use crate::api::{payload::normalize_request, AppState};
use crate::judge::{JudgeError, JudgeVerdict};
use crate::logging::generate_request_id;
use axum::{
    extract::{Request, State},
    Json,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// POST /judge - Judge one snapshot.
///
/// Always answers 200 with a verdict body. Only an `ok` pass counts as a
/// judge success for readiness; everything else, including bad input, is
/// recorded as a failure.
pub async fn handle(State(state): State<Arc<AppState>>, request: Request) -> Json<JudgeVerdict> {
    let request_id = generate_request_id();
    let span = tracing::info_span!(
        "judge_request",
        request_id = %request_id,
        round_id = tracing::field::Empty,
    );

    async move {
        let start = Instant::now();
        let verdict = judge_request(&state, request).await;

        if verdict.is_success() {
            state.health.record_success();
        } else {
            state.health.record_failure();
        }
        crate::metrics::record_judge_request(
            verdict.status.as_str(),
            verdict.verdict.as_str(),
            start.elapsed(),
        );

        Json(verdict)
    }
    .instrument(span)
    .await
}

async fn judge_request(state: &AppState, request: Request) -> JudgeVerdict {
    let payload = match normalize_request(request, state.config.server.max_body_bytes).await {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected judge payload");
            return JudgeVerdict::error(e.to_string());
        }
    };

    let round_id = payload.round_id.as_deref().unwrap_or("n/a");
    tracing::Span::current().record("round_id", round_id);

    match state.judge.judge(&payload).await {
        Ok(verdict) => {
            tracing::info!(
                round_id,
                emoji = %payload.emoji,
                verdict = verdict.verdict.as_str(),
                confidence = verdict.confidence,
                "Judged snapshot"
            );
            verdict
        }
        Err(e) => {
            match &e {
                JudgeError::Configuration(_) => {
                    tracing::error!(error = %e, "Judge is not configured")
                }
                JudgeError::Exhausted { .. } => {
                    tracing::error!(round_id, error = %e, "Judge call failed")
                }
            }
            JudgeVerdict::error(e.public_message())
        }
    }
}
