//! Shared test utilities for emoji-judge integration tests.
//!
//! Provides app builders, request helpers, Gemini response bodies and fake
//! vision agents to reduce duplication across test files.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use emoji_judge::agent::{AgentError, Candidate, ModelOutput, VisionAgent, VisionRequest};
use emoji_judge::api::{create_router, AppState};
use emoji_judge::config::JudgeAppConfig;
use emoji_judge::judge::JudgeService;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Path the Gemini agent posts to for the default model.
pub const GENERATE_PATH: &str = "/v1beta/models/gemini-2.0-flash-lite:generateContent";

/// A 1x1 PNG as a data URL.
pub const PNG_DATA_URL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

// =============================================================================
// Configuration and App Builders
// =============================================================================

/// Config with the shortest allowed timeout and two attempts.
pub fn test_config(endpoint: &str) -> JudgeAppConfig {
    let mut config = JudgeAppConfig::default();
    config.judge.endpoint = endpoint.to_string();
    config.judge.timeout_ms = 3_000;
    config.judge.max_attempts = 2;
    config.judge.backoff_base_ms = 500;
    config
}

/// Router and state around a judge bound to `agent`.
pub fn app_with_agent(
    config: JudgeAppConfig,
    agent: Arc<dyn VisionAgent>,
) -> (axum::Router, Arc<AppState>) {
    let judge = JudgeService::with_agent(config.judge.clone(), agent);
    let state = Arc::new(AppState::with_judge(Arc::new(config), judge));
    (create_router(Arc::clone(&state)), state)
}

/// Router and state whose judge builds its own Gemini agent.
pub fn app_from_config(config: JudgeAppConfig) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(Arc::new(config)));
    (create_router(Arc::clone(&state)), state)
}

// =============================================================================
// Requests and Responses
// =============================================================================

pub fn judge_json_request(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/judge")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// A valid payload for the grinning face.
pub fn valid_payload() -> Value {
    json!({
        "emoji": "😀",
        "description": "grinning face",
        "image": PNG_DATA_URL,
        "roundId": "round-1"
    })
}

pub async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Gemini Bodies
// =============================================================================

/// A `generateContent` response whose single candidate carries `text`.
pub fn gemini_body(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"parts": [{"text": text}], "role": "model"},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 280, "candidatesTokenCount": 14}
    })
}

// =============================================================================
// Fake Agents
// =============================================================================

/// Answers every call with the same text and keeps the requests it saw.
pub struct FixedAgent {
    text: String,
    pub requests: Mutex<Vec<VisionRequest>>,
}

impl FixedAgent {
    pub fn new(text: &str) -> Arc<Self> {
        Arc::new(Self {
            text: text.to_string(),
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl VisionAgent for FixedAgent {
    fn backend(&self) -> &str {
        "fixed"
    }

    fn model(&self) -> &str {
        "fixed-model"
    }

    async fn generate(&self, request: VisionRequest) -> Result<ModelOutput, AgentError> {
        self.requests.lock().unwrap().push(request);
        Ok(ModelOutput::candidates(vec![Candidate::from_text(
            self.text.clone(),
        )]))
    }
}

/// Never answers; every attempt runs into the timeout.
#[derive(Default)]
pub struct HangingAgent {
    pub calls: AtomicUsize,
}

impl HangingAgent {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionAgent for HangingAgent {
    fn backend(&self) -> &str {
        "hanging"
    }

    fn model(&self) -> &str {
        "hanging-model"
    }

    async fn generate(&self, _request: VisionRequest) -> Result<ModelOutput, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending::<Result<ModelOutput, AgentError>>().await
    }
}
