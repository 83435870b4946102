//! Judge client.
//!
//! Turns a normalized payload into a verdict by asking the remote vision
//! model, with a per-attempt timeout and linear-backoff retries.
//!
//! # Lifecycle
//!
//! ```text
//! Idle -> Attempting -> Succeeded
//!             |
//!             +-> Retrying (sleep attempt * backoff) -> Attempting
//!             |
//!             +-> Exhausted (attempt == max_attempts)
//! ```

pub mod image;
pub mod prompt;
pub mod response;
pub mod retry;

pub use image::{decode_image, to_data_url};
pub use prompt::build_prompt;
pub use response::{clamp_score, extract_text, interpret_response, select_explanation};
pub use retry::{AttemptFailure, AttemptOutcome, RetryPolicy, RetryStep};

use crate::agent::{create_agent, AgentError, GenerationSettings, VisionAgent, VisionRequest};
use crate::config::JudgeConfig;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Instant;

/// A validated judge request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgePayload {
    /// Target emoji the player is imitating
    pub emoji: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Data URL or bare base64 snapshot
    pub image: String,
    #[serde(rename = "roundId", default, skip_serializing_if = "Option::is_none")]
    pub round_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JudgeStatus {
    Ok,
    Error,
}

impl JudgeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JudgeStatus::Ok => "ok",
            JudgeStatus::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "pass",
            Verdict::Fail => "fail",
        }
    }
}

/// Body returned by `POST /judge`, for successes and failures alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeVerdict {
    pub status: JudgeStatus,
    pub verdict: Verdict,
    pub explanation: String,
    pub confidence: f64,
    /// Always equal to `confidence`
    pub score: f64,
}

impl JudgeVerdict {
    /// Verdict for an already clamped score.
    pub fn scored(score: f64, explanation: String, threshold: f64) -> Self {
        let verdict = if score >= threshold {
            Verdict::Pass
        } else {
            Verdict::Fail
        };
        Self {
            status: JudgeStatus::Ok,
            verdict,
            explanation,
            confidence: score,
            score,
        }
    }

    pub fn error(explanation: impl Into<String>) -> Self {
        Self {
            status: JudgeStatus::Error,
            verdict: Verdict::Fail,
            explanation: explanation.into(),
            confidence: 0.0,
            score: 0.0,
        }
    }

    /// True only for an `ok` pass; this is what feeds judge readiness.
    pub fn is_success(&self) -> bool {
        self.status == JudgeStatus::Ok && self.verdict == Verdict::Pass
    }
}

/// Build the verdict for raw model text.
pub fn verdict_from_text(text: &str, threshold: f64) -> JudgeVerdict {
    let parsed = interpret_response(text);
    let score = clamp_score(parsed.score.unwrap_or(0.0));
    let explanation = select_explanation(parsed.explanation.as_deref(), text);
    JudgeVerdict::scored(score, explanation, threshold)
}

#[derive(Debug, Error)]
pub enum JudgeError {
    /// The agent cannot be built, typically because the API key is missing.
    #[error("Judge configuration error: {0}")]
    Configuration(String),

    #[error("Judge failed after {attempts} attempt(s): {last}")]
    Exhausted { attempts: u32, last: AttemptFailure },
}

impl JudgeError {
    /// Explanation safe to show to players. Remote bodies are never included.
    pub fn public_message(&self) -> String {
        match self {
            JudgeError::Configuration(_) => {
                "Judge unavailable. Please try again shortly.".to_string()
            }
            JudgeError::Exhausted {
                last: AttemptFailure::TimedOut { .. },
                ..
            } => "Judge unavailable: the model did not respond in time.".to_string(),
            JudgeError::Exhausted {
                last: AttemptFailure::Remote(_),
                ..
            } => "Judge unavailable: the model request failed.".to_string(),
        }
    }
}

/// Calls the remote model and turns its answer into a verdict.
pub struct JudgeService {
    config: JudgeConfig,
    policy: RetryPolicy,
    agent: OnceCell<Arc<dyn VisionAgent>>,
    content_logging: bool,
}

impl JudgeService {
    /// Service whose agent is built on first use from `config`.
    pub fn new(config: JudgeConfig) -> Self {
        Self {
            policy: RetryPolicy::from_config(&config),
            config,
            agent: OnceCell::new(),
            content_logging: false,
        }
    }

    /// Service bound to an existing agent.
    pub fn with_agent(config: JudgeConfig, agent: Arc<dyn VisionAgent>) -> Self {
        Self {
            policy: RetryPolicy::from_config(&config),
            config,
            agent: OnceCell::with_value(agent),
            content_logging: false,
        }
    }

    /// Log prompts and raw model text at debug level.
    pub fn with_content_logging(mut self, enabled: bool) -> Self {
        self.content_logging = enabled;
        self
    }

    pub fn config(&self) -> &JudgeConfig {
        &self.config
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// The cached agent, built on first call.
    ///
    /// Construction failures are not cached, so setting the key later takes
    /// effect without a restart.
    fn agent(&self) -> Result<&Arc<dyn VisionAgent>, JudgeError> {
        self.agent.get_or_try_init(|| {
            let api_key = self.config.resolve_api_key().ok_or_else(|| {
                JudgeError::Configuration(format!(
                    "missing API key (set {})",
                    self.config.api_key_env
                ))
            })?;
            let agent = create_agent(&self.config, api_key)
                .map_err(|e| JudgeError::Configuration(e.to_string()))?;
            tracing::info!(
                backend = agent.backend(),
                model = agent.model(),
                "Vision agent initialized"
            );
            Ok(agent)
        })
    }

    /// Judge one payload.
    ///
    /// Fails only when the agent cannot be built or every attempt failed.
    pub async fn judge(&self, payload: &JudgePayload) -> Result<JudgeVerdict, JudgeError> {
        let agent = Arc::clone(self.agent()?);
        let image = decode_image(&payload.image);
        let threshold = self.config.pass_threshold();
        let max_attempts = self.policy.max_attempts;
        let start = Instant::now();

        tracing::info!(
            round_id = payload.round_id.as_deref().unwrap_or(""),
            emoji = %payload.emoji,
            mime_type = %image.mime_type,
            bytes = image.approx_bytes(),
            threshold,
            max_attempts,
            "Judging snapshot"
        );

        let request = VisionRequest {
            prompt: build_prompt(payload),
            image,
            settings: GenerationSettings::default(),
        };
        if self.content_logging {
            tracing::debug!(prompt = %request.prompt, "Judge prompt");
        }

        let mut attempt = 1;
        loop {
            let attempt_start = Instant::now();
            tracing::debug!(attempt, max_attempts, model = agent.model(), "Attempt started");

            let outcome = self.run_attempt(agent.as_ref(), request.clone()).await;
            let duration_ms = attempt_start.elapsed().as_millis() as u64;

            let failure = match outcome {
                AttemptOutcome::Succeeded(text) => {
                    metrics::counter!("emoji_judge_attempts_total", "outcome" => "success")
                        .increment(1);
                    if self.content_logging {
                        tracing::debug!(attempt, raw_text = %text, "Model response");
                    }
                    let verdict = verdict_from_text(&text, threshold);
                    tracing::info!(
                        attempt,
                        max_attempts,
                        duration_ms,
                        total_duration_ms = start.elapsed().as_millis() as u64,
                        score = verdict.score,
                        verdict = verdict.verdict.as_str(),
                        "Judge result"
                    );
                    return Ok(verdict);
                }
                AttemptOutcome::TimedOut => {
                    let after_ms = self.policy.timeout.as_millis() as u64;
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        timeout_ms = after_ms,
                        "Model call timed out"
                    );
                    AttemptFailure::TimedOut { after_ms }
                }
                AttemptOutcome::Failed(e) => {
                    tracing::error!(
                        attempt,
                        max_attempts,
                        duration_ms,
                        error_kind = e.kind(),
                        error = %e,
                        "Model call failed"
                    );
                    AttemptFailure::Remote(e)
                }
            };
            metrics::counter!("emoji_judge_attempts_total", "outcome" => failure.kind())
                .increment(1);

            match self.policy.next_step(attempt) {
                RetryStep::Exhausted => {
                    tracing::error!(
                        attempts = attempt,
                        total_duration_ms = start.elapsed().as_millis() as u64,
                        last_failure = failure.kind(),
                        "Judge attempts exhausted"
                    );
                    return Err(JudgeError::Exhausted {
                        attempts: attempt,
                        last: failure,
                    });
                }
                RetryStep::RetryAfter(delay) => {
                    tracing::info!(
                        attempt,
                        next_attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying judge call"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Race one generate-and-extract call against the attempt timeout.
    ///
    /// A late answer is dropped along with its future.
    async fn run_attempt(&self, agent: &dyn VisionAgent, request: VisionRequest) -> AttemptOutcome {
        let call = async {
            let output = agent.generate(request).await?;
            Ok::<_, AgentError>(extract_text(output).await)
        };
        match tokio::time::timeout(self.policy.timeout, call).await {
            Ok(Ok(text)) => AttemptOutcome::Succeeded(text),
            Ok(Err(e)) => AttemptOutcome::Failed(e),
            Err(_) => AttemptOutcome::TimedOut,
        }
    }
}
