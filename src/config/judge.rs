//! Judge configuration

use crate::health::DEFAULT_READY_WINDOW_MS;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_PASS_THRESHOLD: f64 = 0.8;
pub const DEFAULT_TIMEOUT_MS: u64 = 12_000;
pub const MIN_TIMEOUT_MS: u64 = 3_000;
pub const MAX_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;
pub const MIN_ATTEMPTS: u32 = 1;
pub const MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 500;
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-lite";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Worst-case judge latency above which startup logs a warning.
pub const LATENCY_WARN_THRESHOLD: Duration = Duration::from_secs(60);

/// Remote judge configuration.
///
/// Raw values may come from any configuration layer; the accessor methods
/// clamp them into their supported ranges, so callers never see an
/// out-of-range threshold, timeout or attempt count.
///
/// `Debug` output masks proxy credentials.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    /// Minimum clamped score that counts as a pass
    pub pass_threshold: f64,
    /// Per-attempt timeout for the remote call
    pub timeout_ms: u64,
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Backoff unit; the wait before attempt `k + 1` is `k * backoff_base_ms`
    pub backoff_base_ms: u64,
    /// Freshness window for the readiness predicate
    pub ready_window_ms: u64,
    /// Remote model identifier
    pub model: String,
    /// Base URL of the Generative Language API
    pub endpoint: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Optional HTTP(S) proxy for outbound model calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            pass_threshold: DEFAULT_PASS_THRESHOLD,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
            ready_window_ms: DEFAULT_READY_WINDOW_MS,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            proxy_url: None,
        }
    }
}

impl fmt::Debug for JudgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JudgeConfig")
            .field("pass_threshold", &self.pass_threshold)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_attempts", &self.max_attempts)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .field("ready_window_ms", &self.ready_window_ms)
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("api_key_env", &self.api_key_env)
            .field(
                "proxy_url",
                &self.proxy_url.as_deref().map(redact_proxy_url),
            )
            .finish()
    }
}

impl JudgeConfig {
    /// Pass threshold clamped to [0, 1]; NaN falls back to the default.
    pub fn pass_threshold(&self) -> f64 {
        if self.pass_threshold.is_nan() {
            return DEFAULT_PASS_THRESHOLD;
        }
        self.pass_threshold.clamp(0.0, 1.0)
    }

    /// Per-attempt timeout clamped to [3s, 30s].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.clamp(MIN_TIMEOUT_MS, MAX_TIMEOUT_MS))
    }

    /// Attempt budget clamped to [1, 5].
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.clamp(MIN_ATTEMPTS, MAX_ATTEMPTS)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn ready_window_ms(&self) -> u64 {
        self.ready_window_ms
    }

    /// Look up the API key from the configured environment variable.
    ///
    /// Empty values count as missing.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    /// Upper bound on a single judge call: every attempt times out and every
    /// backoff is slept in full.
    pub fn worst_case_latency(&self) -> Duration {
        let attempts = self.max_attempts();
        let timeouts = self.timeout() * attempts;
        let backoff_units: u32 = (1..attempts).sum();
        timeouts + self.backoff_base() * backoff_units
    }

    /// Apply `JUDGE_*`, `GEMINI_*` and proxy environment overrides.
    ///
    /// Integer values are clamped into their supported range when stored, so
    /// negative or overflowing input lands on the nearest bound. Unparseable
    /// values are ignored and the current value is kept.
    pub fn apply_env(&mut self) {
        if let Some(threshold) = env_parse::<f64>("JUDGE_MIN_SCORE") {
            if !threshold.is_nan() {
                self.pass_threshold = threshold;
            }
        }
        if let Some(timeout) = env_int("JUDGE_TIMEOUT_MS") {
            self.timeout_ms = timeout.clamp(MIN_TIMEOUT_MS as i64, MAX_TIMEOUT_MS as i64) as u64;
        }
        if let Some(attempts) = env_int("JUDGE_MAX_RETRIES") {
            self.max_attempts = attempts.clamp(MIN_ATTEMPTS as i64, MAX_ATTEMPTS as i64) as u32;
        }
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            if !model.is_empty() {
                self.model = model;
            }
        }
        if let Ok(endpoint) = std::env::var("GEMINI_MODEL_ENDPOINT") {
            if !endpoint.is_empty() {
                self.endpoint = endpoint;
            }
        }
        if let Some(proxy) = proxy_from_env() {
            self.proxy_url = Some(proxy);
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok()?.trim().parse().ok()
}

/// Signed integer from the environment; fractional values are truncated and
/// out-of-range magnitudes saturate.
fn env_int(name: &str) -> Option<i64> {
    let raw = std::env::var(name).ok()?;
    parse_int(&raw)
}

fn parse_int(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<i64>() {
        return Some(value);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(|value| value.trunc() as i64)
}

/// Replace the `user:pass@` part of a proxy URL with `***@`.
pub fn redact_proxy_url(url: &str) -> String {
    let (prefix, rest) = match url.find("://") {
        Some(idx) => url.split_at(idx + 3),
        None => ("", url),
    };
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => format!("{}***@{}", prefix, &rest[at + 1..]),
        None => url.to_string(),
    }
}

/// First non-empty proxy variable, HTTPS before HTTP, upper-case before lower-case.
fn proxy_from_env() -> Option<String> {
    ["HTTPS_PROXY", "https_proxy", "HTTP_PROXY", "http_proxy"]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.is_empty())
}
