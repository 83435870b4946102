//! Attempt outcomes and the linear-backoff retry policy.

use crate::agent::AgentError;
use crate::config::JudgeConfig;
use std::fmt;
use std::time::Duration;

/// Result of one timed attempt against the model.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// The model answered in time; carries the extracted raw text.
    Succeeded(String),
    /// The timeout elapsed before the model answered.
    TimedOut,
    /// The call failed before the deadline.
    Failed(AgentError),
}

/// Why an attempt did not produce a verdict.
#[derive(Debug)]
pub enum AttemptFailure {
    TimedOut { after_ms: u64 },
    Remote(AgentError),
}

impl AttemptFailure {
    /// Label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AttemptFailure::TimedOut { .. } => "timeout",
            AttemptFailure::Remote(_) => "error",
        }
    }
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::TimedOut { after_ms } => {
                write!(f, "timed out waiting for model response after {}ms", after_ms)
            }
            AttemptFailure::Remote(e) => write!(f, "{}", e),
        }
    }
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStep {
    /// Sleep for the given delay, then make the next attempt.
    RetryAfter(Duration),
    /// The attempt budget is spent.
    Exhausted,
}

/// Bounded, strictly sequential retries with linear backoff.
///
/// Attempts are numbered from 1. After failed attempt `k < max_attempts`
/// the caller waits `k * backoff_base` before attempt `k + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub timeout: Duration,
    pub backoff_base: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &JudgeConfig) -> Self {
        Self {
            max_attempts: config.max_attempts(),
            timeout: config.timeout(),
            backoff_base: config.backoff_base(),
        }
    }

    /// Delay inserted after failed attempt `attempt`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff_base * attempt
    }

    pub fn next_step(&self, failed_attempt: u32) -> RetryStep {
        if failed_attempt >= self.max_attempts {
            RetryStep::Exhausted
        } else {
            RetryStep::RetryAfter(self.backoff_for(failed_attempt))
        }
    }
}
