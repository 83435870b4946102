//! Error types for agent operations.

use thiserror::Error;

/// Errors that can occur while calling a remote vision model.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Network connectivity error (DNS, connection refused, TLS, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Model API returned an error response (4xx, 5xx).
    #[error("Model API error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Model API response doesn't match the expected format.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Agent configuration error (bad proxy URL, unbuildable client).
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AgentError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AgentError::Network(_) => "network",
            AgentError::Upstream { .. } => "upstream",
            AgentError::InvalidResponse(_) => "invalid_response",
            AgentError::Configuration(_) => "configuration",
        }
    }

    /// Map a transport error, dropping the URL so credentials never reach logs.
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        AgentError::Network(e.without_url().to_string())
    }
}
