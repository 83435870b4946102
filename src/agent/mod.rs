//! Vision agent abstraction layer.
//!
//! This module provides the `VisionAgent` trait that hides the remote
//! multimodal model behind one async call, plus the Gemini implementation
//! and a factory that builds it from configuration.

use async_trait::async_trait;

pub mod error;
pub mod factory;
pub mod google;
pub mod types;

pub use error::AgentError;
pub use factory::create_agent;
pub use google::GoogleVisionAgent;
pub use types::{
    Candidate, CandidateContent, ContentPart, GenerationSettings, InlineImage, ModelOutput,
    TextAccessor, VisionRequest,
};

/// Unified interface for remote vision models.
///
/// # Object Safety
///
/// This trait is object-safe and designed to be used as `Arc<dyn VisionAgent>`.
///
/// # Cancellation Safety
///
/// `generate` must be cancellation-safe: the judge drops the future when its
/// timeout fires, and nothing should be left observing the late result.
#[async_trait]
pub trait VisionAgent: Send + Sync + 'static {
    /// Backend label for logging (e.g., "google").
    fn backend(&self) -> &str;

    /// Model identifier requests are sent to.
    fn model(&self) -> &str;

    /// Run one generation call.
    ///
    /// # Returns
    ///
    /// - `Ok(ModelOutput)` when the model answered
    /// - `Err(AgentError::Upstream)` if the API returned an error status
    /// - `Err(AgentError::Network)` if the connection failed
    /// - `Err(AgentError::InvalidResponse)` if the body could not be decoded
    async fn generate(&self, request: VisionRequest) -> Result<ModelOutput, AgentError>;
}
