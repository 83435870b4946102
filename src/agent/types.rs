//! Supporting types for vision agent calls.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

/// Base64 image payload sent inline with the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    /// Base64 data without any `data:` prefix
    pub data: String,
}

impl InlineImage {
    /// Approximate decoded size in bytes.
    pub fn approx_bytes(&self) -> usize {
        self.data.len() * 3 / 4
    }
}

/// Sampling and output settings for a single generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
    /// Requested response MIME type (e.g. `application/json`)
    pub response_mime_type: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            top_p: 0.1,
            max_output_tokens: 256,
            response_mime_type: "application/json".to_string(),
        }
    }
}

/// One multimodal generation request: a text prompt plus one image.
#[derive(Debug, Clone, PartialEq)]
pub struct VisionRequest {
    pub prompt: String,
    pub image: InlineImage,
    pub settings: GenerationSettings,
}

/// A text fragment within a candidate's content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Content of a generated candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ContentPart>,
}

/// One generated candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<CandidateContent>,
    #[serde(
        default,
        rename = "finishReason",
        skip_serializing_if = "Option::is_none"
    )]
    pub finish_reason: Option<String>,
}

impl Candidate {
    /// Candidate whose content is a single text part.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            content: Some(CandidateContent {
                parts: vec![ContentPart {
                    text: Some(text.into()),
                }],
            }),
            finish_reason: None,
        }
    }
}

/// Deferred text produced by a model client.
pub type TextAccessor = BoxFuture<'static, String>;

/// Output of a vision model call, resolved once at the agent boundary.
///
/// Client libraries either hand back a text accessor or the raw candidate
/// structure; the judge extracts text from whichever variant it receives.
pub enum ModelOutput {
    CallableText(TextAccessor),
    StructuredCandidates(Vec<Candidate>),
}

impl ModelOutput {
    /// Text that is already available.
    pub fn text(value: impl Into<String>) -> Self {
        ModelOutput::CallableText(Box::pin(futures::future::ready(value.into())))
    }

    /// Text produced by a future.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = String> + Send + 'static,
    {
        ModelOutput::CallableText(Box::pin(future))
    }

    pub fn candidates(candidates: Vec<Candidate>) -> Self {
        ModelOutput::StructuredCandidates(candidates)
    }
}

impl fmt::Debug for ModelOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelOutput::CallableText(_) => f.write_str("CallableText(..)"),
            ModelOutput::StructuredCandidates(candidates) => f
                .debug_tuple("StructuredCandidates")
                .field(candidates)
                .finish(),
        }
    }
}
