//! Google Generative AI vision agent.

use super::{AgentError, Candidate, ModelOutput, VisionAgent, VisionRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Gemini `generateContent` client for one model.
///
/// - Request: POST {base_url}/v1beta/models/{model}:generateContent
/// - Auth: `x-goog-api-key` header (kept out of the URL so transport errors
///   never carry the key)
/// - One `user` content with a text part and an `inlineData` image part
/// - Response candidates are returned untouched as `StructuredCandidates`
pub struct GoogleVisionAgent {
    /// Base URL (e.g., "https://generativelanguage.googleapis.com")
    base_url: String,
    /// Model identifier (e.g., "gemini-2.0-flash-lite")
    model: String,
    api_key: String,
    /// Shared HTTP client for connection pooling
    client: Arc<Client>,
}

impl GoogleVisionAgent {
    pub fn new(base_url: String, model: String, api_key: String, client: Arc<Client>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
            client,
        }
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Translate a vision request to the Gemini wire format.
    fn translate_request(request: &VisionRequest) -> GoogleRequest {
        GoogleRequest {
            contents: vec![GoogleContent {
                role: "user".to_string(),
                parts: vec![
                    GooglePart::Text {
                        text: request.prompt.clone(),
                    },
                    GooglePart::InlineData {
                        inline_data: GoogleBlob {
                            mime_type: request.image.mime_type.clone(),
                            data: request.image.data.clone(),
                        },
                    },
                ],
            }],
            generation_config: GoogleGenerationConfig {
                temperature: request.settings.temperature,
                top_p: request.settings.top_p,
                max_output_tokens: request.settings.max_output_tokens,
                response_mime_type: request.settings.response_mime_type.clone(),
            },
        }
    }
}

/// Google Generative AI request format
#[derive(Debug, Serialize)]
struct GoogleRequest {
    contents: Vec<GoogleContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GoogleGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GoogleContent {
    role: String,
    parts: Vec<GooglePart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GooglePart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GoogleBlob,
    },
}

#[derive(Debug, Serialize)]
struct GoogleBlob {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GoogleGenerationConfig {
    temperature: f32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

/// Google Generative AI response format
#[derive(Debug, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<GoogleUsageMetadata>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<GooglePromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct GoogleUsageMetadata {
    #[serde(rename = "promptTokenCount")]
    prompt_token_count: Option<i64>,
    #[serde(rename = "candidatesTokenCount")]
    candidates_token_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct GooglePromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

#[async_trait]
impl VisionAgent for GoogleVisionAgent {
    fn backend(&self) -> &str {
        "google"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: VisionRequest) -> Result<ModelOutput, AgentError> {
        let body = Self::translate_request(&request);

        tracing::debug!(
            backend = "google",
            model = %self.model,
            mime_type = %request.image.mime_type,
            bytes = request.image.approx_bytes(),
            "sending generateContent request"
        );

        let start = std::time::Instant::now();
        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(AgentError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::info!(
                backend = "google",
                model = %self.model,
                status = %status,
                latency_ms = start.elapsed().as_millis(),
                "generateContent failed"
            );
            return Err(AgentError::Upstream {
                status: status.as_u16(),
                message: error_body,
            });
        }

        let google_response: GoogleResponse = response.json().await.map_err(|e| {
            AgentError::InvalidResponse(format!(
                "Failed to parse Google response: {}",
                e.without_url()
            ))
        })?;

        let usage = google_response.usage_metadata.as_ref();
        tracing::debug!(
            backend = "google",
            model = %self.model,
            latency_ms = start.elapsed().as_millis(),
            candidates = google_response.candidates.len(),
            input_tokens = usage.and_then(|u| u.prompt_token_count).unwrap_or(0),
            output_tokens = usage.and_then(|u| u.candidates_token_count).unwrap_or(0),
            "generateContent succeeded"
        );

        if let Some(reason) = google_response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            tracing::warn!(backend = "google", block_reason = %reason, "prompt was blocked");
        }

        Ok(ModelOutput::candidates(google_response.candidates))
    }
}
