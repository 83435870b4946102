//! Agent factory for creating VisionAgent trait objects from configuration.

use super::{AgentError, GoogleVisionAgent, VisionAgent};
use crate::config::judge::redact_proxy_url;
use crate::config::JudgeConfig;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Connection establishment budget; the judge enforces the overall deadline.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Build the HTTP client used for model calls.
///
/// Routes through `proxy_url` when configured. A proxy URL that cannot be
/// parsed is logged and ignored so a bad proxy setting never takes the judge
/// down entirely.
pub fn build_http_client(proxy_url: Option<&str>) -> Result<Client, AgentError> {
    let mut builder = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_max_idle_per_host(10);

    if let Some(url) = proxy_url {
        match reqwest::Proxy::all(url) {
            Ok(proxy) => {
                tracing::info!(
                    proxy_url = %redact_proxy_url(url),
                    "Using proxy for model requests"
                );
                builder = builder.proxy(proxy);
            }
            Err(e) => {
                tracing::warn!(
                    proxy_url = %redact_proxy_url(url),
                    error = %e,
                    "Failed to configure proxy"
                );
            }
        }
    }

    builder
        .build()
        .map_err(|e| AgentError::Configuration(format!("Failed to build HTTP client: {}", e)))
}

/// Create the vision agent described by `config`.
///
/// # Examples
///
/// ```
/// use emoji_judge::agent::factory::create_agent;
/// use emoji_judge::config::JudgeConfig;
///
/// let config = JudgeConfig::default();
/// let agent = create_agent(&config, "api-key".to_string()).unwrap();
///
/// assert_eq!(agent.backend(), "google");
/// assert_eq!(agent.model(), "gemini-2.0-flash-lite");
/// ```
pub fn create_agent(
    config: &JudgeConfig,
    api_key: String,
) -> Result<Arc<dyn VisionAgent>, AgentError> {
    let client = Arc::new(build_http_client(config.proxy_url.as_deref())?);
    Ok(Arc::new(GoogleVisionAgent::new(
        config.endpoint.clone(),
        config.model.clone(),
        api_key,
        client,
    )))
}
