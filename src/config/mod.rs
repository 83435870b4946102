//! Configuration module for emoji-judge
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`EMOJI_JUDGE_*`, `JUDGE_*`, `GEMINI_*`, proxy variables)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use emoji_judge::config::JudgeAppConfig;
//!
//! let config = JudgeAppConfig::default();
//! assert_eq!(config.server.port, 8080);
//!
//! let toml = r#"
//! [judge]
//! pass_threshold = 0.7
//! "#;
//! let config: JudgeAppConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.judge.pass_threshold(), 0.7);
//! ```

pub mod error;
pub mod judge;
pub mod logging;
pub mod server;

pub use error::ConfigError;
pub use judge::JudgeConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use server::ServerConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified configuration for the judge server.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct JudgeAppConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Remote judge settings
    pub judge: JudgeConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl JudgeAppConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                Ok(toml::from_str(&content)?)
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Invalid values are silently ignored (current values are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("EMOJI_JUDGE_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(host) = std::env::var("EMOJI_JUDGE_HOST") {
            self.server.host = host;
        }

        if let Ok(level) = std::env::var("EMOJI_JUDGE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("EMOJI_JUDGE_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        self.judge.apply_env();
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation {
                field: "server.port".to_string(),
                message: "port must be non-zero".to_string(),
            });
        }

        if self.judge.model.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "judge.model".to_string(),
                message: "model cannot be empty".to_string(),
            });
        }

        if self.judge.endpoint.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "judge.endpoint".to_string(),
                message: "endpoint cannot be empty".to_string(),
            });
        }

        if self.judge.backoff_base_ms == 0 {
            return Err(ConfigError::Validation {
                field: "judge.backoff_base_ms".to_string(),
                message: "backoff base must be non-zero".to_string(),
            });
        }

        Ok(())
    }
}
