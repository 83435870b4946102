//! Errors raised while loading or validating `emoji-judge.toml`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("config file {} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("malformed config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A setting that parses but cannot be served with.
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },
}
