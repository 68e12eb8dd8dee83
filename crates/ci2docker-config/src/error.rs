//! Configuration parsing errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid CI document: {0}")]
    InvalidDocument(String),

    #[error("malformed stage '{stage}': {message}")]
    MalformedStage { stage: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn malformed(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedStage {
            stage: stage.into(),
            message: message.into(),
        }
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
