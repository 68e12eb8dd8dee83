//! Compilation errors.

use ci2docker_config::ConfigError;
use ci2docker_core::Stage;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("copy source not found: {}", .0.display())]
    CopySourceMissing(PathBuf),

    #[error("failed to write script for stage '{stage}': {source}")]
    StageIo {
        stage: Stage,
        #[source]
        source: std::io::Error,
    },

    #[error("render error: {0}")]
    Render(#[from] askama::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("variant {ordinal}: {source}")]
    Variant {
        ordinal: usize,
        #[source]
        source: Box<CompileError>,
    },
}

impl CompileError {
    /// Attach the ordinal of the variant being compiled.
    pub fn in_variant(self, ordinal: usize) -> Self {
        Self::Variant {
            ordinal,
            source: Box::new(self),
        }
    }

    /// Ordinal of the variant that failed, if known.
    pub fn ordinal(&self) -> Option<usize> {
        match self {
            Self::Variant { ordinal, .. } => Some(*ordinal),
            _ => None,
        }
    }
}

pub type CompileResult<T> = std::result::Result<T, CompileError>;
