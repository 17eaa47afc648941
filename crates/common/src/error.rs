//! Error types shared across ScrolliTelli crates.

use std::path::{Path, PathBuf};

/// Top-level error type for ScrolliTelli operations.
#[derive(Debug, thiserror::Error)]
pub enum ScrolliError {
    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Export error: {message}")]
    Export { message: String },

    #[error("Configuration error in {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ScrolliError.
pub type ScrolliResult<T> = Result<T, ScrolliError>;

impl ScrolliError {
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export {
            message: msg.into(),
        }
    }

    pub fn config(path: &Path, msg: impl Into<String>) -> Self {
        Self::Config {
            path: path.to_path_buf(),
            message: msg.into(),
        }
    }

    /// Whether this error was raised by an edge check before any state changed.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::Export { .. })
    }
}
