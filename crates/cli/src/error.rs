//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// A pipeline worker failed to start or stop cleanly
    #[error("Pipeline worker '{worker}' failed: {message}")]
    Worker {
        worker: &'static str,
        message: String,
    },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn worker(worker: &'static str, message: impl Into<String>) -> Self {
        Self::Worker {
            worker,
            message: message.into(),
        }
    }
}
