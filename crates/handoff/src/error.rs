//! Handoff 错误类型

use thiserror::Error;

/// Handoff / renderer errors
#[derive(Debug, Error)]
pub enum HandoffError {
    /// Renderer failed to draw a scene
    #[error("renderer '{renderer}' failed: {message}")]
    Render { renderer: String, message: String },

    /// Scene serialization failed
    #[error("scene serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl HandoffError {
    pub fn render(renderer: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Render {
            renderer: renderer.into(),
            message: message.into(),
        }
    }
}

/// Handoff Result 类型别名
pub type Result<T> = std::result::Result<T, HandoffError>;
