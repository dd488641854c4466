//! Ingestion 错误类型

use contracts::ContractError;
use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 数据源打开失败
    #[error("failed to open source '{source_name}': {message}")]
    SourceOpen {
        /// 数据源名称
        source_name: String,
        /// 错误消息
        message: String,
    },

    /// 下游队列已关闭
    #[error("{queue} queue closed")]
    QueueClosed {
        /// 队列名称
        queue: &'static str,
    },

    /// 摄取线程异常退出
    #[error("ingestion thread panicked")]
    ThreadPanicked,

    /// 契约层错误
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl IngestionError {
    pub fn source_open(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceOpen {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
