//! # Observability
//!
//! 雷达监视器的日志与指标出口。
//!
//! - `install` 一次性装好 tracing 订阅器，按需启动 Prometheus 监听
//! - `metrics` 子模块提供帧、高度、渲染的指标记录与汇总
//!
//! ```ignore
//! observability::install(&TelemetrySettings {
//!     log_format: LogFormat::Compact,
//!     verbosity: Verbosity::from_flags(false, 1),
//!     metrics_port: Some(9464),
//! })?;
//!
//! if let Some(frame) = assembler.push(reading) {
//!     observability::record_frame_metrics(&frame);
//! }
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub use crate::metrics::{
    record_altitude, record_frame_metrics, record_frame_published, record_scene_rendered,
    FrameMetricsAggregator, MetricsSummary, RunningStats, StatsSummary,
};

/// 日志输出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
    Compact,
}

/// 未设置 `RUST_LOG` 时的默认级别，由 `-q` / `-v` 决定
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Debug,
    Trace,
}

impl Verbosity {
    /// `quiet` 优先于任何 `-v`
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Debug,
            (false, _) => Self::Trace,
        }
    }

    pub fn directive(self) -> &'static str {
        match self {
            Self::Quiet => "warn",
            Self::Normal => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// 进程级可观测性设置
#[derive(Debug, Clone, Default)]
pub struct TelemetrySettings {
    pub log_format: LogFormat,
    pub verbosity: Verbosity,
    /// Prometheus 监听端口 (None = 不导出)
    pub metrics_port: Option<u16>,
}

/// 安装全局订阅器；`metrics_port` 存在时同时安装 Prometheus recorder。
///
/// 只能调用一次，重复调用返回错误。Prometheus 监听需要在 tokio 运行时内调用。
pub fn install(settings: &TelemetrySettings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.verbosity.directive()));

    let fmt_layer = match settings.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(false).boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    if let Some(port) = settings.metrics_port {
        PrometheusBuilder::new()
            .with_http_listener(([0, 0, 0, 0], port))
            .install()
            .with_context(|| format!("Failed to start Prometheus listener on port {port}"))?;
        tracing::info!(port, "Prometheus metrics endpoint listening");
    }

    tracing::debug!(
        format = ?settings.log_format,
        verbosity = ?settings.verbosity,
        "Observability installed"
    );
    Ok(())
}
