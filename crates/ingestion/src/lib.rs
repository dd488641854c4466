//! # Ingestion Pipeline
//!
//! Telemetry ingestion module.
//!
//! Responsibilities:
//! - Pull typed records from a [`TelemetrySource`] with a bounded timeout
//! - Classify each record into an obstacle reading or an altitude value
//! - Backpressure management and drop policy
//! - Hand off to the assembler and altitude tracker via async-channel
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{open_source, IngestionLoop, IngestionQueues};
//!
//! let (queues, receivers) = IngestionQueues::new(&blueprint.queues);
//! let source = open_source(&blueprint.source, &blueprint.decoder)?;
//! let handle = IngestionLoop::new(source, blueprint.decoder, queues, shutdown.clone())
//!     .with_recv_timeout(blueprint.source.recv_timeout())
//!     .spawn()?;
//!
//! while let Ok(reading) = receivers.obstacle.recv().await {
//!     // assemble frames
//! }
//! ```

mod config;
mod error;
mod pipeline;
mod queue;
mod sources;

// Re-exports
pub use config::{BackpressureConfig, DropPolicy, IngestionMetrics, MetricsSnapshot};
pub use contracts::TelemetrySource;
pub use error::{IngestionError, Result};
pub use pipeline::{IngestionHandle, IngestionLoop, IngestionQueues, IngestionReceivers, StepOutcome};
pub use queue::{bounded_queue, PushOutcome, QueueKind, QueueSender};
pub use sources::{
    open_source, MockRadarSource, ReplaySource, ScriptStep, ScriptedSource, UdpJsonSource,
};
