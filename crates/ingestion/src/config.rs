//! Ingestion metrics

use std::sync::atomic::{AtomicU64, Ordering};

pub use contracts::{BackpressureConfig, DropPolicy};

/// Ingestion metrics
///
/// Shared between the ingestion thread and whoever reports on it.
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Records returned by the source
    pub records_received: AtomicU64,

    /// Readings accepted by the obstacle queue
    pub obstacle_enqueued: AtomicU64,

    /// Values accepted by the altitude queue
    pub altitude_enqueued: AtomicU64,

    /// Items evicted or refused by the obstacle queue
    pub obstacle_dropped: AtomicU64,

    /// Items evicted or refused by the altitude queue
    pub altitude_dropped: AtomicU64,

    /// Records that matched no queue
    pub unclassified: AtomicU64,

    /// Decoder / transport failures
    pub decode_errors: AtomicU64,
}

impl IngestionMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_received(&self) {
        self.records_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unclassified(&self) {
        self.unclassified.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_received: self.records_received.load(Ordering::Relaxed),
            obstacle_enqueued: self.obstacle_enqueued.load(Ordering::Relaxed),
            altitude_enqueued: self.altitude_enqueued.load(Ordering::Relaxed),
            obstacle_dropped: self.obstacle_dropped.load(Ordering::Relaxed),
            altitude_dropped: self.altitude_dropped.load(Ordering::Relaxed),
            unclassified: self.unclassified.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub records_received: u64,
    pub obstacle_enqueued: u64,
    pub altitude_enqueued: u64,
    pub obstacle_dropped: u64,
    pub altitude_dropped: u64,
    pub unclassified: u64,
    pub decode_errors: u64,
}

impl MetricsSnapshot {
    pub fn total_dropped(&self) -> u64 {
        self.obstacle_dropped + self.altitude_dropped
    }
}
