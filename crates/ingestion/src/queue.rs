//! Bounded ingestion queues with an explicit overflow policy

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_channel::{Receiver, Sender, TrySendError};
use contracts::{BackpressureConfig, DropPolicy};
use metrics::{counter, gauge};
use tracing::trace;

use crate::config::IngestionMetrics;

/// Which of the two ingestion queues a sender feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
    Obstacle,
    Altitude,
}

impl QueueKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            QueueKind::Obstacle => "obstacle",
            QueueKind::Altitude => "altitude",
        }
    }

    fn enqueued<'a>(&self, metrics: &'a IngestionMetrics) -> &'a AtomicU64 {
        match self {
            QueueKind::Obstacle => &metrics.obstacle_enqueued,
            QueueKind::Altitude => &metrics.altitude_enqueued,
        }
    }

    fn dropped<'a>(&self, metrics: &'a IngestionMetrics) -> &'a AtomicU64 {
        match self {
            QueueKind::Obstacle => &metrics.obstacle_dropped,
            QueueKind::Altitude => &metrics.altitude_dropped,
        }
    }
}

/// Result of a single push
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Accepted without loss
    Enqueued,
    /// Accepted after evicting the oldest queued item
    EvictedOldest,
    /// Queue full, the pushed item was discarded
    DroppedNewest,
    /// Consumer is gone
    Closed,
}

/// Producer half of a bounded ingestion queue
///
/// Never blocks: a full queue is resolved by the configured [`DropPolicy`].
pub struct QueueSender<T> {
    kind: QueueKind,
    policy: DropPolicy,
    tx: Sender<T>,
    // Producer-side handle used only to evict the head under `DropOldest`.
    evict: Receiver<T>,
    metrics: Arc<IngestionMetrics>,
}

/// Create a bounded queue, returning the producer and the consumer halves
pub fn bounded_queue<T>(
    kind: QueueKind,
    config: BackpressureConfig,
    metrics: Arc<IngestionMetrics>,
) -> (QueueSender<T>, Receiver<T>) {
    let (tx, rx) = async_channel::bounded(config.capacity.max(1));
    let sender = QueueSender {
        kind,
        policy: config.drop_policy,
        tx,
        evict: rx.clone(),
        metrics,
    };
    (sender, rx)
}

impl<T> QueueSender<T> {
    pub fn kind(&self) -> QueueKind {
        self.kind
    }

    /// Items currently queued
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.tx.capacity().unwrap_or(usize::MAX)
    }

    /// True once every external consumer has been dropped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed() || self.tx.receiver_count() <= 1
    }

    /// Append `item`, applying the drop policy if the queue is full
    pub fn push(&self, item: T) -> PushOutcome {
        if self.is_closed() {
            return PushOutcome::Closed;
        }

        let outcome = match self.tx.try_send(item) {
            Ok(()) => PushOutcome::Enqueued,
            Err(TrySendError::Closed(_)) => PushOutcome::Closed,
            Err(TrySendError::Full(item)) => match self.policy {
                DropPolicy::DropNewest => PushOutcome::DroppedNewest,
                DropPolicy::DropOldest => {
                    let evicted = self.evict.try_recv().is_ok();
                    match self.tx.try_send(item) {
                        Ok(()) if evicted => PushOutcome::EvictedOldest,
                        Ok(()) => PushOutcome::Enqueued,
                        Err(TrySendError::Full(_)) => PushOutcome::DroppedNewest,
                        Err(TrySendError::Closed(_)) => PushOutcome::Closed,
                    }
                }
            },
        };

        self.record(outcome);
        outcome
    }

    fn record(&self, outcome: PushOutcome) {
        let queue = self.kind.as_str();
        match outcome {
            PushOutcome::Enqueued => {
                self.kind.enqueued(&self.metrics).fetch_add(1, Ordering::Relaxed);
            }
            PushOutcome::EvictedOldest => {
                self.kind.enqueued(&self.metrics).fetch_add(1, Ordering::Relaxed);
                self.kind.dropped(&self.metrics).fetch_add(1, Ordering::Relaxed);
                counter!("radar_monitor_queue_dropped_total", "queue" => queue, "policy" => "drop_oldest")
                    .increment(1);
                trace!(queue, "queue full, oldest item evicted");
            }
            PushOutcome::DroppedNewest => {
                self.kind.dropped(&self.metrics).fetch_add(1, Ordering::Relaxed);
                counter!("radar_monitor_queue_dropped_total", "queue" => queue, "policy" => "drop_newest")
                    .increment(1);
                trace!(queue, "queue full, newest item dropped");
            }
            PushOutcome::Closed => {}
        }
        gauge!("radar_monitor_queue_depth", "queue" => queue).set(self.tx.len() as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue(capacity: usize, policy: DropPolicy) -> (QueueSender<u32>, Receiver<u32>) {
        bounded_queue(
            QueueKind::Obstacle,
            BackpressureConfig::new(capacity, policy),
            Arc::new(IngestionMetrics::new()),
        )
    }

    fn drain(rx: &Receiver<u32>) -> Vec<u32> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    #[test]
    fn test_fifo_within_capacity() {
        let (tx, rx) = queue(8, DropPolicy::DropOldest);
        for i in 0..5 {
            assert_eq!(tx.push(i), PushOutcome::Enqueued);
        }
        assert_eq!(drain(&rx), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_drop_oldest_keeps_latest() {
        let (tx, rx) = queue(3, DropPolicy::DropOldest);
        for i in 0..3 {
            tx.push(i);
        }
        assert_eq!(tx.push(3), PushOutcome::EvictedOldest);
        assert_eq!(tx.push(4), PushOutcome::EvictedOldest);
        assert_eq!(tx.len(), 3);
        assert_eq!(drain(&rx), vec![2, 3, 4]);

        let snapshot = tx.metrics.snapshot();
        assert_eq!(snapshot.obstacle_enqueued, 5);
        assert_eq!(snapshot.obstacle_dropped, 2);
    }

    #[test]
    fn test_drop_newest_keeps_oldest() {
        let (tx, rx) = queue(2, DropPolicy::DropNewest);
        tx.push(10);
        tx.push(11);
        assert_eq!(tx.push(12), PushOutcome::DroppedNewest);
        assert_eq!(drain(&rx), vec![10, 11]);
        assert_eq!(tx.metrics.snapshot().obstacle_dropped, 1);
    }

    #[test]
    fn test_capacity_never_exceeded() {
        let (tx, _rx) = queue(16, DropPolicy::DropOldest);
        for i in 0..1000 {
            tx.push(i);
            assert!(tx.len() <= 16);
        }
        assert_eq!(tx.capacity(), 16);
    }

    #[test]
    fn test_closed_when_consumer_dropped() {
        let (tx, rx) = queue(4, DropPolicy::DropOldest);
        drop(rx);
        assert!(tx.is_closed());
        assert_eq!(tx.push(1), PushOutcome::Closed);
    }

    #[test]
    fn test_consumer_sees_close_after_sender_dropped() {
        let (tx, rx) = queue(4, DropPolicy::DropOldest);
        tx.push(7);
        drop(tx);
        assert_eq!(rx.try_recv(), Ok(7));
        assert!(rx.is_closed());
    }
}
