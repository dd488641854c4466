//! Altitude tracker - keeps the shared cell at the newest rangefinder value

use std::time::Duration;

use async_channel::Receiver;
use contracts::{AltitudeValue, ShutdownSignal};
use handoff::AltitudeCell;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, trace};

/// Altitude tracker counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AltitudeStats {
    /// Cell writes
    pub updates: u64,
    /// Values drained without ever being published
    pub superseded: u64,
}

/// Drains the altitude queue, publishing only the newest value of each batch.
///
/// Between batches the task sleeps for `idle`, so a burst is collapsed into a
/// single cell write.
pub struct AltitudeTracker {
    rx: Receiver<AltitudeValue>,
    cell: AltitudeCell,
    idle: Duration,
    shutdown: ShutdownSignal,
}

impl AltitudeTracker {
    pub fn new(
        rx: Receiver<AltitudeValue>,
        cell: AltitudeCell,
        idle: Duration,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            rx,
            cell,
            idle,
            shutdown,
        }
    }

    /// Run until shutdown or the producer closes the queue
    #[instrument(name = "altitude_tracker", skip(self), fields(idle_ms = self.idle.as_millis() as u64))]
    pub async fn run(self) -> AltitudeStats {
        info!("altitude tracker started");
        let mut stats = AltitudeStats::default();

        loop {
            let first = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                received = self.rx.recv() => match received {
                    Ok(value) => value,
                    Err(_) => {
                        debug!("altitude queue closed");
                        break;
                    }
                },
            };

            let mut newest = first;
            let mut superseded = 0usize;
            while let Ok(value) = self.rx.try_recv() {
                newest = value;
                superseded += 1;
            }

            self.cell.set(newest);
            observability::record_altitude(newest.meters, superseded);
            stats.updates += 1;
            stats.superseded += superseded as u64;
            trace!(meters = newest.meters, superseded, "altitude updated");

            if self.idle.is_zero() {
                continue;
            }
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.idle) => {}
            }
        }

        info!(
            updates = stats.updates,
            superseded = stats.superseded,
            "altitude tracker stopped"
        );
        stats
    }

    /// Spawn the tracker as a background task
    pub fn spawn(self) -> JoinHandle<AltitudeStats> {
        tokio::spawn(self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(
        idle: Duration,
    ) -> (
        async_channel::Sender<AltitudeValue>,
        AltitudeCell,
        ShutdownSignal,
        AltitudeTracker,
    ) {
        let (tx, rx) = async_channel::bounded(16);
        let cell = AltitudeCell::default();
        let shutdown = ShutdownSignal::new();
        let tracker = AltitudeTracker::new(rx, cell.clone(), idle, shutdown.clone());
        (tx, cell, shutdown, tracker)
    }

    #[tokio::test]
    async fn test_reflects_newest_queued_value() {
        let (tx, cell, _shutdown, tracker) = tracker(Duration::from_millis(1));
        for m in [0.5, 0.75, 1.25] {
            tx.send(AltitudeValue::new(m)).await.unwrap();
        }
        drop(tx);

        let stats = tracker.run().await;
        assert_eq!(cell.get(), AltitudeValue::new(1.25));
        assert_eq!(stats.updates, 1);
        assert_eq!(stats.superseded, 2);
    }

    #[tokio::test]
    async fn test_keeps_last_value_when_queue_is_quiet() {
        let (tx, cell, shutdown, tracker) = tracker(Duration::from_millis(5));
        let handle = tracker.spawn();

        tx.send(AltitudeValue::new(2.0)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cell.get(), AltitudeValue::new(2.0));

        shutdown.trigger();
        let stats = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("tracker did not stop")
            .unwrap();
        assert_eq!(stats.updates, 1);
    }

    #[tokio::test]
    async fn test_shutdown_while_waiting() {
        let (_tx, cell, shutdown, tracker) = tracker(Duration::from_millis(100));
        let handle = tracker.spawn();
        shutdown.trigger();

        let stats = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("tracker did not stop")
            .unwrap();
        assert_eq!(stats, AltitudeStats::default());
        assert_eq!(cell.get(), AltitudeValue::default());
    }
}
