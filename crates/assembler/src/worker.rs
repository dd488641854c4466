//! Frame assembly worker - single consumer of the obstacle queue

use async_channel::Receiver;
use contracts::{ShutdownSignal, SphericalReading};
use handoff::{FrameAccumulator, FrameSlot};
use observability::{FrameMetricsAggregator, MetricsSummary};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use crate::engine::{AssemblerStats, FrameAssembler};

/// What the worker did before it stopped
#[derive(Debug, Clone, Default)]
pub struct AssemblyReport {
    pub stats: AssemblerStats,
    /// Frames written to the slot
    pub published: u64,
    /// Per-frame summary over every completed frame
    pub frames: MetricsSummary,
}

/// Feeds queued readings through a [`FrameAssembler`] and publishes each
/// completed (optionally accumulated) frame to the [`FrameSlot`].
pub struct FrameAssemblyWorker {
    assembler: FrameAssembler,
    rx: Receiver<SphericalReading>,
    accumulator: FrameAccumulator,
    slot: FrameSlot,
    aggregator: FrameMetricsAggregator,
    shutdown: ShutdownSignal,
}

impl FrameAssemblyWorker {
    pub fn new(
        assembler: FrameAssembler,
        rx: Receiver<SphericalReading>,
        slot: FrameSlot,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            assembler,
            rx,
            accumulator: FrameAccumulator::default(),
            slot,
            aggregator: FrameMetricsAggregator::new(),
            shutdown,
        }
    }

    /// Merge `n` consecutive frames into each published one
    pub fn with_frames_per_publish(mut self, n: usize) -> Self {
        self.accumulator = FrameAccumulator::new(n);
        self
    }

    /// Run until shutdown or the obstacle queue closes
    #[instrument(
        name = "frame_assembly_worker",
        skip(self),
        fields(
            expected = self.assembler.expected().len(),
            frames_per_publish = self.accumulator.frames_per_publish()
        )
    )]
    pub async fn run(mut self) -> AssemblyReport {
        info!("frame assembly worker started");

        loop {
            let reading = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                received = self.rx.recv() => match received {
                    Ok(reading) => reading,
                    Err(_) => {
                        debug!("obstacle queue closed");
                        break;
                    }
                },
            };

            let Some(frame) = self.assembler.push(reading) else {
                continue;
            };

            observability::record_frame_metrics(&frame);
            self.aggregator.update(&frame);
            debug!(
                frame_id = frame.frame_id,
                points = frame.points.len(),
                missing = ?frame.missing_sensors,
                "frame completed"
            );

            if let Some(merged) = self.accumulator.push(frame) {
                let points = merged.points.len();
                self.slot.publish(merged);
                observability::record_frame_published(self.slot.generation(), points);
            }
        }

        if self.accumulator.pending() > 0 {
            debug!(
                pending = self.accumulator.pending(),
                "partial batch discarded on stop"
            );
        }

        let stats = self.assembler.stats();
        info!(
            frames = stats.frames_completed,
            points = stats.points_added,
            discarded = stats.points_discarded,
            published = self.slot.generation(),
            "frame assembly worker stopped"
        );
        AssemblyReport {
            stats,
            published: self.slot.generation(),
            frames: self.aggregator.summary(),
        }
    }

    /// Spawn the worker as a background task
    pub fn spawn(self) -> JoinHandle<AssemblyReport> {
        tokio::spawn(self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{CartesianPoint, SensorId};
    use std::time::Duration;

    fn worker(
        frames_per_publish: usize,
    ) -> (
        async_channel::Sender<SphericalReading>,
        FrameSlot,
        ShutdownSignal,
        FrameAssemblyWorker,
    ) {
        let (tx, rx) = async_channel::bounded(64);
        let slot = FrameSlot::new();
        let shutdown = ShutdownSignal::new();
        let worker = FrameAssemblyWorker::new(
            FrameAssembler::with_real_sensors(),
            rx,
            slot.clone(),
            shutdown.clone(),
        )
        .with_frames_per_publish(frames_per_publish);
        (tx, slot, shutdown, worker)
    }

    #[tokio::test]
    async fn test_publishes_completed_frame() {
        let (tx, slot, _shutdown, worker) = worker(1);
        tx.send(SphericalReading::boundary(SensorId::Front)).await.unwrap();
        tx.send(SphericalReading::measurement(SensorId::Front, 30.0, 0.0, 10.0))
            .await
            .unwrap();
        tx.send(SphericalReading::boundary(SensorId::Front)).await.unwrap();
        drop(tx);

        let report = worker.run().await;
        assert_eq!(report.stats.frames_completed, 1);
        assert_eq!(report.published, 1);
        assert_eq!(report.frames.frames_with_missing, 1);
        assert_eq!(slot.generation(), 1);

        let frame = slot.latest();
        assert_eq!(frame.frame_id, 1);
        assert_eq!(frame.points.len(), 1);
        let CartesianPoint { x, y, z } = frame.points[0];
        assert!((x - 8.660254).abs() < 1e-5);
        assert!((y - 5.0).abs() < 1e-9);
        assert!(z.abs() < 1e-12);
        assert!(!frame.is_missing(SensorId::Front));
        assert!(frame.is_missing(SensorId::Right));
        assert!(frame.is_missing(SensorId::Rear));
        assert!(frame.is_missing(SensorId::Left));
    }

    #[tokio::test]
    async fn test_empty_input_publishes_nothing() {
        let (tx, slot, _shutdown, worker) = worker(1);
        drop(tx);
        let report = worker.run().await;
        assert_eq!(report.stats, AssemblerStats::default());
        assert_eq!(report.frames.total_frames, 0);
        assert_eq!(slot.generation(), 0);
        assert!(slot.latest().is_empty());
    }

    #[tokio::test]
    async fn test_accumulates_before_publishing() {
        let (tx, slot, _shutdown, worker) = worker(2);
        // Three closing sentinels from Front yield two completed frames.
        for _ in 0..3 {
            tx.send(SphericalReading::boundary(SensorId::Front)).await.unwrap();
            tx.send(SphericalReading::measurement(SensorId::Front, 0.0, 0.0, 1.0))
                .await
                .unwrap();
        }
        drop(tx);

        let report = worker.run().await;
        assert_eq!(report.stats.frames_completed, 2);
        assert_eq!(report.frames.total_frames, 2);
        assert_eq!(slot.generation(), 1);
        let frame = slot.latest();
        assert_eq!(frame.frame_id, 2);
        assert_eq!(frame.points.len(), 2);
    }

    #[tokio::test]
    async fn test_stops_on_shutdown() {
        let (_tx, _slot, shutdown, worker) = worker(1);
        let handle = worker.spawn();
        tokio::time::sleep(Duration::from_millis(10)).await;
        shutdown.trigger();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("worker did not stop")
            .unwrap();
    }
}
