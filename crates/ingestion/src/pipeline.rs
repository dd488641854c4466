//! Ingestion loop main entry

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use async_channel::Receiver;
use contracts::{
    AltitudeValue, DecoderScale, QueueConfig, RecordClass, ShutdownSignal, SphericalReading,
    TelemetrySource,
};
use metrics::counter;
use tracing::{debug, info, instrument, trace, warn};

use crate::config::{IngestionMetrics, MetricsSnapshot};
use crate::error::{IngestionError, Result};
use crate::queue::{bounded_queue, PushOutcome, QueueKind, QueueSender};

/// Producer halves of the two ingestion queues
pub struct IngestionQueues {
    pub obstacle: QueueSender<SphericalReading>,
    pub altitude: QueueSender<AltitudeValue>,
    metrics: Arc<IngestionMetrics>,
}

/// Consumer halves of the two ingestion queues
#[derive(Clone)]
pub struct IngestionReceivers {
    pub obstacle: Receiver<SphericalReading>,
    pub altitude: Receiver<AltitudeValue>,
}

impl IngestionQueues {
    /// Create both queues from configuration
    pub fn new(config: &QueueConfig) -> (Self, IngestionReceivers) {
        let metrics = Arc::new(IngestionMetrics::new());
        let (obstacle, obstacle_rx) =
            bounded_queue(QueueKind::Obstacle, config.obstacle, metrics.clone());
        let (altitude, altitude_rx) =
            bounded_queue(QueueKind::Altitude, config.altitude, metrics.clone());

        (
            Self {
                obstacle,
                altitude,
                metrics,
            },
            IngestionReceivers {
                obstacle: obstacle_rx,
                altitude: altitude_rx,
            },
        )
    }

    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        self.metrics.clone()
    }

    /// Both consumers are gone
    pub fn is_closed(&self) -> bool {
        self.obstacle.is_closed() && self.altitude.is_closed()
    }
}

/// What a single receive attempt produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Timed out with nothing to read
    Idle,
    /// Routed to a queue
    Routed(QueueKind, PushOutcome),
    /// Record matched no queue
    Unclassified,
    /// Decoder or transport failure
    Failed,
}

/// Blocking ingestion loop: source -> classify -> queue
///
/// Runs on a dedicated OS thread because [`TelemetrySource::recv`] blocks.
pub struct IngestionLoop<S> {
    source: S,
    scale: DecoderScale,
    recv_timeout: Duration,
    queues: IngestionQueues,
    shutdown: ShutdownSignal,
}

impl<S: TelemetrySource + 'static> IngestionLoop<S> {
    pub fn new(
        source: S,
        scale: DecoderScale,
        queues: IngestionQueues,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            source,
            scale,
            recv_timeout: Duration::from_millis(100),
            queues,
            shutdown,
        }
    }

    /// Upper bound on one blocking receive, and so on shutdown latency
    pub fn with_recv_timeout(mut self, timeout: Duration) -> Self {
        self.recv_timeout = timeout;
        self
    }

    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        self.queues.metrics()
    }

    /// One receive attempt
    pub fn step(&mut self) -> StepOutcome {
        let metrics = &self.queues.metrics;
        let record = match self.source.recv(self.recv_timeout) {
            Ok(Some(record)) => record,
            Ok(None) => return StepOutcome::Idle,
            Err(e) => {
                metrics.record_decode_error();
                counter!("radar_monitor_decode_errors_total").increment(1);
                warn!(source = self.source.name(), error = %e, "failed to receive record");
                return StepOutcome::Failed;
            }
        };

        metrics.record_received();
        counter!("radar_monitor_records_received_total").increment(1);

        match record.classify(&self.scale) {
            RecordClass::Obstacle(reading) => {
                trace!(
                    sensor_id = %reading.sensor_id,
                    distance_m = reading.distance_m,
                    "obstacle reading"
                );
                StepOutcome::Routed(QueueKind::Obstacle, self.queues.obstacle.push(reading))
            }
            RecordClass::Altitude(value) => {
                trace!(meters = value.meters, "altitude reading");
                StepOutcome::Routed(QueueKind::Altitude, self.queues.altitude.push(value))
            }
            RecordClass::Unclassified => {
                metrics.record_unclassified();
                counter!("radar_monitor_records_unclassified_total").increment(1);
                debug!(source = self.source.name(), "unclassified record dropped");
                StepOutcome::Unclassified
            }
        }
    }

    /// Run until shutdown, source exhaustion, or both consumers dropping
    #[instrument(name = "ingestion_loop", skip(self), fields(source = self.source.name()))]
    pub fn run(mut self) -> MetricsSnapshot {
        info!(timeout_ms = self.recv_timeout.as_millis() as u64, "ingestion loop started");

        while !self.shutdown.is_triggered() {
            if self.queues.is_closed() {
                debug!("all consumers dropped");
                break;
            }
            if self.source.is_exhausted() {
                info!("source exhausted");
                break;
            }
            self.step();
        }

        let snapshot = self.queues.metrics.snapshot();
        info!(
            received = snapshot.records_received,
            dropped = snapshot.total_dropped(),
            decode_errors = snapshot.decode_errors,
            "ingestion loop stopped"
        );
        snapshot
    }

    /// Move the loop onto its own thread
    pub fn spawn(self) -> Result<IngestionHandle>
    where
        S: Send,
    {
        let metrics = self.metrics();
        let handle = std::thread::Builder::new()
            .name("radar-ingestion".into())
            .spawn(move || self.run())
            .map_err(|e| IngestionError::source_open("ingestion thread", e.to_string()))?;
        Ok(IngestionHandle { handle, metrics })
    }
}

/// Handle to a running ingestion thread
pub struct IngestionHandle {
    handle: JoinHandle<MetricsSnapshot>,
    metrics: Arc<IngestionMetrics>,
}

impl IngestionHandle {
    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        self.metrics.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the thread, returning its final counters
    pub fn join(self) -> Result<MetricsSnapshot> {
        self.handle
            .join()
            .map_err(|_| IngestionError::ThreadPanicked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{ScriptStep, ScriptedSource};
    use contracts::{BackpressureConfig, DropPolicy, SensorId, TelemetryRecord};

    fn ingestion(
        source: ScriptedSource,
        config: &QueueConfig,
    ) -> (IngestionLoop<ScriptedSource>, IngestionReceivers, ShutdownSignal) {
        let (queues, receivers) = IngestionQueues::new(config);
        let shutdown = ShutdownSignal::new();
        let ingestion = IngestionLoop::new(source, DecoderScale::default(), queues, shutdown.clone())
            .with_recv_timeout(Duration::from_millis(5));
        (ingestion, receivers, shutdown)
    }

    #[test]
    fn test_records_routed_to_their_queue() {
        let mut source = ScriptedSource::new("t");
        source
            .push(ScriptStep::Record(TelemetryRecord::boundary(1)))
            .push(ScriptStep::Record(TelemetryRecord::Altitude { distance: 150 }))
            .push(ScriptStep::Record(TelemetryRecord::Obstacle {
                sensor_id: 1,
                yaw: 3000,
                pitch: 0,
                distance: 1000,
            }))
            .push(ScriptStep::Record(TelemetryRecord::Unknown))
            .push(ScriptStep::Error("truncated".into()))
            .push(ScriptStep::Idle);

        let (ingestion, rx, _shutdown) = ingestion(source, &QueueConfig::default());
        let snapshot = ingestion.run();

        assert_eq!(snapshot.records_received, 4);
        assert_eq!(snapshot.obstacle_enqueued, 2);
        assert_eq!(snapshot.altitude_enqueued, 1);
        assert_eq!(snapshot.unclassified, 1);
        assert_eq!(snapshot.decode_errors, 1);

        let first = rx.obstacle.try_recv().unwrap();
        assert!(first.is_boundary());
        assert_eq!(first.sensor_id, SensorId::Front);
        let second = rx.obstacle.try_recv().unwrap();
        assert!((second.yaw_deg - 30.0).abs() < 1e-9);
        assert!((second.distance_m - 10.0).abs() < 1e-9);

        assert_eq!(rx.altitude.try_recv().unwrap(), AltitudeValue::new(1.5));
    }

    #[test]
    fn test_altitude_overflow_keeps_latest() {
        let source = ScriptedSource::from_records(
            (1..=10).map(|d| TelemetryRecord::Altitude { distance: d * 100 }),
        );
        let config = QueueConfig {
            altitude: BackpressureConfig::new(2, DropPolicy::DropOldest),
            ..Default::default()
        };
        let (ingestion, rx, _shutdown) = ingestion(source, &config);
        let snapshot = ingestion.run();

        assert_eq!(snapshot.altitude_dropped, 8);
        assert_eq!(rx.altitude.try_recv().unwrap().meters, 9.0);
        assert_eq!(rx.altitude.try_recv().unwrap().meters, 10.0);
    }

    #[test]
    fn test_stops_on_shutdown() {
        let mut source = ScriptedSource::new("idle");
        for _ in 0..100_000 {
            source.push(ScriptStep::Idle);
        }
        let (ingestion, _rx, shutdown) = ingestion(source, &QueueConfig::default());
        let handle = ingestion.spawn().unwrap();

        std::thread::sleep(Duration::from_millis(20));
        shutdown.trigger();
        handle.join().unwrap();
    }

    #[test]
    fn test_stops_when_consumers_dropped() {
        let mut source = ScriptedSource::new("idle");
        for _ in 0..100_000 {
            source.push(ScriptStep::Idle);
        }
        let (ingestion, rx, _shutdown) = ingestion(source, &QueueConfig::default());
        drop(rx);
        let snapshot = ingestion.run();
        assert_eq!(snapshot.records_received, 0);
    }
}
