//! Pipeline orchestrator - coordinates all components.
//!
//! source thread -> obstacle / altitude queues -> assembler + altitude tasks
//! -> frame slot / altitude cell -> render loop.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use assembler::{AltitudeTracker, FrameAssembler, FrameAssemblyWorker};
use contracts::{AltitudeValue, MonitorBlueprint, ShutdownSignal};
use handoff::{
    AltitudeCell, FrameSlot, JsonLinesRenderer, LogRenderer, MonitorHandle, RenderLoop,
    SceneBuilder,
};
use ingestion::{IngestionLoop, IngestionQueues, IngestionReceivers};
use tracing::{info, warn};

use super::{PipelineStats, StopReason};
use crate::error::CliError;

/// How often the supervisor checks frame count and worker liveness
const SUPERVISE_INTERVAL: Duration = Duration::from_millis(20);

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The monitor blueprint configuration
    pub blueprint: MonitorBlueprint,

    /// Stop after this many published frames (None = unlimited)
    pub max_frames: Option<u64>,

    /// Pipeline timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Write scenes as JSON lines here instead of logging them
    pub scene_out: Option<PathBuf>,
}

impl PipelineConfig {
    pub fn new(blueprint: MonitorBlueprint) -> Self {
        Self {
            blueprint,
            max_frames: None,
            timeout: None,
            scene_out: None,
        }
    }
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
    shutdown: ShutdownSignal,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            shutdown: ShutdownSignal::new(),
        }
    }

    /// Trigger this to stop the pipeline from outside
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Run the pipeline until input ends, a limit is hit, or shutdown is requested
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;
        let shutdown = &self.shutdown;

        // Renderer and source first: nothing is running yet if either fails.
        let json_renderer = match &self.config.scene_out {
            Some(path) => Some(
                JsonLinesRenderer::create(path)
                    .await
                    .with_context(|| format!("Failed to create scene file {}", path.display()))?,
            ),
            None => None,
        };

        let source = ingestion::open_source(&blueprint.source, &blueprint.decoder)
            .context("Failed to open telemetry source")?;

        // Handoff
        let slot = FrameSlot::new();
        let altitude = AltitudeCell::new(AltitudeValue::new(blueprint.altitude.initial_m));
        let handle = MonitorHandle::new(slot.clone(), altitude.clone());

        // Ingestion
        let (queues, receivers) = IngestionQueues::new(&blueprint.queues);
        let IngestionReceivers {
            obstacle: obstacle_rx,
            altitude: altitude_rx,
        } = receivers;
        let ingestion = IngestionLoop::new(source, blueprint.decoder, queues, shutdown.clone())
            .with_recv_timeout(blueprint.source.recv_timeout())
            .spawn()
            .context("Failed to start ingestion thread")?;

        // Assembler + altitude
        let assembly = FrameAssemblyWorker::new(
            FrameAssembler::new(blueprint.sensors.expected.iter().copied()),
            obstacle_rx,
            slot.clone(),
            shutdown.clone(),
        )
        .with_frames_per_publish(blueprint.assembler.frames_per_publish)
        .spawn();

        let altitude_task = AltitudeTracker::new(
            altitude_rx,
            altitude.clone(),
            blueprint.altitude.idle_interval(),
            shutdown.clone(),
        )
        .spawn();

        // Render
        let render_loop = RenderLoop::new(
            handle.clone(),
            SceneBuilder::from_blueprint(blueprint),
            blueprint.display.refresh_interval(),
            shutdown.clone(),
        );
        let render_task = match json_renderer {
            Some(renderer) => tokio::spawn(render_loop.run(renderer)),
            None => tokio::spawn(render_loop.run(LogRenderer::new("log"))),
        };

        info!(
            source = ?blueprint.source.kind,
            max_frames = ?self.config.max_frames,
            timeout = ?self.config.timeout,
            "Pipeline running"
        );

        let stop_reason = self.supervise(&slot, &assembly).await;
        info!(reason = ?stop_reason, published = slot.generation(), "Shutting down pipeline...");
        // Closed input already stops the queue consumers once they drain.
        if stop_reason != StopReason::InputClosed {
            shutdown.trigger();
        }

        // Drain workers
        let ingestion = tokio::task::spawn_blocking(move || ingestion.join())
            .await
            .map_err(|e| CliError::worker("ingestion", e.to_string()))?
            .map_err(|e| CliError::worker("ingestion", e.to_string()))?;
        let report = assembly
            .await
            .map_err(|e| CliError::worker("assembler", e.to_string()))?;
        let altitude_stats = altitude_task
            .await
            .map_err(|e| CliError::worker("altitude", e.to_string()))?;
        shutdown.trigger();
        let render = match render_task.await {
            Ok(stats) => stats,
            Err(e) => {
                warn!(error = %e, "Render task failed");
                Default::default()
            }
        };

        let stats = PipelineStats {
            frames_completed: report.stats.frames_completed,
            frames_published: report.published,
            last_altitude_m: handle.latest_altitude().meters,
            duration: start_time.elapsed(),
            stop_reason,
            ingestion,
            assembler: report.stats,
            altitude: altitude_stats,
            render,
            frames: report.frames,
        };

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            fps = format!("{:.2}", stats.fps()),
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }

    /// Wait for the first stop condition
    async fn supervise(
        &self,
        slot: &FrameSlot,
        assembly: &tokio::task::JoinHandle<assembler::AssemblyReport>,
    ) -> StopReason {
        let deadline = async {
            match self.config.timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);

        let mut ticker = tokio::time::interval(SUPERVISE_INTERVAL);

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => return StopReason::Signal,
                _ = &mut deadline => {
                    warn!(timeout = ?self.config.timeout, "Pipeline timed out");
                    return StopReason::Timeout;
                }
                _ = ticker.tick() => {
                    if let Some(max) = self.config.max_frames {
                        if slot.generation() >= max {
                            info!(frames = max, "Reached max frames limit");
                            return StopReason::MaxFrames;
                        }
                    }
                    if assembly.is_finished() {
                        return StopReason::InputClosed;
                    }
                }
            }
        }
    }
}
