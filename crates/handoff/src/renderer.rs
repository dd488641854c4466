//! SceneRenderer trait, stock renderers and the render loop

use std::path::Path;
use std::time::Duration;

use contracts::ShutdownSignal;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::handle::MonitorHandle;
use crate::view::{Scene, SceneBuilder};

/// Scene consumer interface
///
/// Drawing itself lives outside the workspace; implementations adapt a
/// [`Scene`] to whatever surface they own.
#[trait_variant::make(SceneRenderer: Send)]
pub trait LocalSceneRenderer {
    /// Renderer name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Draw one scene
    async fn render(&mut self, scene: &Scene) -> Result<()>;

    /// Release resources
    async fn close(&mut self) -> Result<()>;
}

/// Renderer that logs scene summaries via tracing
pub struct LogRenderer {
    name: String,
}

impl LogRenderer {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl SceneRenderer for LogRenderer {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_renderer_render",
        skip(self, scene),
        fields(renderer = %self.name, frame_id = scene.frame_id)
    )]
    async fn render(&mut self, scene: &Scene) -> Result<()> {
        info!(
            renderer = %self.name,
            frame_id = scene.frame_id,
            view = ?scene.view,
            points = scene.points.len(),
            clipped = scene.clipped,
            altitude_m = format!("{:.2}", scene.altitude_m),
            missing = ?scene.missing_sensors,
            "Scene rendered"
        );
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        info!(renderer = %self.name, "LogRenderer closed");
        Ok(())
    }
}

/// Renderer that appends each scene as one JSON line
pub struct JsonLinesRenderer {
    name: String,
    writer: BufWriter<File>,
}

impl JsonLinesRenderer {
    pub async fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).await?;
        Ok(Self {
            name: format!("jsonl:{}", path.display()),
            writer: BufWriter::new(file),
        })
    }
}

impl SceneRenderer for JsonLinesRenderer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn render(&mut self, scene: &Scene) -> Result<()> {
        let mut line = serde_json::to_vec(scene)?;
        line.push(b'\n');
        self.writer.write_all(&line).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.writer.flush().await?;
        Ok(())
    }
}

/// Render loop counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub ticks: u64,
    pub scenes_rendered: u64,
    pub unchanged_skipped: u64,
    pub render_failures: u64,
}

/// Polls the handle on a fixed timer and redraws when the frame or altitude changed
pub struct RenderLoop {
    handle: MonitorHandle,
    builder: SceneBuilder,
    interval: Duration,
    shutdown: ShutdownSignal,
}

impl RenderLoop {
    pub fn new(
        handle: MonitorHandle,
        builder: SceneBuilder,
        interval: Duration,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            handle,
            builder,
            interval: interval.max(Duration::from_millis(1)),
            shutdown,
        }
    }

    #[instrument(name = "render_loop", skip(self, renderer), fields(renderer = renderer.name()))]
    pub async fn run<R: SceneRenderer>(self, mut renderer: R) -> RenderStats {
        let mut stats = RenderStats::default();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_generation = 0;
        let mut last_altitude_bits = self.handle.latest_altitude().meters.to_bits();

        debug!(interval_ms = self.interval.as_millis() as u64, "render loop started");

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }
            stats.ticks += 1;

            let (generation, frame) = self.handle.snapshot();
            let altitude = self.handle.latest_altitude();
            if generation == last_generation && altitude.meters.to_bits() == last_altitude_bits {
                stats.unchanged_skipped += 1;
                continue;
            }
            last_generation = generation;
            last_altitude_bits = altitude.meters.to_bits();

            let scene = self.builder.build(generation, &frame, altitude);
            let result = renderer.render(&scene).await;
            observability::record_scene_rendered(renderer.name(), result.is_ok());
            match result {
                Ok(()) => stats.scenes_rendered += 1,
                Err(e) => {
                    stats.render_failures += 1;
                    warn!(renderer = renderer.name(), frame_id = scene.frame_id, error = %e, "Render failed");
                }
            }
        }

        if let Err(e) = renderer.close().await {
            warn!(renderer = renderer.name(), error = %e, "Renderer close failed");
        }
        debug!(?stats, "render loop stopped");
        stats
    }
}
