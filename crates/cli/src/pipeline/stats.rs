//! Pipeline statistics and metrics.

use std::time::Duration;

use assembler::{AltitudeStats, AssemblerStats};
use handoff::RenderStats;
use ingestion::MetricsSnapshot;
use observability::MetricsSummary;

/// Why the pipeline stopped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StopReason {
    /// Source exhausted and every queued reading consumed
    #[default]
    InputClosed,
    /// `--max-frames` reached
    MaxFrames,
    /// `--timeout` elapsed
    Timeout,
    /// Ctrl+C / SIGTERM
    Signal,
}

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Frames closed by the assembler
    pub frames_completed: u64,

    /// Frames written to the handoff slot
    pub frames_published: u64,

    /// Altitude shown after the last update
    pub last_altitude_m: f64,

    /// Total duration of the pipeline run
    pub duration: Duration,

    pub stop_reason: StopReason,

    pub ingestion: MetricsSnapshot,
    pub assembler: AssemblerStats,
    pub altitude: AltitudeStats,
    pub render: RenderStats,

    /// Per-frame aggregate over every completed frame
    pub frames: MetricsSummary,
}

impl PipelineStats {
    /// Calculate completed frames per second
    pub fn fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.frames_completed as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Share of received records dropped by queue backpressure, as percentage
    pub fn drop_rate(&self) -> f64 {
        let received = self.ingestion.records_received;
        if received > 0 {
            (self.ingestion.total_dropped() as f64 / received as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Pipeline Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Stopped by: {:?}", self.stop_reason);
        println!("   ├─ Frames completed: {}", self.frames_completed);
        println!("   ├─ Frames published: {}", self.frames_published);
        println!("   ├─ FPS: {:.2}", self.fps());
        println!("   └─ Last altitude: {:.2} m", self.last_altitude_m);

        let ingestion = &self.ingestion;
        println!("\n📥 Ingestion");
        println!("   ├─ Records received: {}", ingestion.records_received);
        println!(
            "   ├─ Obstacle enqueued / dropped: {} / {}",
            ingestion.obstacle_enqueued, ingestion.obstacle_dropped
        );
        println!(
            "   ├─ Altitude enqueued / dropped: {} / {}",
            ingestion.altitude_enqueued, ingestion.altitude_dropped
        );
        println!("   ├─ Drop rate: {:.2}%", self.drop_rate());
        println!("   ├─ Unclassified: {}", ingestion.unclassified);
        println!("   └─ Decode errors: {}", ingestion.decode_errors);

        let assembler = &self.assembler;
        println!("\n🧩 Assembler");
        println!("   ├─ Readings: {}", assembler.readings);
        println!("   ├─ Sweeps started: {}", assembler.sweeps_started);
        println!("   ├─ Points added: {}", assembler.points_added);
        println!("   ├─ Points discarded: {}", assembler.points_discarded);
        println!(
            "   ├─ Frames with missing sensors: {} ({:.2}%)",
            self.frames.frames_with_missing, self.frames.missing_rate
        );
        println!("   └─ Points per frame: {}", self.frames.points_per_frame);

        println!("\n📏 Altitude");
        println!("   ├─ Updates: {}", self.altitude.updates);
        println!("   └─ Superseded: {}", self.altitude.superseded);

        println!("\n🖥  Render");
        println!("   ├─ Scenes rendered: {}", self.render.scenes_rendered);
        println!("   ├─ Unchanged ticks: {}", self.render.unchanged_skipped);
        println!("   └─ Failures: {}", self.render.render_failures);

        if !self.frames.sensor_missing_counts.is_empty() {
            println!("\n⚠️  Missing Sensor Counts");
            for (sensor, count) in &self.frames.sensor_missing_counts {
                println!("   ├─ {}: {}", sensor, count);
            }
        }

        println!();
    }
}
