//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::{MonitorBlueprint, SourceKind};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    apply_overrides(&mut blueprint, args);
    config_loader::ConfigLoader::validate(&blueprint)
        .context("Configuration invalid after command-line overrides")?;

    info!(
        source = ?blueprint.source.kind,
        expected = blueprint.sensors.expected.len(),
        frames_per_publish = blueprint.assembler.frames_per_publish,
        view = ?blueprint.display.view,
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let pipeline_config = PipelineConfig {
        blueprint,
        max_frames: (args.max_frames > 0).then_some(args.max_frames),
        timeout: (args.timeout > 0).then(|| Duration::from_secs(args.timeout)),
        scene_out: args.scene_out.clone(),
    };

    let pipeline = Pipeline::new(pipeline_config);

    // Signals only request a stop; the pipeline drains and reports normally.
    let shutdown = pipeline.shutdown_signal();
    tokio::spawn(async move {
        setup_shutdown_signal().await;
        warn!("Received shutdown signal, stopping pipeline...");
        shutdown.trigger();
    });

    info!("Starting pipeline...");
    let stats = pipeline.run().await.context("Pipeline execution failed")?;

    info!(
        frames_completed = stats.frames_completed,
        frames_published = stats.frames_published,
        duration_secs = stats.duration.as_secs_f64(),
        fps = format!("{:.2}", stats.fps()),
        "Pipeline completed successfully"
    );
    stats.print_summary();

    info!("Radar Monitor finished");
    Ok(())
}

/// Apply host-facing command-line overrides
fn apply_overrides(blueprint: &mut MonitorBlueprint, args: &RunArgs) {
    if let Some(kind) = args.source {
        info!(source = ?kind, "Overriding source kind from CLI");
        blueprint.source.kind = kind.into();
    }
    if let Some(ref host) = args.host {
        info!(host = %host, "Overriding bind host from CLI");
        blueprint.source.bind_host = host.clone();
    }
    if let Some(port) = args.port {
        info!(port = %port, "Overriding bind port from CLI");
        blueprint.source.port = port;
    }
    if let Some(ref path) = args.replay {
        info!(path = %path.display(), "Replaying recorded telemetry");
        blueprint.source.replay_path = Some(path.clone());
        if args.source.is_none() {
            blueprint.source.kind = SourceKind::Replay;
        }
    }
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &MonitorBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Source:");
    println!("  Kind: {:?}", blueprint.source.kind);
    match blueprint.source.kind {
        SourceKind::Udp => println!("  Bind: {}", blueprint.source.bind_addr()),
        SourceKind::Replay => {
            if let Some(ref path) = blueprint.source.replay_path {
                println!("  Replay: {}", path.display());
            }
        }
        SourceKind::Mock => println!("  Offline: {:?}", blueprint.source.mock.offline),
    }

    println!("\nSensors ({} expected):", blueprint.sensors.expected.len());
    for sensor in &blueprint.sensors.expected {
        println!("  - {}", sensor);
    }

    println!("\nQueues:");
    println!(
        "  Obstacle: {} ({:?})",
        blueprint.queues.obstacle.capacity, blueprint.queues.obstacle.drop_policy
    );
    println!(
        "  Altitude: {} ({:?})",
        blueprint.queues.altitude.capacity, blueprint.queues.altitude.drop_policy
    );

    println!("\nDisplay:");
    println!("  View: {:?}", blueprint.display.view);
    println!("  Refresh: {} Hz", blueprint.display.refresh_rate_hz);

    println!();
}
