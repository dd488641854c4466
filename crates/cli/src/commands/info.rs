//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{MonitorBlueprint, SourceKind};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    source: SourceInfo,
    expected_sensors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    mounts: Vec<MountInfo>,
    queues: QueueInfo,
    display: DisplayInfo,
}

#[derive(Serialize)]
struct SourceInfo {
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    bind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    replay_path: Option<String>,
    recv_timeout_ms: u64,
}

#[derive(Serialize)]
struct MountInfo {
    sensor: String,
    position_m: [f64; 3],
    yaw_deg: f64,
    pitch_deg: f64,
    fov_deg: f64,
    range_m: f64,
}

#[derive(Serialize)]
struct QueueInfo {
    obstacle_capacity: usize,
    obstacle_policy: String,
    altitude_capacity: usize,
    altitude_policy: String,
}

#[derive(Serialize)]
struct DisplayInfo {
    view: String,
    refresh_rate_hz: f64,
    plot_size_m: f64,
    frames_per_publish: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn build_config_info(blueprint: &MonitorBlueprint, args: &InfoArgs) -> ConfigInfo {
    let source = &blueprint.source;
    let mounts = if args.sensors {
        blueprint
            .sensors
            .mounts
            .iter()
            .map(|m| MountInfo {
                sensor: m.sensor.to_string(),
                position_m: [m.x, m.y, m.z],
                yaw_deg: m.yaw_deg,
                pitch_deg: m.pitch_deg,
                fov_deg: m.fov_deg,
                range_m: m.range_m,
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        source: SourceInfo {
            kind: format!("{:?}", source.kind),
            bind: (source.kind == SourceKind::Udp).then(|| source.bind_addr()),
            replay_path: source
                .replay_path
                .as_ref()
                .map(|p| p.display().to_string()),
            recv_timeout_ms: source.recv_timeout_ms,
        },
        expected_sensors: blueprint
            .sensors
            .expected
            .iter()
            .map(ToString::to_string)
            .collect(),
        mounts,
        queues: QueueInfo {
            obstacle_capacity: blueprint.queues.obstacle.capacity,
            obstacle_policy: format!("{:?}", blueprint.queues.obstacle.drop_policy),
            altitude_capacity: blueprint.queues.altitude.capacity,
            altitude_policy: format!("{:?}", blueprint.queues.altitude.drop_policy),
        },
        display: DisplayInfo {
            view: format!("{:?}", blueprint.display.view),
            refresh_rate_hz: blueprint.display.refresh_rate_hz,
            plot_size_m: blueprint.display.plot_size_m,
            frames_per_publish: blueprint.assembler.frames_per_publish,
        },
    }
}

fn print_config_info(blueprint: &MonitorBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Radar Monitor Configuration                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let source = &blueprint.source;
    println!("📡 Source");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Kind: {:?}", source.kind);
    match source.kind {
        SourceKind::Udp => println!("   ├─ Bind: {}", source.bind_addr()),
        SourceKind::Replay => {
            let path = source
                .replay_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(not set)".to_string());
            println!("   ├─ Replay: {} (loop: {})", path, source.replay_loop);
        }
        SourceKind::Mock => println!(
            "   ├─ Mock: {} Hz, offline {:?}",
            source.mock.cycle_hz, source.mock.offline
        ),
    }
    println!("   └─ Receive timeout: {} ms", source.recv_timeout_ms);

    let sensors = &blueprint.sensors;
    println!("\n🛰  Sensors ({} expected)", sensors.expected.len());
    for (i, sensor) in sensors.expected.iter().enumerate() {
        let prefix = if i == sensors.expected.len() - 1 { "└─" } else { "├─" };
        let mounted = if blueprint.mount_for(*sensor).is_some() {
            "mounted"
        } else {
            "no mount"
        };
        println!("   {} {} ({})", prefix, sensor, mounted);
    }

    if args.sensors && !sensors.mounts.is_empty() {
        println!("\n📐 Mounts ({})", sensors.mounts.len());
        for (i, m) in sensors.mounts.iter().enumerate() {
            let prefix = if i == sensors.mounts.len() - 1 { "└─" } else { "├─" };
            println!(
                "   {} {} at ({:.2}, {:.2}, {:.2}) yaw {}° pitch {}° fov {}° range {} m",
                prefix, m.sensor, m.x, m.y, m.z, m.yaw_deg, m.pitch_deg, m.fov_deg, m.range_m
            );
        }
    }

    let queues = &blueprint.queues;
    println!("\n📥 Queues");
    println!(
        "   ├─ Obstacle: {} ({:?})",
        queues.obstacle.capacity, queues.obstacle.drop_policy
    );
    println!(
        "   └─ Altitude: {} ({:?})",
        queues.altitude.capacity, queues.altitude.drop_policy
    );

    let display = &blueprint.display;
    println!("\n🖥  Display");
    println!("   ├─ View: {:?}", display.view);
    println!("   ├─ Refresh: {} Hz", display.refresh_rate_hz);
    println!("   ├─ Plot size: ±{} m", display.plot_size_m);
    println!(
        "   └─ Frames per publish: {}",
        blueprint.assembler.frames_per_publish
    );

    println!();
}
