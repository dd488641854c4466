//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{MonitorBlueprint, SourceKind};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    source: String,
    expected_sensors: usize,
    mount_count: usize,
    frames_per_publish: usize,
    view: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    source: format!("{:?}", blueprint.source.kind),
                    expected_sensors: blueprint.sensors.expected.len(),
                    mount_count: blueprint.sensors.mounts.len(),
                    frames_per_publish: blueprint.assembler.frames_per_publish,
                    view: format!("{:?}", blueprint.display.view),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &MonitorBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    for sensor in &blueprint.sensors.expected {
        if blueprint.mount_for(*sensor).is_none() {
            warnings.push(format!(
                "Expected sensor '{}' has no mount - its field of view will not be drawn when missing",
                sensor
            ));
        }
    }

    if blueprint.source.kind == SourceKind::Mock {
        for sensor in &blueprint.source.mock.offline {
            if !blueprint.sensors.expected.contains(sensor) {
                warnings.push(format!(
                    "Mock sensor '{}' is offline but not expected - it will never be reported missing",
                    sensor
                ));
            }
        }
    }

    if blueprint.source.kind != SourceKind::Replay && blueprint.source.replay_path.is_some() {
        warnings.push("source.replay_path is set but source.kind is not replay".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Source: {}", summary.source);
            println!("  Expected sensors: {}", summary.expected_sensors);
            println!("  Mounts: {}", summary.mount_count);
            println!("  Frames per publish: {}", summary.frames_per_publish);
            println!("  View: {}", summary.view);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
