//! Concrete [`TelemetrySource`] implementations

mod mock;
mod replay;
mod scripted;
mod udp;

pub use mock::MockRadarSource;
pub use replay::ReplaySource;
pub use scripted::{ScriptStep, ScriptedSource};
pub use udp::UdpJsonSource;

use contracts::{DecoderScale, SourceConfig, SourceKind, TelemetrySource};
use tracing::info;

use crate::error::{IngestionError, Result};

/// Open the source described by `config`
pub fn open_source(
    config: &SourceConfig,
    scale: &DecoderScale,
) -> Result<Box<dyn TelemetrySource>> {
    let source: Box<dyn TelemetrySource> = match config.kind {
        SourceKind::Udp => Box::new(UdpJsonSource::bind(&config.bind_addr())?),
        SourceKind::Replay => {
            let path = config
                .replay_path
                .as_ref()
                .ok_or_else(|| IngestionError::source_open("replay", "replay_path not set"))?;
            Box::new(ReplaySource::open(
                path,
                config.replay_interval(),
                config.replay_loop,
            )?)
        }
        SourceKind::Mock => Box::new(MockRadarSource::new(config.mock.clone(), *scale)),
    };

    info!(source = source.name(), kind = ?config.kind, "telemetry source opened");
    Ok(source)
}
