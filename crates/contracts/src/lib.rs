//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Units
//! - Decoder records carry angles in decoder-native units and distances in
//!   centimeters; [`DecoderScale`] converts them to degrees and meters.
//! - Everything past classification is SI (meters, degrees).

mod blueprint;
mod error;
mod frame;
mod reading;
mod record;
mod sensor_id;
mod shutdown;
mod source;

pub use blueprint::*;
pub use error::*;
pub use frame::{AltitudeValue, Frame};
pub use reading::{CartesianPoint, SphericalReading};
pub use record::{AngleScale, DecoderScale, RecordClass, TelemetryRecord};
pub use sensor_id::SensorId;
pub use shutdown::ShutdownSignal;
pub use source::TelemetrySource;
