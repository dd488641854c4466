//! TelemetryRecord - decoder output
//!
//! Typed records as produced by the external wire decoder, plus the scale
//! factors needed to turn their native units into degrees and meters.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{AltitudeValue, SensorId, SphericalReading};

/// Typed decoder record
///
/// Angles are in decoder-native units (see [`AngleScale`]); distances in centimeters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TelemetryRecord {
    /// Range/bearing reading from one radar
    Obstacle {
        sensor_id: u8,
        yaw: i32,
        pitch: i32,
        distance: u32,
    },

    /// Downward rangefinder reading
    Altitude { distance: u32 },

    /// Any other record kind the decoder forwards
    #[serde(other)]
    Unknown,
}

/// Native angular resolution of the decoder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleScale {
    /// 0.01 degree per unit
    #[default]
    Hundredths,
    /// 0.1 degree per unit
    Tenths,
    /// 1 degree per unit
    Degrees,
}

impl AngleScale {
    #[inline]
    pub const fn divisor(self) -> f64 {
        match self {
            AngleScale::Hundredths => 100.0,
            AngleScale::Tenths => 10.0,
            AngleScale::Degrees => 1.0,
        }
    }
}

/// Unit conversion applied before the coordinate transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct DecoderScale {
    /// Angle resolution
    #[serde(default)]
    pub angle: AngleScale,

    /// Raw distance units per meter (centimeters by default)
    #[serde(default = "default_distance_divisor")]
    #[validate(range(exclusive_min = 0.0))]
    pub distance_divisor: f64,
}

fn default_distance_divisor() -> f64 {
    100.0
}

impl Default for DecoderScale {
    fn default() -> Self {
        Self {
            angle: AngleScale::default(),
            distance_divisor: default_distance_divisor(),
        }
    }
}

impl DecoderScale {
    #[inline]
    pub fn angle_deg(&self, raw: i32) -> f64 {
        raw as f64 / self.angle.divisor()
    }

    #[inline]
    pub fn distance_m(&self, raw: u32) -> f64 {
        raw as f64 / self.distance_divisor
    }

    /// Inverse of [`DecoderScale::angle_deg`], rounded to the nearest unit
    pub fn encode_angle(&self, degrees: f64) -> i32 {
        (degrees * self.angle.divisor()).round() as i32
    }

    /// Inverse of [`DecoderScale::distance_m`], rounded to the nearest unit
    pub fn encode_distance(&self, meters: f64) -> u32 {
        (meters * self.distance_divisor).round().max(0.0) as u32
    }
}

/// Result of routing a record to an ingestion queue
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordClass {
    Obstacle(SphericalReading),
    Altitude(AltitudeValue),
    Unclassified,
}

impl TelemetryRecord {
    /// Convert native units and pick the destination queue
    pub fn classify(&self, scale: &DecoderScale) -> RecordClass {
        match *self {
            TelemetryRecord::Obstacle {
                sensor_id,
                yaw,
                pitch,
                distance,
            } => RecordClass::Obstacle(SphericalReading {
                yaw_deg: scale.angle_deg(yaw),
                pitch_deg: scale.angle_deg(pitch),
                distance_m: scale.distance_m(distance),
                sensor_id: SensorId::from_raw(sensor_id),
            }),
            TelemetryRecord::Altitude { distance } => {
                RecordClass::Altitude(AltitudeValue::new(scale.distance_m(distance)))
            }
            TelemetryRecord::Unknown => RecordClass::Unclassified,
        }
    }

    /// Boundary sentinel record for a raw sensor id
    pub fn boundary(sensor_id: u8) -> Self {
        TelemetryRecord::Obstacle {
            sensor_id,
            yaw: 0,
            pitch: 0,
            distance: 0,
        }
    }
}
