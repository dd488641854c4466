//! SphericalReading / CartesianPoint - Ingestion output and Assembler output

use serde::{Deserialize, Serialize};

use crate::SensorId;

/// One range/bearing measurement in sensor-local spherical coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphericalReading {
    /// Bearing (degrees)
    pub yaw_deg: f64,

    /// Elevation, positive pointing down (degrees)
    pub pitch_deg: f64,

    /// Range (meters). Exactly 0 marks a sweep boundary.
    pub distance_m: f64,

    /// Reporting radar
    pub sensor_id: SensorId,
}

impl SphericalReading {
    /// Boundary sentinel for `sensor_id`
    pub fn boundary(sensor_id: SensorId) -> Self {
        Self {
            yaw_deg: 0.0,
            pitch_deg: 0.0,
            distance_m: 0.0,
            sensor_id,
        }
    }

    /// Real measurement
    pub fn measurement(sensor_id: SensorId, yaw_deg: f64, pitch_deg: f64, distance_m: f64) -> Self {
        Self {
            yaw_deg,
            pitch_deg,
            distance_m,
            sensor_id,
        }
    }

    /// `distance == 0` is a sentinel, not a target at zero range.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.distance_m == 0.0
    }
}

/// Point in the vehicle body frame (meters).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CartesianPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl CartesianPoint {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}
