//! Frame - Assembler output
//!
//! One complete sweep across the constellation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::{CartesianPoint, SensorId};

/// Completed frame
///
/// Immutable once constructed; the handoff shares it behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Frame sequence number (monotonically increasing, 0 = no frame yet)
    pub frame_id: u64,

    /// Points pooled across all sensors for this sweep
    pub points: Vec<CartesianPoint>,

    /// Expected sensors that never started a sweep before the frame closed
    pub missing_sensors: BTreeSet<SensorId>,
}

impl Frame {
    /// Placeholder returned before the first frame is published
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.frame_id == 0 && self.points.is_empty() && self.missing_sensors.is_empty()
    }

    #[inline]
    pub fn is_missing(&self, sensor_id: SensorId) -> bool {
        self.missing_sensors.contains(&sensor_id)
    }
}

/// Latest altitude distance (meters)
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct AltitudeValue {
    pub meters: f64,
}

impl AltitudeValue {
    pub const fn new(meters: f64) -> Self {
        Self { meters }
    }
}
