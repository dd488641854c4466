//! MonitorHandle - renderer-facing read side

use std::sync::Arc;

use contracts::{AltitudeValue, Frame};

use crate::altitude::AltitudeCell;
use crate::slot::FrameSlot;

/// Non-blocking accessors for whoever draws the data
#[derive(Debug, Clone)]
pub struct MonitorHandle {
    slot: FrameSlot,
    altitude: AltitudeCell,
}

impl MonitorHandle {
    pub fn new(slot: FrameSlot, altitude: AltitudeCell) -> Self {
        Self { slot, altitude }
    }

    pub fn latest_frame(&self) -> Arc<Frame> {
        self.slot.latest()
    }

    pub fn latest_altitude(&self) -> AltitudeValue {
        self.altitude.get()
    }

    pub fn generation(&self) -> u64 {
        self.slot.generation()
    }

    pub fn snapshot(&self) -> (u64, Arc<Frame>) {
        self.slot.snapshot()
    }
}
