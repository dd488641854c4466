//! AltitudeCell - lock-free latest altitude

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use contracts::AltitudeValue;

/// Shared latest-wins altitude, stored as `f64` bits
#[derive(Debug, Clone)]
pub struct AltitudeCell {
    bits: Arc<AtomicU64>,
}

impl AltitudeCell {
    pub fn new(initial: AltitudeValue) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(initial.meters.to_bits())),
        }
    }

    pub fn set(&self, value: AltitudeValue) {
        self.bits.store(value.meters.to_bits(), Ordering::Release);
    }

    pub fn get(&self) -> AltitudeValue {
        AltitudeValue::new(f64::from_bits(self.bits.load(Ordering::Acquire)))
    }
}

impl Default for AltitudeCell {
    fn default() -> Self {
        Self::new(AltitudeValue::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_and_update() {
        let cell = AltitudeCell::new(AltitudeValue::new(0.28));
        let reader = cell.clone();
        assert_eq!(reader.get().meters, 0.28);
        cell.set(AltitudeValue::new(1.5));
        assert_eq!(reader.get().meters, 1.5);
    }
}
