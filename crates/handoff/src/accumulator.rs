//! FrameAccumulator - merge N completed frames into one published frame

use contracts::Frame;

/// Batches completed frames before they are published.
///
/// With `frames_per_publish == 1` every frame passes through untouched.
#[derive(Debug)]
pub struct FrameAccumulator {
    frames_per_publish: usize,
    pending: Option<Frame>,
    merged: usize,
}

impl FrameAccumulator {
    pub fn new(frames_per_publish: usize) -> Self {
        Self {
            frames_per_publish: frames_per_publish.max(1),
            pending: None,
            merged: 0,
        }
    }

    pub fn frames_per_publish(&self) -> usize {
        self.frames_per_publish
    }

    /// Frames held back waiting for the batch to fill
    pub fn pending(&self) -> usize {
        self.merged
    }

    /// Add a completed frame; returns the merged frame once the batch is full
    ///
    /// The merged frame carries the last constituent's id, every point in
    /// arrival order, and the union of missing sensors.
    pub fn push(&mut self, frame: Frame) -> Option<Frame> {
        let merged = match self.pending.take() {
            None => frame,
            Some(mut acc) => {
                acc.frame_id = frame.frame_id;
                acc.points.extend(frame.points);
                acc.missing_sensors.extend(frame.missing_sensors);
                acc
            }
        };
        self.merged += 1;

        if self.merged >= self.frames_per_publish {
            self.merged = 0;
            Some(merged)
        } else {
            self.pending = Some(merged);
            None
        }
    }
}

impl Default for FrameAccumulator {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{CartesianPoint, SensorId};
    use std::collections::BTreeSet;

    fn frame(id: u64, missing: &[SensorId]) -> Frame {
        Frame {
            frame_id: id,
            points: vec![CartesianPoint::new(id as f64, 0.0, 0.0)],
            missing_sensors: missing.iter().copied().collect(),
        }
    }

    #[test]
    fn test_passthrough_by_default() {
        let mut acc = FrameAccumulator::default();
        let out = acc.push(frame(1, &[SensorId::Rear])).unwrap();
        assert_eq!(out, frame(1, &[SensorId::Rear]));
    }

    #[test]
    fn test_merges_batches() {
        let mut acc = FrameAccumulator::new(3);
        assert!(acc.push(frame(1, &[SensorId::Rear])).is_none());
        assert!(acc.push(frame(2, &[])).is_none());
        assert_eq!(acc.pending(), 2);

        let out = acc.push(frame(3, &[SensorId::Left])).unwrap();
        assert_eq!(out.frame_id, 3);
        assert_eq!(
            out.points.iter().map(|p| p.x).collect::<Vec<_>>(),
            vec![1.0, 2.0, 3.0]
        );
        assert_eq!(
            out.missing_sensors,
            BTreeSet::from([SensorId::Rear, SensorId::Left])
        );

        // Next batch starts clean.
        assert!(acc.push(frame(4, &[])).is_none());
        assert_eq!(acc.pending(), 1);
    }

    #[test]
    fn test_zero_is_treated_as_one() {
        let mut acc = FrameAccumulator::new(0);
        assert!(acc.push(frame(9, &[])).is_some());
    }
}
