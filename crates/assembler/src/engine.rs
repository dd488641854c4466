//! Frame assembly state machine.

use std::collections::BTreeSet;

use contracts::{CartesianPoint, Frame, SensorId, SphericalReading};
use metrics::counter;
use tracing::{debug, instrument, trace};

use crate::state::{SensorFrameState, SensorStates};
use crate::transform::reading_to_point;

/// Assembler counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblerStats {
    /// Readings consumed
    pub readings: u64,
    /// Boundary sentinels that opened a sweep
    pub sweeps_started: u64,
    /// Measurements transformed into the current frame
    pub points_added: u64,
    /// Measurements from sensors outside a sweep
    pub points_discarded: u64,
    /// Frames closed
    pub frames_completed: u64,
}

/// Rebuilds frames from the per-sensor sentinel protocol.
///
/// A zero-distance reading from sensor `s` opens `s`'s sweep. A second one
/// while `s` is still in progress closes the whole frame and immediately
/// reopens `s`, so a sensor that stays silent for a full cycle is reported in
/// [`Frame::missing_sensors`].
#[derive(Debug)]
pub struct FrameAssembler {
    states: SensorStates,
    expected: Vec<SensorId>,
    points: Vec<CartesianPoint>,
    next_frame_id: u64,
    stats: AssemblerStats,
}

impl FrameAssembler {
    /// Create an assembler reporting the given sensors as missing when silent
    pub fn new(expected: impl IntoIterator<Item = SensorId>) -> Self {
        let mut expected: Vec<_> = expected.into_iter().collect();
        expected.sort();
        expected.dedup();

        Self {
            states: SensorStates::default(),
            expected,
            points: Vec::new(),
            next_frame_id: 1,
            stats: AssemblerStats::default(),
        }
    }

    /// Expect every physically mounted sensor
    pub fn with_real_sensors() -> Self {
        Self::new(SensorId::REAL)
    }

    pub fn expected(&self) -> &[SensorId] {
        &self.expected
    }

    pub fn state(&self, sensor_id: SensorId) -> SensorFrameState {
        self.states.get(sensor_id)
    }

    /// Points collected for the frame still open
    pub fn pending_points(&self) -> usize {
        self.points.len()
    }

    pub fn stats(&self) -> AssemblerStats {
        self.stats
    }

    /// Feed one reading; returns the frame it completed, if any
    #[instrument(
        level = "trace",
        name = "frame_assembler_push",
        skip(self, reading),
        fields(sensor_id = %reading.sensor_id)
    )]
    pub fn push(&mut self, reading: SphericalReading) -> Option<Frame> {
        self.stats.readings += 1;
        let sensor_id = reading.sensor_id;
        let state = self.states.get(sensor_id);

        if reading.is_boundary() {
            let completed = match state {
                SensorFrameState::NotStarted => None,
                SensorFrameState::InProgress => Some(self.close_frame()),
            };
            // The closing sentinel also opens this sensor's next sweep.
            self.states.set(sensor_id, SensorFrameState::InProgress);
            self.stats.sweeps_started += 1;
            trace!(%sensor_id, closed = completed.is_some(), "sweep boundary");
            return completed;
        }

        match state {
            SensorFrameState::InProgress => {
                self.points.push(reading_to_point(&reading));
                self.stats.points_added += 1;
            }
            SensorFrameState::NotStarted => {
                self.stats.points_discarded += 1;
                counter!("radar_monitor_points_discarded_total", "sensor_id" => sensor_id.as_str())
                    .increment(1);
                debug!(
                    %sensor_id,
                    distance_m = reading.distance_m,
                    "measurement outside sweep discarded"
                );
            }
        }
        None
    }

    fn close_frame(&mut self) -> Frame {
        let missing_sensors: BTreeSet<_> = self
            .expected
            .iter()
            .copied()
            .filter(|id| self.states.get(*id) == SensorFrameState::NotStarted)
            .collect();

        let frame = Frame {
            frame_id: self.next_frame_id,
            points: std::mem::take(&mut self.points),
            missing_sensors,
        };

        self.next_frame_id += 1;
        self.states.reset();
        self.stats.frames_completed += 1;
        frame
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::with_real_sensors()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn sentinel(id: SensorId) -> SphericalReading {
        SphericalReading::boundary(id)
    }

    fn point(id: SensorId, yaw: f64) -> SphericalReading {
        SphericalReading::measurement(id, yaw, 0.0, 1.0)
    }

    fn feed(assembler: &mut FrameAssembler, readings: &[SphericalReading]) -> Vec<Frame> {
        readings
            .iter()
            .filter_map(|r| assembler.push(*r))
            .collect()
    }

    #[test]
    fn test_empty_input_publishes_nothing() {
        let mut assembler = FrameAssembler::default();
        assert!(feed(&mut assembler, &[]).is_empty());
        assert_eq!(assembler.stats(), AssemblerStats::default());
    }

    #[test]
    fn test_single_sensor_scenario() {
        let mut assembler = FrameAssembler::default();
        let frames = feed(
            &mut assembler,
            &[
                sentinel(SensorId::Front),
                SphericalReading::measurement(SensorId::Front, 30.0, 0.0, 10.0),
                sentinel(SensorId::Front),
            ],
        );

        assert_eq!(frames.len(), 1);
        let frame = &frames[0];
        assert_eq!(frame.frame_id, 1);
        assert_eq!(frame.points.len(), 1);
        assert!((frame.points[0].x - 8.66).abs() < 1e-2);
        assert!((frame.points[0].y - 5.0).abs() < 1e-9);
        assert!(frame.points[0].z.abs() < 1e-9);
        assert_eq!(
            frame.missing_sensors,
            BTreeSet::from([SensorId::Right, SensorId::Rear, SensorId::Left])
        );
        // The closing sentinel reopened Front.
        assert_eq!(assembler.state(SensorId::Front), SensorFrameState::InProgress);
    }

    #[test]
    fn test_clean_cycle_any_interleaving() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            // Opening sentinels and points in random order, each sensor's
            // opening sentinel ahead of its own points.
            let mut sensors = SensorId::REAL.to_vec();
            sensors.shuffle(&mut rng);
            let mut readings: Vec<SphericalReading> =
                sensors.iter().map(|id| sentinel(*id)).collect();
            let mut points: Vec<_> = SensorId::REAL
                .iter()
                .flat_map(|id| (0..3).map(move |i| point(*id, i as f64 * 10.0)))
                .collect();
            points.shuffle(&mut rng);
            readings.extend(points);
            // Every closing sentinel follows every opener. A sensor that
            // closes before another opens would split the sweep into
            // several frames, which is correct behaviour.
            let mut closers = SensorId::REAL.to_vec();
            closers.shuffle(&mut rng);
            readings.extend(closers.iter().map(|id| sentinel(*id)));

            let mut assembler = FrameAssembler::default();
            let frames = feed(&mut assembler, &readings);
            assert_eq!(frames.len(), 1);
            assert!(frames[0].missing_sensors.is_empty());
            assert_eq!(frames[0].points.len(), 12);
            // The first closer completed the frame; every closer reopened its sensor.
            for id in SensorId::REAL {
                assert_eq!(assembler.state(id), SensorFrameState::InProgress);
            }
        }
    }

    #[test]
    fn test_silent_sensor_is_missing() {
        let mut assembler = FrameAssembler::default();
        let frames = feed(
            &mut assembler,
            &[
                sentinel(SensorId::Front),
                sentinel(SensorId::Right),
                sentinel(SensorId::Left),
                point(SensorId::Front, 0.0),
                point(SensorId::Left, -90.0),
                sentinel(SensorId::Front),
            ],
        );
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].missing_sensors, BTreeSet::from([SensorId::Rear]));
    }

    #[test]
    fn test_measurement_before_sentinel_is_discarded() {
        let mut assembler = FrameAssembler::default();
        assert!(assembler.push(point(SensorId::Rear, 180.0)).is_none());
        assert_eq!(assembler.pending_points(), 0);
        assert_eq!(assembler.stats().points_discarded, 1);

        assembler.push(sentinel(SensorId::Rear));
        assembler.push(point(SensorId::Rear, 180.0));
        assert_eq!(assembler.pending_points(), 1);
    }

    #[test]
    fn test_closing_sentinel_opens_next_cycle() {
        let mut assembler = FrameAssembler::new([SensorId::Front, SensorId::Right]);
        let frames = feed(
            &mut assembler,
            &[
                sentinel(SensorId::Front),
                sentinel(SensorId::Right),
                sentinel(SensorId::Front),
                // Front is already open again, so this point belongs to frame 2.
                point(SensorId::Front, 0.0),
                sentinel(SensorId::Front),
            ],
        );

        assert_eq!(frames.len(), 2);
        assert!(frames[0].missing_sensors.is_empty());
        assert!(frames[0].points.is_empty());
        assert_eq!(frames[1].frame_id, 2);
        assert_eq!(frames[1].points.len(), 1);
        // Right never reopened after the reset.
        assert_eq!(frames[1].missing_sensors, BTreeSet::from([SensorId::Right]));
    }

    #[test]
    fn test_undefined_closes_frames_but_is_not_reported() {
        let mut assembler = FrameAssembler::default();
        let frames = feed(
            &mut assembler,
            &[sentinel(SensorId::Undefined), sentinel(SensorId::Undefined)],
        );
        assert_eq!(frames.len(), 1);
        assert!(!frames[0].is_missing(SensorId::Undefined));
        assert_eq!(frames[0].missing_sensors.len(), 4);

        let mut strict = FrameAssembler::new(SensorId::ALL);
        let frames = feed(
            &mut strict,
            &[sentinel(SensorId::Front), sentinel(SensorId::Front)],
        );
        assert!(frames[0].is_missing(SensorId::Undefined));
    }

    #[test]
    fn test_frame_ids_increase() {
        let mut assembler = FrameAssembler::default();
        let readings: Vec<_> = (0..5).map(|_| sentinel(SensorId::Left)).collect();
        let ids: Vec<_> = feed(&mut assembler, &readings)
            .iter()
            .map(|f| f.frame_id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(assembler.stats().frames_completed, 4);
    }
}
