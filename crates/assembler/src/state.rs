//! Per-sensor sweep state

use contracts::SensorId;

/// Sweep state of one sensor within the current cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SensorFrameState {
    #[default]
    NotStarted,
    InProgress,
}

/// Fixed-size state table indexed by [`SensorId::index`]
#[derive(Debug, Clone, Default)]
pub struct SensorStates {
    states: [SensorFrameState; SensorId::COUNT],
}

impl SensorStates {
    #[inline]
    pub fn get(&self, id: SensorId) -> SensorFrameState {
        self.states[id.index()]
    }

    #[inline]
    pub fn set(&mut self, id: SensorId, state: SensorFrameState) {
        self.states[id.index()] = state;
    }

    pub fn reset(&mut self) {
        self.states = [SensorFrameState::NotStarted; SensorId::COUNT];
    }

    /// Sensors currently in a sweep, in index order
    pub fn in_progress(&self) -> impl Iterator<Item = SensorId> + '_ {
        SensorId::ALL
            .into_iter()
            .filter(|id| self.get(*id) == SensorFrameState::InProgress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_reset() {
        let mut states = SensorStates::default();
        states.set(SensorId::Left, SensorFrameState::InProgress);
        states.set(SensorId::Undefined, SensorFrameState::InProgress);
        assert_eq!(
            states.in_progress().collect::<Vec<_>>(),
            vec![SensorId::Undefined, SensorId::Left]
        );
        states.reset();
        assert_eq!(states.in_progress().count(), 0);
    }
}
