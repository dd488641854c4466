//! Scripted source: replays a fixed list of steps, used by tests

use std::collections::VecDeque;
use std::time::Duration;

use contracts::{ContractError, TelemetryRecord, TelemetrySource};

/// One scripted `recv` result
#[derive(Debug, Clone)]
pub enum ScriptStep {
    Record(TelemetryRecord),
    /// Simulates a receive timeout
    Idle,
    /// Simulates a decode failure
    Error(String),
}

/// Deterministic in-memory source
#[derive(Debug, Default)]
pub struct ScriptedSource {
    name: String,
    steps: VecDeque<ScriptStep>,
}

impl ScriptedSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: VecDeque::new(),
        }
    }

    /// Build a source that yields `records` in order
    pub fn from_records(records: impl IntoIterator<Item = TelemetryRecord>) -> Self {
        let mut source = Self::new("scripted");
        source.steps = records.into_iter().map(ScriptStep::Record).collect();
        source
    }

    pub fn push(&mut self, step: ScriptStep) -> &mut Self {
        self.steps.push_back(step);
        self
    }

    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

impl TelemetrySource for ScriptedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn recv(&mut self, timeout: Duration) -> Result<Option<TelemetryRecord>, ContractError> {
        match self.steps.pop_front() {
            Some(ScriptStep::Record(record)) => Ok(Some(record)),
            Some(ScriptStep::Idle) => Ok(None),
            Some(ScriptStep::Error(message)) => Err(ContractError::decode(&self.name, message)),
            None => {
                // Behave like an idle link rather than spinning.
                std::thread::sleep(timeout.min(Duration::from_millis(5)));
                Ok(None)
            }
        }
    }

    fn is_exhausted(&self) -> bool {
        self.steps.is_empty()
    }
}
