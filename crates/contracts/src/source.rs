//! TelemetrySource trait - decoder abstraction
//!
//! Decouples the ingestion loop from the concrete decoder (UDP, replay file,
//! mock constellation).

use std::time::Duration;

use crate::{ContractError, TelemetryRecord};

/// Pull-based decoder interface
///
/// # Design Principles
///
/// 1. **Bounded blocking**: `recv` waits at most `timeout`, so the caller can
///    observe shutdown between calls
/// 2. **Absence is not an error**: `Ok(None)` means nothing arrived in time
/// 3. **Errors are per record**: a decode failure must not poison later calls
///
/// # Example
///
/// ```ignore
/// let mut source: Box<dyn TelemetrySource> = open_source(&config)?;
/// while !shutdown.is_triggered() {
///     if let Some(record) = source.recv(Duration::from_millis(100))? {
///         // classify and enqueue
///     }
/// }
/// ```
pub trait TelemetrySource: Send {
    /// Source name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Receive the next record, waiting at most `timeout`
    ///
    /// # Errors
    /// Returns decode or transport errors for the current attempt only
    fn recv(&mut self, timeout: Duration) -> Result<Option<TelemetryRecord>, ContractError>;

    /// Finite sources return `true` once nothing more will ever arrive
    fn is_exhausted(&self) -> bool {
        false
    }
}

impl<T: TelemetrySource + ?Sized> TelemetrySource for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn recv(&mut self, timeout: Duration) -> Result<Option<TelemetryRecord>, ContractError> {
        (**self).recv(timeout)
    }

    fn is_exhausted(&self) -> bool {
        (**self).is_exhausted()
    }
}
