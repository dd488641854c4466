//! JSON-lines replay source

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use contracts::{ContractError, TelemetryRecord, TelemetrySource};
use tracing::debug;

use crate::error::{IngestionError, Result};

/// Replays a capture file, one serialized [`TelemetryRecord`] per line.
///
/// Blank lines and lines starting with `#` are skipped.
pub struct ReplaySource {
    name: String,
    path: PathBuf,
    reader: BufReader<File>,
    interval: Duration,
    looping: bool,
    next_due: Instant,
    line_no: u64,
    exhausted: bool,
}

impl ReplaySource {
    /// Open `path`
    ///
    /// `interval` paces records (zero = as fast as the caller polls);
    /// `looping` rewinds at end of file instead of reporting exhaustion.
    pub fn open(path: impl AsRef<Path>, interval: Duration, looping: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let name = format!("replay:{}", path.display());
        let file = File::open(&path)
            .map_err(|e| IngestionError::source_open(&name, e.to_string()))?;

        Ok(Self {
            name,
            path,
            reader: BufReader::new(file),
            interval,
            looping,
            next_due: Instant::now(),
            line_no: 0,
            exhausted: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn rewind(&mut self) -> std::result::Result<(), ContractError> {
        self.reader.seek(SeekFrom::Start(0))?;
        self.line_no = 0;
        debug!(source = %self.name, "replay rewound");
        Ok(())
    }

    /// Next non-blank line, or `None` at end of file
    fn next_line(&mut self) -> std::result::Result<Option<String>, ContractError> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            let trimmed = line.trim();
            if !trimmed.is_empty() && !trimmed.starts_with('#') {
                return Ok(Some(trimmed.to_string()));
            }
        }
    }
}

impl TelemetrySource for ReplaySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn recv(
        &mut self,
        timeout: Duration,
    ) -> std::result::Result<Option<TelemetryRecord>, ContractError> {
        if self.exhausted {
            std::thread::sleep(timeout.min(Duration::from_millis(5)));
            return Ok(None);
        }

        let now = Instant::now();
        if now < self.next_due {
            let wait = self.next_due - now;
            if wait > timeout {
                std::thread::sleep(timeout);
                return Ok(None);
            }
            std::thread::sleep(wait);
        }

        let line = match self.next_line()? {
            Some(line) => line,
            None if self.looping => {
                self.rewind()?;
                match self.next_line()? {
                    Some(line) => line,
                    None => {
                        self.exhausted = true;
                        return Ok(None);
                    }
                }
            }
            None => {
                debug!(source = %self.name, lines = self.line_no, "replay finished");
                self.exhausted = true;
                return Ok(None);
            }
        };

        self.next_due = Instant::now() + self.interval;
        serde_json::from_str(&line).map(Some).map_err(|e| {
            ContractError::decode(&self.name, format!("line {}: {e}", self.line_no))
        })
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TIMEOUT: Duration = Duration::from_millis(10);

    fn capture(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[test]
    fn test_reads_records_then_exhausts() {
        let file = capture(&[
            r#"{"kind":"obstacle","sensor_id":1,"yaw":0,"pitch":0,"distance":0}"#,
            "",
            "# comment",
            r#"{"kind":"altitude","distance":28}"#,
        ]);
        let mut source = ReplaySource::open(file.path(), Duration::ZERO, false).unwrap();

        assert_eq!(
            source.recv(TIMEOUT).unwrap(),
            Some(TelemetryRecord::boundary(1))
        );
        assert_eq!(
            source.recv(TIMEOUT).unwrap(),
            Some(TelemetryRecord::Altitude { distance: 28 })
        );
        assert!(!source.is_exhausted());
        assert_eq!(source.recv(TIMEOUT).unwrap(), None);
        assert!(source.is_exhausted());
    }

    #[test]
    fn test_bad_line_is_per_record_error() {
        let file = capture(&["not json", r#"{"kind":"altitude","distance":5}"#]);
        let mut source = ReplaySource::open(file.path(), Duration::ZERO, false).unwrap();

        let err = source.recv(TIMEOUT).unwrap_err();
        assert!(err.to_string().contains("line 1"));
        assert_eq!(
            source.recv(TIMEOUT).unwrap(),
            Some(TelemetryRecord::Altitude { distance: 5 })
        );
    }

    #[test]
    fn test_looping_rewinds() {
        let file = capture(&[r#"{"kind":"altitude","distance":7}"#]);
        let mut source = ReplaySource::open(file.path(), Duration::ZERO, true).unwrap();
        for _ in 0..3 {
            assert_eq!(
                source.recv(TIMEOUT).unwrap(),
                Some(TelemetryRecord::Altitude { distance: 7 })
            );
        }
        assert!(!source.is_exhausted());
    }

    #[test]
    fn test_pacing_returns_none_until_due() {
        let file = capture(&[
            r#"{"kind":"altitude","distance":1}"#,
            r#"{"kind":"altitude","distance":2}"#,
        ]);
        let mut source =
            ReplaySource::open(file.path(), Duration::from_secs(10), false).unwrap();
        assert!(source.recv(TIMEOUT).unwrap().is_some());
        assert_eq!(source.recv(TIMEOUT).unwrap(), None);
    }

    #[test]
    fn test_missing_file() {
        let err = ReplaySource::open("/nonexistent/capture.jsonl", Duration::ZERO, false)
            .err()
            .unwrap();
        assert!(matches!(err, IngestionError::SourceOpen { .. }));
    }
}
