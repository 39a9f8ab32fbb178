//! Log Recovery
//!
//! Replays the log on top of a snapshot after a restart.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::Path;

use crate::error::Result;
use crate::store::Lists;
use super::{LogLine, LogPosition, LogReader, LogRecord};

/// Handles log replay after a restart
pub struct LogRecovery;

/// Result of a recovery operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Generation read from the log header; `None` if the log is missing or empty
    pub generation: Option<u64>,

    /// Offset replay started from
    pub start_offset: u64,

    /// Records that changed state
    pub records_applied: u64,

    /// Removes that found nothing to remove
    pub records_ignored: u64,

    /// Complete lines that were not records
    pub lines_skipped: u64,

    /// Whether a partial final line was cut off
    pub was_truncated: bool,

    /// Log cannot continue from the snapshot (older generation, or shorter
    /// than the snapshot's offset); nothing was replayed
    pub stale: bool,

    /// Length of the log up to its last complete line
    pub valid_len: u64,
}

impl RecoveryResult {
    /// Total records read from the log
    pub fn records_replayed(&self) -> u64 {
        self.records_applied + self.records_ignored
    }
}

impl LogRecovery {
    /// Replay `path` into `lists`, starting after `since`.
    ///
    /// This will:
    /// 1. Decide where to start from the header generation and `since`
    /// 2. Apply every record, skipping malformed lines
    /// 3. Cut a partial final line off the file
    pub fn replay(path: &Path, lists: &mut Lists, since: LogPosition) -> Result<RecoveryResult> {
        let result = Self::scan(path, since, |record| lists.apply(record))?;

        if result.was_truncated {
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(result.valid_len)?;
            file.sync_all()?;
            tracing::warn!(
                "Trimmed partial record from {} (now {} bytes)",
                path.display(),
                result.valid_len
            );
        }

        Ok(result)
    }

    /// Scan a log without modifying it or any state
    pub fn verify(path: &Path, since: LogPosition) -> Result<RecoveryResult> {
        Self::scan(path, since, |_| true)
    }

    fn scan<F>(path: &Path, since: LogPosition, mut apply: F) -> Result<RecoveryResult>
    where
        F: FnMut(&LogRecord) -> bool,
    {
        let mut result = RecoveryResult::default();

        let len = match fs::metadata(path) {
            Ok(metadata) => metadata.len(),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(result),
            Err(e) => return Err(e.into()),
        };
        if len == 0 {
            return Ok(result);
        }

        let mut reader = LogReader::open(path)?;
        let generation = reader.generation();
        result.generation = Some(generation);

        if generation < since.generation {
            tracing::warn!(
                "Log {} has generation {} but snapshot covers up to generation {}; not replaying",
                path.display(),
                generation,
                since.generation
            );
            result.stale = true;
            result.start_offset = len;
            result.valid_len = len;
            return Ok(result);
        }

        if generation == since.generation {
            if since.offset > len {
                tracing::warn!(
                    "Snapshot offset {} is past the end of {} ({} bytes); not replaying",
                    since.offset,
                    path.display(),
                    len
                );
                result.stale = true;
                result.start_offset = len;
                result.valid_len = len;
                return Ok(result);
            }
            reader.seek_to(since.offset)?;
        }
        result.start_offset = reader.position();

        while let Some(line) = reader.next_line()? {
            match line {
                LogLine::Record(record) => {
                    if apply(&record) {
                        result.records_applied += 1;
                    } else {
                        result.records_ignored += 1;
                    }
                }
                LogLine::Header(_) | LogLine::Malformed(_) => {
                    tracing::debug!("Skipping unrecognized log line in {}", path.display());
                    result.lines_skipped += 1;
                }
                LogLine::Truncated(bytes) => {
                    tracing::warn!(
                        "Ignoring {} trailing bytes without newline in {}",
                        bytes,
                        path.display()
                    );
                    result.was_truncated = true;
                }
            }
        }
        result.valid_len = reader.position();

        Ok(result)
    }
}
