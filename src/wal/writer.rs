//! Log Writer
//!
//! Appends records to the log file and fsyncs each one.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use super::{LogHeader, LogPosition, LogRecord};

/// Writes records to one log file
///
/// A record is committed once `append` returns `Ok`. On a failed write the
/// file is cut back to its previous length, so the log never keeps a
/// partial or unacknowledged line.
pub struct LogWriter {
    file: File,
    path: PathBuf,
    generation: u64,

    /// Bytes known to be durable, header included
    len: u64,

    records_written: u64,

    /// Set when a failed write could not be rolled back
    poisoned: bool,
}

impl LogWriter {
    /// Create (or truncate) a log file with a fresh header
    pub fn create(path: &Path, generation: u64) -> Result<Self> {
        let mut file = File::create(path)?;
        file.write_all(LogHeader::new(generation).encode().as_bytes())?;
        file.sync_all()?;
        drop(file);

        Self::open(path, generation)
    }

    /// Open an existing log for append
    ///
    /// `generation` is the one recovery read from the file's header.
    pub fn open(path: &Path, generation: u64) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Self::from_file(file, path, generation)
    }

    /// Wrap an already-open handle to the log at `path`
    ///
    /// Writes go to the handle's current position, so it should be opened
    /// for append.
    pub fn from_file(file: File, path: &Path, generation: u64) -> Result<Self> {
        let len = file.metadata()?.len();

        Ok(Self {
            file,
            path: path.to_path_buf(),
            generation,
            len,
            records_written: 0,
            poisoned: false,
        })
    }

    /// Append one record and fsync it
    ///
    /// Returns the log length after the record.
    pub fn append(&mut self, record: &LogRecord) -> Result<u64> {
        self.write_durable(record.encode().as_bytes())?;
        self.records_written += 1;

        tracing::trace!("Logged {} at {}:{}", record, self.generation, self.len);
        Ok(self.len)
    }

    /// Append already-encoded lines (used to carry records across a rotation)
    pub fn append_raw(&mut self, lines: &[u8]) -> Result<()> {
        if lines.is_empty() {
            return Ok(());
        }
        self.write_durable(lines)?;
        self.records_written += lines.iter().filter(|&&b| b == b'\n').count() as u64;
        Ok(())
    }

    fn write_durable(&mut self, bytes: &[u8]) -> Result<()> {
        if self.poisoned {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "operation log is unusable after a failed rollback",
            )
            .into());
        }

        let outcome = self
            .file
            .write_all(bytes)
            .and_then(|_| self.file.sync_data());

        if let Err(e) = outcome {
            self.rollback();
            return Err(e.into());
        }

        self.len += bytes.len() as u64;
        Ok(())
    }

    fn rollback(&mut self) {
        let restored = self
            .file
            .set_len(self.len)
            .and_then(|_| self.file.sync_data());

        if let Err(e) = restored {
            tracing::error!(
                "Could not roll back {} to {} bytes, refusing further appends: {}",
                self.path.display(),
                self.len,
                e
            );
            self.poisoned = true;
        }
    }

    /// Read every byte written after `offset`
    pub fn read_since(&self, offset: u64) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        if offset >= self.len {
            return Ok(bytes);
        }

        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(offset))?;
        file.take(self.len - offset).read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    /// Current end of the log
    pub fn position(&self) -> LogPosition {
        LogPosition::new(self.generation, self.len)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether a failed write left the file in an unknown state
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Records appended through this handle
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record that the underlying file was renamed
    pub(crate) fn set_path(&mut self, path: PathBuf) {
        self.path = path;
    }
}
