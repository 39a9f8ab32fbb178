//! Log Reader
//!
//! Streams lines out of a log file while tracking byte offsets.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use crate::error::Result;
use super::{LogHeader, LogRecord};

/// One classified line of a log file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLine {
    /// A header line found after the start of the file
    Header(LogHeader),

    /// A well-formed record
    Record(LogRecord),

    /// A complete line that is not a record
    Malformed(String),

    /// Final bytes with no terminating newline (interrupted write)
    Truncated(usize),
}

/// Reads lines from a log file
pub struct LogReader {
    reader: BufReader<File>,

    /// Offset just past the last complete line consumed
    position: u64,

    /// Header of this file, if it has one
    header: Option<LogHeader>,

    buf: Vec<u8>,
}

impl LogReader {
    /// Open a log file and consume its header line, if present
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = Self {
            reader: BufReader::new(file),
            position: 0,
            header: None,
            buf: Vec::new(),
        };
        reader.read_header()?;
        Ok(reader)
    }

    fn read_header(&mut self) -> Result<()> {
        let n = self.reader.read_until(b'\n', &mut self.buf)?;
        if n > 0 && self.buf.ends_with(b"\n") {
            let header = std::str::from_utf8(&self.buf[..n - 1])
                .ok()
                .and_then(LogHeader::parse);
            if let Some(header) = header {
                self.header = Some(header);
                self.position = n as u64;
                return Ok(());
            }
        }

        // Legacy log without a header: records start at byte 0
        self.reader.seek(SeekFrom::Start(0))?;
        self.position = 0;
        Ok(())
    }

    /// Header of this file
    pub fn header(&self) -> Option<LogHeader> {
        self.header
    }

    /// Generation of this file (0 for headerless logs)
    pub fn generation(&self) -> u64 {
        self.header.map_or(0, |h| h.generation)
    }

    /// Offset just past the last complete line read so far
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Skip forward to `offset`; offsets behind the current position are ignored
    pub fn seek_to(&mut self, offset: u64) -> Result<()> {
        if offset > self.position {
            self.reader.seek(SeekFrom::Start(offset))?;
            self.position = offset;
        }
        Ok(())
    }

    /// Read and classify the next line
    pub fn next_line(&mut self) -> Result<Option<LogLine>> {
        self.buf.clear();
        let n = self.reader.read_until(b'\n', &mut self.buf)?;
        if n == 0 {
            return Ok(None);
        }

        if !self.buf.ends_with(b"\n") {
            return Ok(Some(LogLine::Truncated(n)));
        }
        self.position += n as u64;

        let text = String::from_utf8_lossy(&self.buf[..n - 1]);
        let line = match LogRecord::parse(&text) {
            Some(record) => LogLine::Record(record),
            None => match LogHeader::parse(&text) {
                Some(header) => LogLine::Header(header),
                None => LogLine::Malformed(text.into_owned()),
            },
        };
        Ok(Some(line))
    }
}

impl Iterator for LogReader {
    type Item = Result<LogLine>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}
