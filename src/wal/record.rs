//! Log record definitions
//!
//! Defines the textual encoding of individual log lines.

use std::fmt;

/// First token of a log header line
pub const LOG_MAGIC: &str = "#REMOTELIST-LOG";

/// Current log format version
pub const LOG_FORMAT_VERSION: u32 = 1;

const APPEND_PREFIX: &str = "APPEND:";
const REMOVE_PREFIX: &str = "REMOVE:";

/// A single mutation recorded in the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRecord {
    /// Push `value` to the tail of `list_id`
    Append { list_id: String, value: i64 },

    /// Pop the tail of `list_id`
    Remove { list_id: String },
}

impl LogRecord {
    pub fn append(list_id: impl Into<String>, value: i64) -> Self {
        LogRecord::Append {
            list_id: list_id.into(),
            value,
        }
    }

    pub fn remove(list_id: impl Into<String>) -> Self {
        LogRecord::Remove {
            list_id: list_id.into(),
        }
    }

    /// Encode as one newline-terminated line
    pub fn encode(&self) -> String {
        format!("{}\n", self)
    }

    /// Parse one line (without its newline).
    ///
    /// The value of an APPEND is the text after the last `:`, so list ids
    /// may themselves contain `:`. Anything else yields `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if let Some(rest) = line.strip_prefix(APPEND_PREFIX) {
            let (list_id, value) = rest.rsplit_once(':')?;
            let value = value.parse::<i64>().ok()?;
            return Some(LogRecord::append(list_id, value));
        }

        if let Some(list_id) = line.strip_prefix(REMOVE_PREFIX) {
            return Some(LogRecord::remove(list_id));
        }

        None
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogRecord::Append { list_id, value } => write!(f, "{}{}:{}", APPEND_PREFIX, list_id, value),
            LogRecord::Remove { list_id } => write!(f, "{}{}", REMOVE_PREFIX, list_id),
        }
    }
}

/// First line of every log file written by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogHeader {
    pub version: u32,
    pub generation: u64,
}

impl LogHeader {
    pub fn new(generation: u64) -> Self {
        Self {
            version: LOG_FORMAT_VERSION,
            generation,
        }
    }

    pub fn encode(&self) -> String {
        format!("{} v{} generation={}\n", LOG_MAGIC, self.version, self.generation)
    }

    /// Parse a header line; `None` if the line is not a header
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.strip_prefix(LOG_MAGIC)?;
        let mut parts = rest.split_whitespace();

        let version = parts.next()?.strip_prefix('v')?.parse().ok()?;
        let generation = parts.next()?.strip_prefix("generation=")?.parse().ok()?;

        Some(Self { version, generation })
    }
}
