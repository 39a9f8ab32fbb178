//! Operation Log Module
//!
//! Provides durability guarantees through an append-only, line-oriented log.
//!
//! ## Responsibilities
//! - Append one record per mutation and fsync before acknowledging it
//! - Replay records on top of the latest snapshot during startup
//! - Tolerate malformed lines and a truncated final line
//! - Tag every log file with a generation so snapshots can name
//!   exactly which prefix they already contain
//!
//! ## File Format
//! ```text
//! #REMOTELIST-LOG v1 generation=3      <- header (absent in legacy logs)
//! APPEND:<listID>:<value>
//! REMOVE:<listID>
//! ...
//! ```

mod record;
mod reader;
mod writer;
mod recovery;

use serde::{Deserialize, Serialize};

pub use record::{LogHeader, LogRecord, LOG_FORMAT_VERSION, LOG_MAGIC};
pub use reader::{LogLine, LogReader};
pub use writer::LogWriter;
pub use recovery::{LogRecovery, RecoveryResult};

/// A point in the log: a generation plus a byte offset within that file.
///
/// Everything before `offset` in log `generation` (and every older
/// generation) is reflected in the state this position was captured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LogPosition {
    pub generation: u64,
    pub offset: u64,
}

impl LogPosition {
    pub fn new(generation: u64, offset: u64) -> Self {
        Self { generation, offset }
    }
}
