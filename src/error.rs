//! Error types for RemoteList
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

use crate::compactor::CompactionPhase;

/// Result type alias using ListError
pub type Result<T> = std::result::Result<T, ListError>;

/// Unified error type for RemoteList operations
#[derive(Debug, Error)]
pub enum ListError {
    // -------------------------------------------------------------------------
    // Validation Errors (returned to the caller verbatim, no state change)
    // -------------------------------------------------------------------------
    #[error("list not found")]
    NotFound,

    #[error("list is empty")]
    EmptyList,

    #[error("index out of range")]
    IndexOutOfRange,

    #[error("invalid list id: {0:?}")]
    InvalidListId(String),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Snapshot Errors
    // -------------------------------------------------------------------------
    #[error("snapshot decode failed: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("server error: {0}")]
    Remote(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Background Errors
    // -------------------------------------------------------------------------
    #[error("compaction failed while {phase}: {source}")]
    Compaction {
        phase: CompactionPhase,
        #[source]
        source: Box<ListError>,
    },
}

impl ListError {
    /// True for errors caused by the request itself rather than the server
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ListError::NotFound
                | ListError::EmptyList
                | ListError::IndexOutOfRange
                | ListError::InvalidListId(_)
        )
    }
}

impl From<bincode::Error> for ListError {
    fn from(e: bincode::Error) -> Self {
        ListError::Serialization(e.to_string())
    }
}
