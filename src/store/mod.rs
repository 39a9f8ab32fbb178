//! Store Module
//!
//! In-memory lists keyed by identifier.
//!
//! ## Responsibilities
//! - Stack-like integer lists (append to tail, remove from tail)
//! - Validation for Remove/Get (NotFound, EmptyList, IndexOutOfRange)
//! - Lenient application of log records during replay
//! - Deep copies for snapshotting
//!
//! ## Data Structure Choice
//! A plain `HashMap<String, Vec<i64>>` with no internal locking. The engine
//! wraps the whole map in a single RwLock so that a mutation and its log
//! record are ordered under the same exclusive guard.

mod lists;

pub use lists::{Lists, ListsSnapshot};

use crate::error::{ListError, Result};

/// Check that a list identifier can be written as a single log line
///
/// The empty id is allowed; only line breaks cannot be represented.
pub fn validate_list_id(list_id: &str) -> Result<()> {
    if list_id.contains(['\n', '\r']) {
        return Err(ListError::InvalidListId(list_id.to_string()));
    }
    Ok(())
}
