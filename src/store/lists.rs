//! Lists implementation
//!
//! HashMap-backed stack lists. Callers provide the locking.

use std::collections::{BTreeMap, HashMap};

use crate::error::{ListError, Result};
use crate::wal::LogRecord;

/// Deep, ordered copy of every list (what a snapshot persists)
pub type ListsSnapshot = BTreeMap<String, Vec<i64>>;

/// In-memory collection of integer lists
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Lists {
    lists: HashMap<String, Vec<i64>>,
}

impl Lists {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `value` to the tail of `list_id`, creating the list if absent
    pub fn append(&mut self, list_id: &str, value: i64) {
        match self.lists.get_mut(list_id) {
            Some(values) => values.push(value),
            None => {
                self.lists.insert(list_id.to_string(), vec![value]);
            }
        }
    }

    /// The value a `remove` would return, without removing it
    pub fn peek_tail(&self, list_id: &str) -> Result<i64> {
        let values = self.lists.get(list_id).ok_or(ListError::NotFound)?;
        values.last().copied().ok_or(ListError::EmptyList)
    }

    /// Pop the tail of `list_id`
    pub fn remove(&mut self, list_id: &str) -> Result<i64> {
        let values = self.lists.get_mut(list_id).ok_or(ListError::NotFound)?;
        values.pop().ok_or(ListError::EmptyList)
    }

    /// Value at a 0-based `index` (tail is the last index)
    pub fn get(&self, list_id: &str, index: i64) -> Result<i64> {
        let values = self.lists.get(list_id).ok_or(ListError::NotFound)?;
        usize::try_from(index)
            .ok()
            .and_then(|i| values.get(i))
            .copied()
            .ok_or(ListError::IndexOutOfRange)
    }

    /// Length of `list_id`, 0 when absent
    pub fn size(&self, list_id: &str) -> i64 {
        self.lists.get(list_id).map_or(0, |values| values.len() as i64)
    }

    /// Apply a replayed log record.
    ///
    /// Never fails: a Remove against an absent or empty list is a no-op,
    /// since the live Remove was validated before it was logged.
    /// Returns whether the state changed.
    pub fn apply(&mut self, record: &LogRecord) -> bool {
        match record {
            LogRecord::Append { list_id, value } => {
                self.append(list_id, *value);
                true
            }
            LogRecord::Remove { list_id } => self.remove(list_id).is_ok(),
        }
    }

    /// Number of lists (including emptied ones)
    pub fn list_count(&self) -> usize {
        self.lists.len()
    }

    /// Total number of values across every list
    pub fn value_count(&self) -> usize {
        self.lists.values().map(Vec::len).sum()
    }

    /// Deep-copy every list into an ordered map
    pub fn to_snapshot(&self) -> ListsSnapshot {
        self.lists
            .iter()
            .map(|(id, values)| (id.clone(), values.clone()))
            .collect()
    }
}

impl From<ListsSnapshot> for Lists {
    fn from(snapshot: ListsSnapshot) -> Self {
        Self {
            lists: snapshot.into_iter().collect(),
        }
    }
}
