//! Snapshot Module
//!
//! Whole-state snapshots that let the log be rotated away.
//!
//! ## File Format
//! A single JSON document:
//! ```text
//! {
//!   "version": 1,
//!   "log_generation": 4,
//!   "log_offset": 37,
//!   "lists": { "A": [10, 20], "B": [100] }
//! }
//! ```
//! `log_generation`/`log_offset` name the log position the lists were
//! captured at; replay resumes from there. A bare `{"A": [10, 20]}` map
//! (no envelope) is still accepted and treated as position 0/0.
//!
//! ## Atomicity
//! The document is written to `<snapshot>.tmp`, fsynced, then renamed over
//! the canonical file and the directory is fsynced. Readers only ever see
//! a complete old or a complete new snapshot.

mod file;

pub use file::{SnapshotData, SnapshotFile, SNAPSHOT_VERSION};
