//! Compactor
//!
//! Background thread that periodically folds the log into a snapshot.
//!
//! ## Cycle
//! ```text
//! Idle → Copying → Writing → Renaming → RotatingLog → Idle
//! ```
//! - Copying: deep copy of the lists plus the log position, under the
//!   shared lock only
//! - Writing: serialize the copy to `<snapshot>.tmp` and fsync
//! - Renaming: atomically replace the snapshot
//! - RotatingLog: under the log lock, start a new log generation holding
//!   only the records written since the copy; the old log becomes
//!   `<log>.old`
//!
//! A failure in any phase aborts the cycle and leaves the previous
//! snapshot and the live log as they were. The next tick retries.

use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, Sender};

use crate::engine::Engine;
use crate::error::{ListError, Result};
use crate::snapshot::SnapshotData;

/// Where a compaction cycle was when it failed
///
/// Copying cannot fail, so it has no variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactionPhase {
    Writing,
    Renaming,
    RotatingLog,
}

impl fmt::Display for CompactionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompactionPhase::Writing => "writing snapshot",
            CompactionPhase::Renaming => "renaming snapshot",
            CompactionPhase::RotatingLog => "rotating log",
        };
        f.write_str(name)
    }
}

/// Outcome of one successful cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactionReport {
    /// Lists in the snapshot
    pub lists: usize,

    /// Values in the snapshot
    pub values: usize,

    /// Size of the snapshot file
    pub snapshot_bytes: u64,

    /// Generation of the log now live
    pub log_generation: u64,

    /// Records written after the copy that moved into the new log
    pub carried_records: u64,

    pub elapsed: Duration,
}

fn in_phase<T>(phase: CompactionPhase, result: Result<T>) -> Result<T> {
    result.map_err(|source| ListError::Compaction {
        phase,
        source: Box::new(source),
    })
}

/// Run one cycle against `engine`
///
/// Callers serialize cycles; `Engine::compact` is the entry point.
pub(crate) fn run_cycle(engine: &Engine) -> Result<CompactionReport> {
    let started = Instant::now();

    let (lists, cut) = engine.snapshot_copy();
    let list_count = lists.len();
    let value_count = lists.values().map(Vec::len).sum();
    tracing::debug!(
        "Copied {} lists at log position {}:{}",
        list_count,
        cut.generation,
        cut.offset
    );

    let data = SnapshotData::new(lists, cut);
    let snapshot = engine.snapshot_file();
    let snapshot_bytes = in_phase(CompactionPhase::Writing, snapshot.write_temp(&data))?;
    drop(data);

    in_phase(CompactionPhase::Renaming, snapshot.commit())?;

    let carried_records = in_phase(CompactionPhase::RotatingLog, engine.rotate_log(cut))?;

    Ok(CompactionReport {
        lists: list_count,
        values: value_count,
        snapshot_bytes,
        log_generation: cut.generation + 1,
        carried_records,
        elapsed: started.elapsed(),
    })
}

/// Handle to the background compaction thread
///
/// The thread stops when this handle is stopped or dropped.
pub struct Compactor {
    shutdown: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Compactor {
    /// Start compacting `engine` every `interval`
    pub fn start(engine: Arc<Engine>, interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(ListError::Config(
                "compaction interval must be greater than zero".to_string(),
            ));
        }

        let (shutdown_tx, shutdown_rx) = channel::bounded::<()>(0);

        let handle = thread::Builder::new()
            .name("compactor".to_string())
            .spawn(move || Self::run(engine, interval, shutdown_rx))?;

        tracing::info!("Compactor started (interval {:?})", interval);

        Ok(Self {
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    fn run(engine: Arc<Engine>, interval: Duration, shutdown: Receiver<()>) {
        let ticker = channel::tick(interval);

        loop {
            crossbeam::select! {
                recv(ticker) -> _ => match engine.compact() {
                    Ok(report) => tracing::info!(
                        "Compaction done: {} lists, {} values, {} bytes, log generation {}, {} carried, {:?}",
                        report.lists,
                        report.values,
                        report.snapshot_bytes,
                        report.log_generation,
                        report.carried_records,
                        report.elapsed
                    ),
                    Err(e) => tracing::warn!("Compaction aborted, retrying next interval: {}", e),
                },
                recv(shutdown) -> _ => break,
            }
        }

        tracing::debug!("Compactor stopped");
    }

    /// Stop the thread and wait for an in-progress cycle to finish
    pub fn stop(mut self) {
        self.shutdown_and_join();
    }

    fn shutdown_and_join(&mut self) {
        // Dropping the sender disconnects the channel, which wakes `select!`
        self.shutdown.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Compactor thread panicked");
            }
        }
    }
}

impl Drop for Compactor {
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}
