//! Engine Module
//!
//! Owns the lists and the operation log and coordinates them.
//!
//! ## Responsibilities
//! - Crash recovery on startup (snapshot, then log replay)
//! - Append/Remove/Get/Size with log-before-apply durability
//! - Consistent state capture and log rotation for the compactor

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::{Mutex, RwLock};

use crate::compactor::{self, CompactionReport};
use crate::config::Config;
use crate::error::{ListError, Result};
use crate::io_util;
use crate::protocol::{AppendReply, Reply, Request, SizeReply, ValueReply};
use crate::snapshot::SnapshotFile;
use crate::store::{self, Lists, ListsSnapshot};
use crate::wal::{LogPosition, LogRecord, LogRecovery, LogWriter, RecoveryResult};

/// The list store engine
///
/// ## Concurrency Model
///
/// - `lists`: one RwLock over the whole map. Append/Remove hold it
///   exclusively for the full call, including the log write, so the order
///   of records in the log is the order mutations took effect.
///   Get/Size hold it shared.
/// - `log`: the rotation lock. Mutators take it while already holding
///   `lists`; the compactor takes it on its own to swap files. Lock order
///   is always `lists` → `log`.
/// - `compaction`: serializes compaction cycles.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// All lists, under a single reader/writer lock
    lists: RwLock<Lists>,

    /// Live operation log
    log: Mutex<LogWriter>,

    /// Canonical snapshot location
    snapshot: SnapshotFile,

    /// Held for the duration of a compaction cycle
    compaction: Mutex<()>,

    /// What startup replay found
    recovery: RecoveryResult,

    /// Completed compaction cycles since open
    compactions: AtomicU64,
}

impl Engine {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const SNAPSHOT_FILENAME: &'static str = "snapshot.json";
    const LOG_FILENAME: &'static str = "operations.log";
    const OLD_LOG_SUFFIX: &'static str = ".old";
    const NEXT_LOG_SUFFIX: &'static str = ".next";

    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Open/create data directory
    /// 2. Finish or discard an interrupted log rotation
    /// 3. Load the snapshot (a corrupt one is fatal)
    /// 4. Replay the log written since that snapshot
    /// 5. Open the log for append
    pub fn open(config: Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;

        let snapshot = SnapshotFile::new(config.data_dir.join(Self::SNAPSHOT_FILENAME));
        let log_path = config.data_dir.join(Self::LOG_FILENAME);

        Self::repair_rotation(&config.data_dir, &log_path)?;
        if io_util::remove_if_exists(snapshot.tmp_path())? {
            tracing::warn!("Removed unfinished snapshot {}", snapshot.tmp_path().display());
        }

        let (mut lists, since) = match snapshot.load()? {
            Some(data) => {
                let position = data.position();
                tracing::info!(
                    "Loaded snapshot: {} lists, log position {}:{}",
                    data.lists.len(),
                    position.generation,
                    position.offset
                );
                (Lists::from(data.lists), position)
            }
            None => {
                tracing::info!("No snapshot found, starting empty");
                (Lists::new(), LogPosition::default())
            }
        };

        let recovery = LogRecovery::replay(&log_path, &mut lists, since)?;
        if recovery.records_replayed() > 0 || recovery.lines_skipped > 0 || recovery.was_truncated {
            tracing::info!(
                "Log recovery: {} records applied, {} removes ignored, {} lines skipped, truncated={}",
                recovery.records_applied,
                recovery.records_ignored,
                recovery.lines_skipped,
                recovery.was_truncated
            );
        }

        let log = match recovery.generation {
            Some(generation) if !recovery.stale => LogWriter::open(&log_path, generation)?,
            // Appending to a stale log would put records where the next
            // replay does not look
            Some(_) => {
                let old_path = Self::sibling(&log_path, Self::OLD_LOG_SUFFIX);
                tracing::warn!("Moving stale log aside to {}", old_path.display());
                fs::rename(&log_path, &old_path)?;
                LogWriter::create(&log_path, since.generation + 1)?
            }
            // Never reuse the snapshot's generation for a new file: its
            // offset refers to a log that no longer exists.
            None => LogWriter::create(&log_path, since.generation + 1)?,
        };
        io_util::sync_dir(&config.data_dir)?;

        tracing::info!(
            "Engine ready: {} lists, {} values, log generation {}",
            lists.list_count(),
            lists.value_count(),
            log.generation()
        );

        Ok(Self {
            config,
            lists: RwLock::new(lists),
            log: Mutex::new(log),
            snapshot,
            compaction: Mutex::new(()),
            recovery,
            compactions: AtomicU64::new(0),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Execute a request
    ///
    /// Routes requests to appropriate handlers
    pub fn execute(&self, request: Request) -> Result<Reply> {
        match request {
            Request::Append(args) => {
                self.append(&args.list_id, args.value)?;
                Ok(Reply::Append(AppendReply { success: true }))
            }
            Request::Remove(args) => {
                let value = self.remove(&args.list_id)?;
                Ok(Reply::Value(ValueReply { value }))
            }
            Request::Get(args) => {
                let value = self.get(&args.list_id, args.index)?;
                Ok(Reply::Value(ValueReply { value }))
            }
            Request::Size(args) => Ok(Reply::Size(SizeReply {
                size: self.size(&args.list_id),
            })),
            Request::Ping => Ok(Reply::Pong),
        }
    }

    /// Push `value` to the tail of `list_id`
    ///
    /// The record is fsynced before the list changes; if the log write
    /// fails the list is left untouched.
    pub fn append(&self, list_id: &str, value: i64) -> Result<()> {
        store::validate_list_id(list_id)?;

        let mut lists = self.lists.write();
        self.log.lock().append(&LogRecord::append(list_id, value))?;
        lists.append(list_id, value);

        Ok(())
    }

    /// Pop and return the tail of `list_id`
    ///
    /// Fails with `NotFound`/`EmptyList` without logging anything.
    pub fn remove(&self, list_id: &str) -> Result<i64> {
        store::validate_list_id(list_id)?;

        let mut lists = self.lists.write();

        let tail = lists.peek_tail(list_id)?;
        self.log.lock().append(&LogRecord::remove(list_id))?;
        lists.remove(list_id)?;

        Ok(tail)
    }

    /// Value at `index` in `list_id`
    pub fn get(&self, list_id: &str, index: i64) -> Result<i64> {
        self.lists.read().get(list_id, index)
    }

    /// Length of `list_id` (0 when absent)
    pub fn size(&self, list_id: &str) -> i64 {
        self.lists.read().size(list_id)
    }

    // =========================================================================
    // Compaction Support
    // =========================================================================

    /// Run one snapshot + log rotation cycle now
    pub fn compact(&self) -> Result<CompactionReport> {
        let _cycle = self.compaction.lock();
        let report = compactor::run_cycle(self)?;
        self.compactions.fetch_add(1, Ordering::Relaxed);
        Ok(report)
    }

    /// Deep copy of every list plus the log position it corresponds to
    ///
    /// The shared lock excludes in-flight mutations, and every mutation
    /// logs under the exclusive lock, so the copy reflects exactly the
    /// records before the returned position.
    pub fn snapshot_copy(&self) -> (ListsSnapshot, LogPosition) {
        let lists = self.lists.read();
        let position = self.log.lock().position();
        (lists.to_snapshot(), position)
    }

    /// Swap in a fresh log once a snapshot covering `cut` is durable
    ///
    /// Records appended after `cut` are carried into the new file, then the
    /// old file becomes `<log>.old` (replacing any earlier backup).
    /// Returns the number of carried records.
    pub(crate) fn rotate_log(&self, cut: LogPosition) -> Result<u64> {
        let mut log = self.log.lock();
        let started = Instant::now();

        let live_path = log.path().to_path_buf();
        let old_path = Self::sibling(&live_path, Self::OLD_LOG_SUFFIX);
        let next_path = Self::sibling(&live_path, Self::NEXT_LOG_SUFFIX);

        let prepared = Self::prepare_next_log(&log, cut, &next_path);
        let mut next = match prepared {
            Ok(next) => next,
            Err(e) => {
                let _ = io_util::remove_if_exists(&next_path);
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&live_path, &old_path) {
            let _ = io_util::remove_if_exists(&next_path);
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&next_path, &live_path) {
            // Put the live log back so appends keep landing where replay looks
            if let Err(undo) = fs::rename(&old_path, &live_path) {
                tracing::error!("Could not restore {}: {}", live_path.display(), undo);
            }
            return Err(e.into());
        }

        next.set_path(live_path);
        let carried = next.records_written();
        *log = next;
        drop(log);

        io_util::sync_dir(&self.config.data_dir)?;

        tracing::debug!(
            "Rotated log to generation {} ({} records carried) in {:?}",
            cut.generation + 1,
            carried,
            started.elapsed()
        );
        Ok(carried)
    }

    fn prepare_next_log(log: &LogWriter, cut: LogPosition, next_path: &Path) -> Result<LogWriter> {
        if log.generation() != cut.generation {
            return Err(ListError::Storage(format!(
                "log generation moved from {} to {} during compaction",
                cut.generation,
                log.generation()
            )));
        }

        let tail = log.read_since(cut.offset)?;
        let mut next = LogWriter::create(next_path, cut.generation + 1)?;
        next.append_raw(&tail)?;
        Ok(next)
    }

    /// Complete or discard a rotation interrupted by a crash
    fn repair_rotation(data_dir: &Path, log_path: &Path) -> Result<()> {
        let next_path = Self::sibling(log_path, Self::NEXT_LOG_SUFFIX);
        if !next_path.exists() {
            return Ok(());
        }

        if log_path.exists() {
            tracing::warn!("Discarding unfinished rotation file {}", next_path.display());
            fs::remove_file(&next_path)?;
        } else {
            tracing::warn!("Completing interrupted log rotation from {}", next_path.display());
            fs::rename(&next_path, log_path)?;
        }
        io_util::sync_dir(data_dir)?;
        Ok(())
    }

    fn sibling(path: &Path, suffix: &str) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(suffix);
        PathBuf::from(name)
    }

    /// Close the engine
    ///
    /// Every acknowledged record is already fsynced; this only releases
    /// the log handle.
    pub fn close(self) -> Result<()> {
        let log = self.log.into_inner();
        tracing::info!(
            "Closing log {} at generation {} ({} bytes)",
            log.path().display(),
            log.generation(),
            log.len()
        );
        drop(log);
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Snapshot file location
    pub fn snapshot_file(&self) -> &SnapshotFile {
        &self.snapshot
    }

    /// Path of the live log
    pub fn log_path(&self) -> PathBuf {
        self.config.data_dir.join(Self::LOG_FILENAME)
    }

    /// Path of the retained previous log generation
    pub fn old_log_path(&self) -> PathBuf {
        Self::sibling(&self.log_path(), Self::OLD_LOG_SUFFIX)
    }

    /// Current end of the live log
    pub fn log_position(&self) -> LogPosition {
        self.log.lock().position()
    }

    /// What replay found when this engine was opened
    pub fn recovery(&self) -> &RecoveryResult {
        &self.recovery
    }

    /// Number of lists
    pub fn list_count(&self) -> usize {
        self.lists.read().list_count()
    }

    /// Number of values across all lists
    pub fn value_count(&self) -> usize {
        self.lists.read().value_count()
    }

    /// Completed compaction cycles since open
    pub fn compaction_count(&self) -> u64 {
        self.compactions.load(Ordering::Relaxed)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
