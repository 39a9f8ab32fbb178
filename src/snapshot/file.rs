//! Snapshot file reading and atomic replacement

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ListError, Result};
use crate::io_util;
use crate::store::{self, ListsSnapshot};
use crate::wal::LogPosition;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Contents of a snapshot file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotData {
    pub version: u32,
    pub log_generation: u64,
    pub log_offset: u64,
    pub lists: ListsSnapshot,
}

impl SnapshotData {
    pub fn new(lists: ListsSnapshot, position: LogPosition) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            log_generation: position.generation,
            log_offset: position.offset,
            lists,
        }
    }

    /// Log position replay should resume from
    pub fn position(&self) -> LogPosition {
        LogPosition::new(self.log_generation, self.log_offset)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OnDisk {
    Current(SnapshotData),
    Legacy(ListsSnapshot),
}

/// Location of the canonical snapshot and its temp file
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
    tmp_path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");

        Self {
            path,
            tmp_path: PathBuf::from(tmp),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tmp_path(&self) -> &Path {
        &self.tmp_path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the snapshot
    ///
    /// `Ok(None)` when no snapshot exists. A file that exists but does not
    /// decode is a `Decode` error; callers must not start with unknown state.
    /// So is a list id that could not be written to the log.
    pub fn load(&self) -> Result<Option<SnapshotData>> {
        let contents = match fs::read(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let on_disk: OnDisk = serde_json::from_slice(&contents).map_err(|e| {
            ListError::Decode(format!("{}: {}", self.path.display(), e))
        })?;

        let data = match on_disk {
            OnDisk::Current(data) => data,
            OnDisk::Legacy(lists) => {
                tracing::info!("Loaded legacy snapshot format from {}", self.path.display());
                SnapshotData::new(lists, LogPosition::default())
            }
        };

        if data.version != SNAPSHOT_VERSION {
            return Err(ListError::Decode(format!(
                "{}: unsupported snapshot version {}",
                self.path.display(),
                data.version
            )));
        }

        if let Some(id) = data
            .lists
            .keys()
            .find(|id| store::validate_list_id(id).is_err())
        {
            return Err(ListError::Decode(format!(
                "{}: list id {:?} contains a line break",
                self.path.display(),
                id
            )));
        }

        Ok(Some(data))
    }

    /// Write and commit a snapshot in one step
    pub fn write(&self, data: &SnapshotData) -> Result<u64> {
        let bytes = self.write_temp(data)?;
        self.commit()?;
        Ok(bytes)
    }

    /// Serialize `data` into the temp file and fsync it
    ///
    /// Returns the number of bytes written. The canonical file is untouched.
    pub fn write_temp(&self, data: &SnapshotData) -> Result<u64> {
        let outcome = self.write_temp_inner(data);
        if outcome.is_err() {
            let _ = io_util::remove_if_exists(&self.tmp_path);
        }
        outcome
    }

    fn write_temp_inner(&self, data: &SnapshotData) -> Result<u64> {
        let file = File::create(&self.tmp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, data)
            .map_err(|e| ListError::Serialization(e.to_string()))?;
        writer.write_all(b"\n")?;

        let file = writer
            .into_inner()
            .map_err(|e| ListError::Io(e.into_error()))?;
        file.sync_all()?;

        Ok(file.metadata()?.len())
    }

    /// Atomically move the temp file over the canonical snapshot
    pub fn commit(&self) -> Result<()> {
        fs::rename(&self.tmp_path, &self.path)?;
        io_util::sync_dir(io_util::parent_dir(&self.path))?;
        Ok(())
    }
}
