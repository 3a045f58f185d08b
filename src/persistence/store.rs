//! File-backed snapshot store.
//!
//! Writes `users.jsonl` and `meetings.jsonl` under a data directory. Files
//! are replaced in place; there is no fsync or atomic rename.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::EncodedSnapshot;
use crate::domain::{MeetingRegistry, UserDirectory};
use crate::error::SnapshotError;

const USERS_FILE: &str = "users.jsonl";
const MEETINGS_FILE: &str = "meetings.jsonl";

/// Snapshot location on disk.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Creates a store rooted at `dir`. Nothing is touched until the first
    /// save or load.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Data directory holding the snapshot files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes both snapshot files, creating the data directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Io`] if the directory or a file cannot be
    /// written.
    pub async fn save(&self, snapshot: &EncodedSnapshot) -> Result<(), SnapshotError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(USERS_FILE), &snapshot.users).await?;
        tokio::fs::write(self.dir.join(MEETINGS_FILE), &snapshot.meetings).await?;
        tracing::debug!(
            dir = %self.dir.display(),
            users = snapshot.user_count,
            meetings = snapshot.meeting_count,
            "snapshot written"
        );
        Ok(())
    }

    /// Reads both snapshot files. Missing files count as empty.
    ///
    /// # Errors
    ///
    /// Returns any [`SnapshotError`] other than a missing file.
    pub async fn load(&self) -> Result<(UserDirectory, MeetingRegistry), SnapshotError> {
        let snapshot = EncodedSnapshot {
            users: read_or_empty(&self.dir.join(USERS_FILE)).await?,
            meetings: read_or_empty(&self.dir.join(MEETINGS_FILE)).await?,
            ..EncodedSnapshot::default()
        };
        snapshot.decode()
    }
}

async fn read_or_empty(path: &Path) -> Result<Vec<u8>, SnapshotError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(err) => Err(err.into()),
    }
}
