use super::{Store, StoreError};
use crate::utils::{content_checksum, now_iso};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

/// A single line of the journal file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub name: String,
    pub checksum: String,
    pub applied_at: String,
}

/// Store that appends every applied migration to a JSON-lines journal.
///
/// The file is held open until [`JournalStore::close`] is called. Once
/// closed, further applications fail with [`StoreError::Closed`].
#[derive(Debug)]
pub struct JournalStore {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl JournalStore {
    /// Open (or create) the journal at `path` in append mode.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        debug!(journal = %path.display(), "Opened migration journal");

        Ok(Self {
            path,
            file: Mutex::new(Some(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush and release the journal file. Closing twice is a no-op.
    pub async fn close(&self) -> Result<(), StoreError> {
        let mut guard = self.file.lock().await;
        if let Some(file) = guard.as_mut() {
            file.flush().await?;
            file.sync_all().await?;
        }
        *guard = None;
        Ok(())
    }

    pub async fn is_closed(&self) -> bool {
        self.file.lock().await.is_none()
    }

    /// Read every entry recorded in the journal at `path`.
    pub async fn read_entries(path: &Path) -> Result<Vec<JournalEntry>, StoreError> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(path).await?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(StoreError::from))
            .collect()
    }
}

#[async_trait]
impl Store for JournalStore {
    async fn apply_migration(&self, name: &str, content: &str) -> Result<(), StoreError> {
        let entry = JournalEntry {
            name: name.to_string(),
            checksum: content_checksum(content),
            applied_at: now_iso(),
        };
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        let mut guard = self.file.lock().await;
        let file = guard.as_mut().ok_or(StoreError::Closed)?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
