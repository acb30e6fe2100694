//! Discovery and ordering of migration files in a directory.

use super::types::{MigrationDirection, MigrationError, MigrationFile};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::debug;

pub const DEFAULT_UP_SUFFIX: &str = "up.sql";
pub const DEFAULT_DOWN_SUFFIX: &str = "down.sql";

fn default_up_suffix() -> String {
    DEFAULT_UP_SUFFIX.to_string()
}

fn default_down_suffix() -> String {
    DEFAULT_DOWN_SUFFIX.to_string()
}

/// File name suffixes that mark a migration's direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuffixConventions {
    #[serde(default = "default_up_suffix")]
    pub up: String,
    #[serde(default = "default_down_suffix")]
    pub down: String,
}

impl SuffixConventions {
    pub fn for_direction(&self, direction: MigrationDirection) -> &str {
        match direction {
            MigrationDirection::Up => &self.up,
            MigrationDirection::Down => &self.down,
        }
    }
}

impl Default for SuffixConventions {
    fn default() -> Self {
        Self {
            up: default_up_suffix(),
            down: default_down_suffix(),
        }
    }
}

/// The ordered, direction-filtered candidates for one run.
#[derive(Debug, Clone)]
pub struct MigrationCatalog {
    direction: MigrationDirection,
    files: Vec<MigrationFile>,
}

impl MigrationCatalog {
    /// Scan `directory` for migrations of the given direction.
    ///
    /// Only direct children are considered: subdirectories are skipped,
    /// as are files without the direction's suffix. Up migrations come back
    /// in ascending name order, down migrations in descending order.
    pub async fn scan(
        directory: &Path,
        direction: MigrationDirection,
        suffixes: &SuffixConventions,
    ) -> Result<Self, MigrationError> {
        if !fs::try_exists(directory).await? {
            return Err(MigrationError::DirectoryNotFound(directory.to_path_buf()));
        }

        let suffix = suffixes.for_direction(direction);
        let mut files = Vec::new();
        let mut entries = fs::read_dir(directory).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if fs::metadata(&path).await.map_or(true, |m| m.is_dir()) {
                continue;
            }

            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                debug!(path = %path.display(), "Skipping non UTF-8 file name");
                continue;
            };

            if name.ends_with(suffix) {
                files.push(MigrationFile { name, path });
            }
        }

        if files.is_empty() {
            return Err(MigrationError::EmptyMigrationSet {
                directory: directory.to_path_buf(),
                direction,
            });
        }

        match direction {
            MigrationDirection::Up => files.sort_by(|a, b| a.name.cmp(&b.name)),
            MigrationDirection::Down => files.sort_by(|a, b| b.name.cmp(&a.name)),
        }

        debug!(
            directory = %directory.display(),
            direction = %direction,
            count = files.len(),
            "Scanned migration directory"
        );

        Ok(Self { direction, files })
    }

    pub fn direction(&self) -> MigrationDirection {
        self.direction
    }

    pub fn files(&self) -> &[MigrationFile] {
        &self.files
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
