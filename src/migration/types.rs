//! Types for the migration system.

use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Error types for migration operations.
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("migration directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("no {direction} migrations found in {}", directory.display())]
    EmptyMigrationSet {
        directory: PathBuf,
        direction: MigrationDirection,
    },

    #[error("failed to read migration {name}: {source}")]
    FileRead {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The store's own error, passed through untouched.
    #[error(transparent)]
    Apply(#[from] StoreError),

    #[error("invalid migration limit {0}: expected -1 or a non-negative count")]
    InvalidLimit(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Direction of migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationDirection {
    /// Moving the schema forward.
    Up,
    /// Reversing a prior change.
    Down,
}

impl MigrationDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for MigrationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MigrationDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(format!("unknown migration direction '{}'", other)),
        }
    }
}

/// How many catalog entries a run may attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MigrationLimit {
    /// Every discovered candidate.
    #[default]
    All,
    /// At most the first `n` candidates in catalog order.
    AtMost(usize),
}

impl MigrationLimit {
    /// Whether `attempted` entries already exhaust this limit.
    pub fn reached(&self, attempted: usize) -> bool {
        match self {
            Self::All => false,
            Self::AtMost(n) => attempted >= *n,
        }
    }
}

impl TryFrom<i64> for MigrationLimit {
    type Error = MigrationError;

    /// `-1` means all, any other non-negative value is a cap.
    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::All),
            n if n >= 0 => usize::try_from(n)
                .map(Self::AtMost)
                .map_err(|_| MigrationError::InvalidLimit(value)),
            _ => Err(MigrationError::InvalidLimit(value)),
        }
    }
}

impl From<MigrationLimit> for i64 {
    fn from(limit: MigrationLimit) -> Self {
        match limit {
            MigrationLimit::All => -1,
            MigrationLimit::AtMost(n) => i64::try_from(n).unwrap_or(i64::MAX),
        }
    }
}

impl Serialize for MigrationLimit {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(i64::from(*self))
    }
}

impl<'de> Deserialize<'de> for MigrationLimit {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        MigrationLimit::try_from(raw).map_err(serde::de::Error::custom)
    }
}

/// A migration file discovered on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    /// Base name of the file, used for ordering and reporting.
    pub name: String,
    /// Full path used to read the content.
    pub path: PathBuf,
}

/// The migrations a run actually applied, in application order.
///
/// Always a prefix of the catalog the run was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationBatch {
    direction: MigrationDirection,
    total: usize,
    applied: Vec<String>,
}

impl MigrationBatch {
    pub(crate) fn new(direction: MigrationDirection, total: usize) -> Self {
        Self {
            direction,
            total,
            applied: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, name: String) {
        self.applied.push(name);
    }

    pub fn direction(&self) -> MigrationDirection {
        self.direction
    }

    /// Number of candidates discovered, regardless of how many were applied.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn names(&self) -> &[String] {
        &self.applied
    }

    pub fn into_names(self) -> Vec<String> {
        self.applied
    }

    pub fn len(&self) -> usize {
        self.applied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }
}

/// A run that stopped early, with whatever it managed to apply first.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct RunFailure {
    /// Migrations applied before the failure. Empty when the catalog itself failed.
    pub batch: Option<MigrationBatch>,
    #[source]
    pub error: MigrationError,
}

impl RunFailure {
    pub(crate) fn before_start(error: MigrationError) -> Self {
        Self { batch: None, error }
    }

    pub(crate) fn partial(batch: MigrationBatch, error: MigrationError) -> Self {
        Self {
            batch: Some(batch),
            error,
        }
    }

    /// Names applied before the failure.
    pub fn applied(&self) -> &[String] {
        self.batch.as_ref().map(|b| b.names()).unwrap_or(&[])
    }

    pub fn into_parts(self) -> (Option<MigrationBatch>, MigrationError) {
        (self.batch, self.error)
    }
}
