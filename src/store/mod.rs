//! Storage backends that migrations are applied to.
//!
//! The runner only knows about the [`Store`] trait. Two adapters ship with
//! the crate:
//!
//! - [`MemoryStore`] records every application in memory. It backs dry runs
//!   and doubles as a spy in tests.
//! - [`JournalStore`] appends a JSON line per applied migration to a journal
//!   file and must be closed when its owner is done with it.

mod journal;
mod memory;

pub use journal::{JournalEntry, JournalStore};
pub use memory::{AppliedMigration, MemoryStore};

use async_trait::async_trait;
use thiserror::Error;

/// Error types for store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("migration {name} rejected: {reason}")]
    Rejected { name: String, reason: String },

    #[error("store is closed")]
    Closed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors raised by adapters living outside this crate.
    #[error(transparent)]
    Backend(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// A backend that can apply the content of one migration.
///
/// What "applying" means is up to the implementation. The name is passed
/// through unchanged so adapters can use it for bookkeeping.
#[async_trait]
pub trait Store: Send + Sync {
    async fn apply_migration(&self, name: &str, content: &str) -> Result<(), StoreError>;
}

