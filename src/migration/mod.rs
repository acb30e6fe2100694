//! Directory-based migration engine.
//!
//! # Overview
//!
//! - A migration directory holds flat files such as `01.users.up.sql` and
//!   `01.users.down.sql`; a sortable prefix orders them and the suffix names
//!   the direction
//! - The `MigrationCatalog` lists the files for one direction, ascending for
//!   up and descending for down
//! - The `MigrationRunner` applies catalog entries one at a time through a
//!   [`Store`](crate::store::Store) and stops at the first failure
//!
//! # Usage
//!
//! ```ignore
//! let store = MemoryStore::new();
//! let mut out = tokio::io::stdout();
//! let batch = run_up(&mut out, &store, Path::new("migrations"), MigrationLimit::All).await?;
//! ```

mod catalog;
mod runner;
mod types;

pub use catalog::{MigrationCatalog, SuffixConventions, DEFAULT_DOWN_SUFFIX, DEFAULT_UP_SUFFIX};
pub use runner::MigrationRunner;
pub use types::{
    MigrationBatch, MigrationDirection, MigrationError, MigrationFile, MigrationLimit, RunFailure,
};

use crate::store::Store;
use std::path::Path;
use tokio::io::AsyncWrite;

/// Run migrations with the default `up.sql` / `down.sql` conventions.
pub async fn run<W, S>(
    out: &mut W,
    store: &S,
    directory: &Path,
    limit: MigrationLimit,
    direction: MigrationDirection,
) -> Result<MigrationBatch, RunFailure>
where
    W: AsyncWrite + Unpin + ?Sized,
    S: Store + ?Sized,
{
    MigrationRunner::default()
        .run(out, store, directory, limit, direction)
        .await
}

/// Apply up migrations with the default conventions.
pub async fn run_up<W, S>(
    out: &mut W,
    store: &S,
    directory: &Path,
    limit: MigrationLimit,
) -> Result<MigrationBatch, RunFailure>
where
    W: AsyncWrite + Unpin + ?Sized,
    S: Store + ?Sized,
{
    run(out, store, directory, limit, MigrationDirection::Up).await
}

/// Apply down migrations with the default conventions.
pub async fn run_down<W, S>(
    out: &mut W,
    store: &S,
    directory: &Path,
    limit: MigrationLimit,
) -> Result<MigrationBatch, RunFailure>
where
    W: AsyncWrite + Unpin + ?Sized,
    S: Store + ?Sized,
{
    run(out, store, directory, limit, MigrationDirection::Down).await
}
