//! Migration runner for applying catalog entries through a store.

use super::catalog::{MigrationCatalog, SuffixConventions};
use super::types::{
    MigrationBatch, MigrationDirection, MigrationError, MigrationLimit, RunFailure,
};
use crate::store::Store;
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{error, info, warn};

/// Runner for applying migrations from a directory.
///
/// The runner holds the suffix conventions and nothing else; the store and
/// the progress sink are only borrowed for the length of a single run.
#[derive(Debug, Clone, Default)]
pub struct MigrationRunner {
    suffixes: SuffixConventions,
}

impl MigrationRunner {
    /// Create a runner with the given suffix conventions.
    pub fn new(suffixes: SuffixConventions) -> Self {
        Self { suffixes }
    }

    pub fn suffixes(&self) -> &SuffixConventions {
        &self.suffixes
    }

    /// Build the catalog this runner would apply for `direction`.
    pub async fn catalog(
        &self,
        directory: &Path,
        direction: MigrationDirection,
    ) -> Result<MigrationCatalog, MigrationError> {
        MigrationCatalog::scan(directory, direction, &self.suffixes).await
    }

    /// Apply up to `limit` migrations from `directory` in `direction`.
    ///
    /// Each attempt writes one progress line to `out`:
    ///
    /// ```text
    /// applying 1/2: 01.users.up.sql ...SUCCESS
    /// applying 2/2: 02.posts.up.sql ...FAILURE: <error>
    /// ```
    ///
    /// The denominator is the number of candidates found, even when `limit`
    /// cuts the run short. The first failure stops the run; the returned
    /// [`RunFailure`] carries everything applied before it.
    pub async fn run<W, S>(
        &self,
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
        let catalog = self
            .catalog(directory, direction)
            .await
            .map_err(RunFailure::before_start)?;

        let total = catalog.len();
        let mut batch = MigrationBatch::new(direction, total);

        info!(
            directory = %directory.display(),
            direction = %direction,
            total,
            limit = i64::from(limit),
            "Starting migration run"
        );

        for (index, file) in catalog.files().iter().enumerate() {
            if limit.reached(index) {
                break;
            }

            let content = match fs::read_to_string(&file.path).await {
                Ok(content) => content,
                Err(source) => {
                    error!(migration = %file.name, error = %source, "Failed to read migration");
                    let err = MigrationError::FileRead {
                        name: file.name.clone(),
                        source,
                    };
                    return Err(RunFailure::partial(batch, err));
                }
            };

            let header = format!("applying {}/{}: {} ", index + 1, total, file.name);
            // The header must be visible before a slow store call starts
            if let Err(e) = write_line(out, &header).await {
                return Err(RunFailure::partial(batch, e.into()));
            }

            match store.apply_migration(&file.name, &content).await {
                Ok(()) => {
                    info!(migration = %file.name, "Applied migration");
                    batch.push(file.name.clone());
                    if let Err(e) = write_line(out, "...SUCCESS\n").await {
                        return Err(RunFailure::partial(batch, e.into()));
                    }
                }
                Err(store_err) => {
                    error!(migration = %file.name, error = %store_err, "Migration failed");
                    let line = format!("...FAILURE: {}\n", store_err);
                    if let Err(e) = write_line(out, &line).await {
                        warn!(migration = %file.name, error = %e, "Failed to report migration failure");
                    }
                    return Err(RunFailure::partial(batch, store_err.into()));
                }
            }
        }

        info!(
            direction = %direction,
            applied = batch.len(),
            total,
            "Migration run completed"
        );

        Ok(batch)
    }

    /// [`MigrationRunner::run`] with the direction fixed to up.
    pub async fn run_up<W, S>(
        &self,
        out: &mut W,
        store: &S,
        directory: &Path,
        limit: MigrationLimit,
    ) -> Result<MigrationBatch, RunFailure>
    where
        W: AsyncWrite + Unpin + ?Sized,
        S: Store + ?Sized,
    {
        self.run(out, store, directory, limit, MigrationDirection::Up)
            .await
    }

    /// [`MigrationRunner::run`] with the direction fixed to down.
    pub async fn run_down<W, S>(
        &self,
        out: &mut W,
        store: &S,
        directory: &Path,
        limit: MigrationLimit,
    ) -> Result<MigrationBatch, RunFailure>
    where
        W: AsyncWrite + Unpin + ?Sized,
        S: Store + ?Sized,
    {
        self.run(out, store, directory, limit, MigrationDirection::Down)
            .await
    }
}

async fn write_line<W>(out: &mut W, line: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    out.write_all(line.as_bytes()).await?;
    out.flush().await
}
