use crate::migration::{MigrationLimit, MigrationRunner, SuffixConventions};
use crate::teardown::BackoffPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "migrate.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

fn default_directory() -> PathBuf {
    PathBuf::from("migrations")
}

/// Migration runner configuration
///
/// Every key is optional in the file; missing keys take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrateConfig {
    /// Directory holding the migration files. Default is `migrations`.
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    /// Suffixes marking up and down files. Default is `up.sql` / `down.sql`.
    #[serde(default)]
    pub suffixes: SuffixConventions,
    /// How many migrations to apply; -1 applies all of them.
    #[serde(default)]
    pub limit: MigrationLimit,
    /// Journal file for the journal store. Unset means dry run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal: Option<PathBuf>,
    /// Timings used when closing the store.
    #[serde(default)]
    pub teardown: BackoffPolicy,
}

impl MigrateConfig {
    /// Build a runner using this config's suffix conventions
    pub fn runner(&self) -> MigrationRunner {
        MigrationRunner::new(self.suffixes.clone())
    }
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            suffixes: SuffixConventions::default(),
            limit: MigrationLimit::All,
            journal: None,
            teardown: BackoffPolicy::default(),
        }
    }
}

/// Read the configuration file, `None` if it does not exist
pub async fn read_config(config_path: &Path) -> Result<Option<MigrateConfig>, ConfigError> {
    if !config_path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(config_path).await?;
    let config: MigrateConfig = serde_json::from_str(&content)?;
    Ok(Some(config))
}
