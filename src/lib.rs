pub mod config;
pub mod migration;
pub mod store;
pub mod teardown;
pub mod utils;

// Re-export commonly used types
pub use config::{read_config, ConfigError, MigrateConfig};
pub use migration::{
    run, run_down, run_up, MigrationBatch, MigrationCatalog, MigrationDirection, MigrationError,
    MigrationFile, MigrationLimit, MigrationRunner, RunFailure, SuffixConventions,
};
pub use store::{JournalStore, MemoryStore, Store, StoreError};
pub use teardown::{release_or_exit, release_with_backoff, BackoffPolicy, TeardownError};
