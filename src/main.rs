use anyhow::Context;
use clap::{Parser, Subcommand};
use migration_runner::config::{read_config, MigrateConfig, CONFIG_FILE};
use migration_runner::store::{JournalStore, MemoryStore, Store};
use migration_runner::teardown::release_or_exit;
use migration_runner::utils::file_checksum;
use migration_runner::{MigrationBatch, MigrationDirection, MigrationLimit, RunFailure};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Apply a directory of versioned SQL migrations
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the JSON config file
    #[arg(short, long, env = "MIGRATE_CONFIG", default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Directory holding the migration files (overrides the config file)
    #[arg(short, long, env = "MIGRATE_DIR")]
    dir: Option<PathBuf>,

    /// Journal file recording applied migrations (overrides the config file)
    #[arg(long, env = "MIGRATE_JOURNAL")]
    journal: Option<PathBuf>,

    /// Apply against an in-memory store instead of the journal
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply up migrations in ascending order
    Up {
        /// Maximum number of migrations to apply, -1 for all
        #[arg(short, long, allow_negative_numbers = true)]
        limit: Option<i64>,
    },
    /// Apply down migrations in descending order
    Down {
        /// Maximum number of migrations to apply, -1 for all
        #[arg(short, long, allow_negative_numbers = true)]
        limit: Option<i64>,
    },
    /// Print the ordered migrations for a direction without applying them
    List {
        /// `up` or `down`
        direction: MigrationDirection,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout only carries progress lines
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mut config = read_config(&args.config)
        .await
        .with_context(|| format!("failed to read config {}", args.config.display()))?
        .unwrap_or_default();
    if let Some(dir) = args.dir {
        config.directory = dir;
    }
    if let Some(journal) = args.journal {
        config.journal = Some(journal);
    }

    let (direction, limit) = match args.command {
        Command::Up { limit } => (MigrationDirection::Up, limit),
        Command::Down { limit } => (MigrationDirection::Down, limit),
        Command::List { direction } => return list(&config, direction).await,
    };

    let limit = match limit {
        Some(raw) => MigrationLimit::try_from(raw)?,
        None => config.limit,
    };

    let result = match config.journal.clone().filter(|_| !args.dry_run) {
        Some(path) => {
            let store = JournalStore::open(&path)
                .await
                .with_context(|| format!("failed to open journal {}", path.display()))?;
            let result = apply(&config, &store, direction, limit).await;

            let journal = &store;
            release_or_exit(move || journal.close(), &config.teardown).await;
            result
        }
        None => {
            info!("No journal configured, applying against an in-memory store");
            apply(&config, &MemoryStore::new(), direction, limit).await
        }
    };

    match result {
        Ok(batch) => {
            info!(
                direction = %batch.direction(),
                applied = batch.len(),
                total = batch.total(),
                "Done"
            );
            Ok(())
        }
        Err(failure) => {
            warn!(applied = failure.applied().len(), "Migration run halted");
            Err(failure.into())
        }
    }
}

async fn apply<S: Store>(
    config: &MigrateConfig,
    store: &S,
    direction: MigrationDirection,
    limit: MigrationLimit,
) -> Result<MigrationBatch, RunFailure> {
    let mut out = tokio::io::stdout();
    config
        .runner()
        .run(&mut out, store, &config.directory, limit, direction)
        .await
}

async fn list(config: &MigrateConfig, direction: MigrationDirection) -> anyhow::Result<()> {
    let catalog = config.runner().catalog(&config.directory, direction).await?;

    let mut out = tokio::io::stdout();
    for (index, file) in catalog.files().iter().enumerate() {
        let checksum = file_checksum(&file.path).await?;
        let line = format!("{:>4}  {}  {}\n", index + 1, &checksum[..12], file.name);
        out.write_all(line.as_bytes()).await?;
    }
    out.flush().await?;
    Ok(())
}
