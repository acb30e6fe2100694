mod common;

use common::{create_test_dir, init_two_step_dir, progress};
use migration_runner::migration::{MigrationLimit, MigrationRunner};
use migration_runner::store::{JournalStore, StoreError};
use migration_runner::teardown::{release_with_backoff, BackoffPolicy};
use migration_runner::utils::content_checksum;
use std::time::Duration;

fn quick_policy() -> BackoffPolicy {
    BackoffPolicy::new(Duration::from_millis(1), Duration::from_secs(1))
}

#[tokio::test]
async fn test_migrate_up_then_close_journal() {
    let temp_dir = create_test_dir();
    let migrations = temp_dir.path().join("migrations");
    tokio::fs::create_dir(&migrations).await.unwrap();
    init_two_step_dir(&migrations).await;
    let journal_path = temp_dir.path().join("journal.jsonl");

    let store = JournalStore::open(&journal_path).await.expect("Should open journal");
    let mut out = Vec::new();
    let batch = MigrationRunner::default()
        .run_up(&mut out, &store, &migrations, MigrationLimit::All)
        .await
        .expect("Should apply");

    let journal = &store;
    release_with_backoff(move || journal.close(), &quick_policy())
        .await
        .expect("Should close journal");
    assert!(store.is_closed().await);

    let entries = JournalStore::read_entries(&journal_path).await.unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, batch.names());
    assert_eq!(
        entries[0].checksum,
        content_checksum("create table if not exists x;")
    );
    assert_eq!(progress(out).lines().count(), 2);
}

#[tokio::test]
async fn test_partial_run_journals_only_applied() {
    let temp_dir = create_test_dir();
    init_two_step_dir(temp_dir.path()).await;
    let journal_path = temp_dir.path().join("state").join("journal.jsonl");

    let store = JournalStore::open(&journal_path).await.unwrap();
    let mut out = Vec::new();
    MigrationRunner::default()
        .run_down(&mut out, &store, temp_dir.path(), MigrationLimit::AtMost(1))
        .await
        .expect("Should apply");
    store.close().await.unwrap();

    let entries = JournalStore::read_entries(&journal_path).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "02.y.down.sql");
}

#[tokio::test]
async fn test_run_against_closed_journal_halts_on_first() {
    let temp_dir = create_test_dir();
    init_two_step_dir(temp_dir.path()).await;
    let journal_path = temp_dir.path().join("journal.jsonl");

    let store = JournalStore::open(&journal_path).await.unwrap();
    store.close().await.unwrap();

    let mut out = Vec::new();
    let failure = MigrationRunner::default()
        .run_up(&mut out, &store, temp_dir.path(), MigrationLimit::All)
        .await
        .expect_err("Closed store should reject");

    assert!(failure.applied().is_empty());
    assert_eq!(
        progress(out),
        "applying 1/2: 01.x.up.sql ...FAILURE: store is closed\n"
    );
    assert!(matches!(
        failure.into_parts().1,
        migration_runner::MigrationError::Apply(StoreError::Closed)
    ));
}
