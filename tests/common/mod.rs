#![allow(dead_code)]

use async_trait::async_trait;
use migration_runner::store::{Store, StoreError};
use std::collections::BTreeSet;
use std::path::Path;
use tempfile::TempDir;
use tokio::fs;
use tokio::sync::Mutex;

/// Create a temporary directory for testing
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Write each `(name, content)` pair into `dir`
pub async fn write_migrations(dir: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        fs::write(dir.join(name), content)
            .await
            .expect("Failed to write migration");
    }
}

/// The two-step directory used throughout the runner tests
pub async fn init_two_step_dir(dir: &Path) {
    write_migrations(
        dir,
        &[
            ("01.x.up.sql", "create table if not exists x;"),
            ("01.x.down.sql", "drop table if exists x;"),
            ("02.y.up.sql", "create table if not exists y;"),
            ("02.y.down.sql", "drop table if exists y;"),
        ],
    )
    .await;
}

pub fn progress(out: Vec<u8>) -> String {
    String::from_utf8(out).expect("progress output should be UTF-8")
}

/// Toy store tracking which tables exist.
///
/// Understands exactly four statement shapes, one per `;`:
/// `create table [if not exists] NAME` and `drop table [if exists] NAME`.
/// The plain forms fail when the table already exists / is missing, which
/// is enough to tell defensive migrations apart from non-defensive ones.
#[derive(Debug, Default)]
pub struct TableStore {
    tables: Mutex<BTreeSet<String>>,
}

impl TableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn tables(&self) -> Vec<String> {
        self.tables.lock().await.iter().cloned().collect()
    }
}

#[async_trait]
impl Store for TableStore {
    async fn apply_migration(&self, name: &str, content: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        let reject = |reason: String| StoreError::Rejected {
            name: name.to_string(),
            reason,
        };

        for statement in content.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let words: Vec<&str> = statement.split_whitespace().collect();
            match words.as_slice() {
                ["create", "table", "if", "not", "exists", table] => {
                    tables.insert(table.to_string());
                }
                ["create", "table", table] => {
                    if !tables.insert(table.to_string()) {
                        return Err(reject(format!("table {} already exists", table)));
                    }
                }
                ["drop", "table", "if", "exists", table] => {
                    tables.remove(*table);
                }
                ["drop", "table", table] => {
                    if !tables.remove(*table) {
                        return Err(reject(format!("table {} does not exist", table)));
                    }
                }
                _ => return Err(reject(format!("unsupported statement: {}", statement))),
            }
        }
        Ok(())
    }
}
