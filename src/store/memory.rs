use super::{Store, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// One migration recorded by a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    pub name: String,
    pub content: String,
}

/// In-memory store that records what it was asked to apply.
#[derive(Debug, Default)]
pub struct MemoryStore {
    applied: Mutex<Vec<AppliedMigration>>,
    rejections: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the store reject `name` with the given reason.
    pub fn reject(mut self, name: impl Into<String>, reason: impl Into<String>) -> Self {
        self.rejections.insert(name.into(), reason.into());
        self
    }

    /// Everything applied so far, in call order.
    pub async fn applied(&self) -> Vec<AppliedMigration> {
        self.applied.lock().await.clone()
    }

    pub async fn applied_names(&self) -> Vec<String> {
        self.applied
            .lock()
            .await
            .iter()
            .map(|m| m.name.clone())
            .collect()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn apply_migration(&self, name: &str, content: &str) -> Result<(), StoreError> {
        if let Some(reason) = self.rejections.get(name) {
            return Err(StoreError::Rejected {
                name: name.to_string(),
                reason: reason.clone(),
            });
        }

        self.applied.lock().await.push(AppliedMigration {
            name: name.to_string(),
            content: content.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_in_order() {
        let store = MemoryStore::new();
        store.apply_migration("01.up.sql", "create table a;").await.unwrap();
        store.apply_migration("02.up.sql", "create table b;").await.unwrap();

        let applied = store.applied().await;
        assert_eq!(applied.len(), 2);
        assert_eq!(applied[0].name, "01.up.sql");
        assert_eq!(applied[1].content, "create table b;");
    }

    #[tokio::test]
    async fn test_rejected_name_is_not_recorded() {
        let store = MemoryStore::new().reject("02.up.sql", "syntax error");
        let err = store
            .apply_migration("02.up.sql", "crate table b;")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "migration 02.up.sql rejected: syntax error");
        assert!(store.applied_names().await.is_empty());
    }
}
