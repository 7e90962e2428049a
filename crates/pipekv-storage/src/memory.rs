//! In-memory KvStore implementation for testing.
//!
//! Uses DashMap for thread-safe concurrent access without explicit locks.
//! `run_batch` applies commands in submission order against the same map the
//! single-command operations use, so pipelined and sequential paths always
//! observe identical state.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::{StorageError, StorageResult};
use crate::traits::{BatchCommand, KvStore, Reply};

/// In-memory implementation of KvStore.
///
/// All operations are O(1) average. Counters are stored as their decimal
/// string form, matching how Redis stores INCR targets.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: DashMap<String, String>,
}

impl MemoryKvStore {
    /// Creates a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory store wrapped in Arc.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn incr_entry(&self, key: &str) -> StorageResult<i64> {
        let mut entry = self.entries.entry(key.to_string()).or_insert_with(|| "0".to_string());
        let current: i64 = entry
            .value()
            .parse()
            .map_err(|_| StorageError::NotAnInteger {
                key: key.to_string(),
            })?;
        let next = current + 1;
        *entry.value_mut() = next.to_string();
        Ok(next)
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).map(|e| e.value().clone()))
    }

    async fn incr(&self, key: &str) -> StorageResult<i64> {
        self.incr_entry(key)
    }

    async fn del(&self, key: &str) -> StorageResult<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.entries.contains_key(key))
    }

    async fn ping(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn run_batch(&self, commands: &[BatchCommand]) -> StorageResult<Vec<Reply>> {
        let mut replies = Vec::with_capacity(commands.len());
        for command in commands {
            let reply = match command {
                BatchCommand::Set { key, value } => {
                    self.entries.insert(key.clone(), value.clone());
                    Reply::Ok
                }
                BatchCommand::Get { key } => match self.entries.get(key) {
                    Some(entry) => Reply::Text(entry.value().clone()),
                    None => Reply::Nil,
                },
                BatchCommand::Incr { key } => Reply::Int(self.incr_entry(key)?),
                BatchCommand::Del { key } => {
                    Reply::Int(if self.entries.remove(key).is_some() { 1 } else { 0 })
                }
                BatchCommand::Exists { key } => Reply::Bool(self.entries.contains_key(key)),
            };
            replies.push(reply);
        }
        Ok(replies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let store = MemoryKvStore::new();
        store.set("user:1", "alice").await.unwrap();
        assert_eq!(store.get("user:1").await.unwrap().as_deref(), Some("alice"));
        assert_eq!(store.get("user:2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn incr_starts_at_one_and_counts_up() {
        let store = MemoryKvStore::new();
        assert_eq!(store.incr("hits").await.unwrap(), 1);
        assert_eq!(store.incr("hits").await.unwrap(), 2);
        assert_eq!(store.incr("hits").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn incr_rejects_non_integer_values() {
        let store = MemoryKvStore::new();
        store.set("name", "alice").await.unwrap();
        let err = store.incr("name").await.unwrap_err();
        assert!(matches!(err, StorageError::NotAnInteger { .. }));
    }

    #[tokio::test]
    async fn del_reports_whether_key_existed() {
        let store = MemoryKvStore::new();
        store.set("a", "1").await.unwrap();
        assert!(store.del("a").await.unwrap());
        assert!(!store.del("a").await.unwrap());
    }

    #[tokio::test]
    async fn batch_replies_preserve_submission_order() {
        let store = MemoryKvStore::new();
        let commands = vec![
            BatchCommand::Set {
                key: "a".to_string(),
                value: "1".to_string(),
            },
            BatchCommand::Get {
                key: "a".to_string(),
            },
            BatchCommand::Get {
                key: "missing".to_string(),
            },
            BatchCommand::Incr {
                key: "c".to_string(),
            },
            BatchCommand::Exists {
                key: "a".to_string(),
            },
            BatchCommand::Del {
                key: "a".to_string(),
            },
        ];

        let replies = store.run_batch(&commands).await.unwrap();
        assert_eq!(
            replies,
            vec![
                Reply::Ok,
                Reply::Text("1".to_string()),
                Reply::Nil,
                Reply::Int(1),
                Reply::Bool(true),
                Reply::Int(1),
            ]
        );
    }
}
