//! Bulk operation handler: pipelined and sequential batch execution.
//!
//! Every `*_pipelined` method submits all of its commands to the store in a
//! single outbound batch and correlates the replies back to the input keys
//! positionally. `write_sequential` issues one round trip per entry and
//! exists strictly for timing comparison; it produces the same final store
//! state as `write_pipelined`.
//!
//! Failure semantics: store errors propagate unchanged, with no retry and no
//! partial-result recovery. If a batch fails, nothing from it is reported.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pipekv_storage::{BatchCommand, KvStore, Reply, StorageError};
use tracing::info;

/// Maximum number of commands accepted in one batch.
pub const MAX_BATCH_KEYS: usize = 10_000;

/// Errors from bulk operations.
#[derive(Debug, thiserror::Error)]
pub enum BulkError {
    /// The batch request is empty.
    #[error("batch request cannot be empty")]
    EmptyBatch,

    /// The batch request exceeds the maximum allowed size.
    #[error("batch size {size} exceeds maximum allowed {max}")]
    BatchTooLarge { size: usize, max: usize },

    /// A key in the batch is invalid.
    #[error("invalid key at index {index}: {message}")]
    InvalidKey { index: usize, message: String },

    /// A store operation failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for bulk operations.
pub type BulkResult<T> = Result<T, BulkError>;

/// Summary of a mixed-command pipeline run.
#[derive(Debug, Clone)]
pub struct MixedReport {
    /// Total commands submitted in the batch.
    pub commands: usize,
    /// Wall-clock time for the batch round trip.
    pub elapsed: Duration,
}

/// Handler for bulk key-value operations.
///
/// Stateless per call: holds only the shared store handle.
pub struct BulkHandler<S: KvStore> {
    store: Arc<S>,
}

impl<S: KvStore> Clone for BulkHandler<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

fn validate_keys(keys: &[String]) -> BulkResult<()> {
    if keys.is_empty() {
        return Err(BulkError::EmptyBatch);
    }
    if keys.len() > MAX_BATCH_KEYS {
        return Err(BulkError::BatchTooLarge {
            size: keys.len(),
            max: MAX_BATCH_KEYS,
        });
    }
    for (index, key) in keys.iter().enumerate() {
        if key.is_empty() {
            return Err(BulkError::InvalidKey {
                index,
                message: "key cannot be empty".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_entries(entries: &HashMap<String, String>) -> BulkResult<()> {
    if entries.is_empty() {
        return Err(BulkError::EmptyBatch);
    }
    if entries.len() > MAX_BATCH_KEYS {
        return Err(BulkError::BatchTooLarge {
            size: entries.len(),
            max: MAX_BATCH_KEYS,
        });
    }
    if entries.keys().any(|key| key.is_empty()) {
        return Err(BulkError::InvalidKey {
            index: 0,
            message: "key cannot be empty".to_string(),
        });
    }
    Ok(())
}

impl<S: KvStore> BulkHandler<S> {
    /// Creates a new bulk handler over the shared store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Saves all entries with one SET per entry in a single pipeline.
    ///
    /// Returns the number of entries submitted. SET acknowledgments are
    /// uniform, so the per-command replies are discarded.
    pub async fn write_pipelined(&self, entries: &HashMap<String, String>) -> BulkResult<usize> {
        validate_entries(entries)?;

        let commands: Vec<BatchCommand> = entries
            .iter()
            .map(|(key, value)| BatchCommand::Set {
                key: key.clone(),
                value: value.clone(),
            })
            .collect();

        let start = Instant::now();
        self.store.run_batch(&commands).await?;
        info!(
            keys = entries.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "pipelined save complete"
        );

        Ok(entries.len())
    }

    /// Saves all entries one round trip at a time, for timing comparison.
    ///
    /// Semantically identical to [`write_pipelined`](Self::write_pipelined):
    /// the final store state is the same for the same input map.
    pub async fn write_sequential(&self, entries: &HashMap<String, String>) -> BulkResult<usize> {
        validate_entries(entries)?;

        let start = Instant::now();
        for (key, value) in entries {
            self.store.set(key, value).await?;
        }
        info!(
            keys = entries.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "sequential save complete"
        );

        Ok(entries.len())
    }

    /// Reads all keys with one GET per key in a single pipeline.
    ///
    /// `reply[i]` is paired with `keys[i]`; keys that do not exist are
    /// omitted from the result map rather than mapped to an empty value.
    pub async fn read_pipelined(&self, keys: &[String]) -> BulkResult<HashMap<String, String>> {
        validate_keys(keys)?;

        let commands: Vec<BatchCommand> = keys
            .iter()
            .map(|key| BatchCommand::Get { key: key.clone() })
            .collect();

        let start = Instant::now();
        let replies = self.store.run_batch(&commands).await?;

        let mut values = HashMap::new();
        for (key, reply) in keys.iter().zip(replies) {
            if let Some(text) = reply.into_text() {
                values.insert(key.clone(), text);
            }
        }

        info!(
            keys = keys.len(),
            found = values.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "pipelined read complete"
        );

        Ok(values)
    }

    /// Increments all counters with one INCR per key in a single pipeline.
    ///
    /// The returned values are positional: `result[i]` is the new value of
    /// `keys[i]`, or `None` when the store reported no value for that
    /// increment. Failed slots are kept in place so the output never
    /// desynchronizes from the input key order.
    pub async fn increment_pipelined(&self, keys: &[String]) -> BulkResult<Vec<Option<i64>>> {
        validate_keys(keys)?;

        let commands: Vec<BatchCommand> = keys
            .iter()
            .map(|key| BatchCommand::Incr { key: key.clone() })
            .collect();

        let replies = self.store.run_batch(&commands).await?;
        info!(counters = keys.len(), "counters incremented");

        Ok(replies.iter().map(Reply::as_int).collect())
    }

    /// Deletes all keys with one DEL per key in a single pipeline.
    ///
    /// Returns the number of keys actually deleted; no-op deletions of
    /// missing keys are filtered out of the count.
    pub async fn delete_pipelined(&self, keys: &[String]) -> BulkResult<u64> {
        validate_keys(keys)?;

        let commands: Vec<BatchCommand> = keys
            .iter()
            .map(|key| BatchCommand::Del { key: key.clone() })
            .collect();

        let replies = self.store.run_batch(&commands).await?;
        let deleted = replies.iter().filter(|reply| reply.is_positive()).count() as u64;

        info!(keys = keys.len(), deleted, "pipelined delete complete");
        Ok(deleted)
    }

    /// Checks existence of all keys with one EXISTS per key in a single
    /// pipeline.
    ///
    /// A boolean true or a positive integer reply means the key exists;
    /// anything else means it does not. The result map is zipped positionally
    /// with the input key order.
    pub async fn exists_pipelined(&self, keys: &[String]) -> BulkResult<HashMap<String, bool>> {
        validate_keys(keys)?;

        let commands: Vec<BatchCommand> = keys
            .iter()
            .map(|key| BatchCommand::Exists { key: key.clone() })
            .collect();

        let replies = self.store.run_batch(&commands).await?;

        Ok(keys
            .iter()
            .zip(replies)
            .map(|(key, reply)| (key.clone(), reply.is_positive()))
            .collect())
    }

    /// Runs SET, GET, and DEL commands together in one pipeline.
    ///
    /// Demonstrates combining different command shapes in a single batch.
    pub async fn mixed_pipelined(
        &self,
        sets: &HashMap<String, String>,
        gets: &[String],
        dels: &[String],
    ) -> BulkResult<MixedReport> {
        let total = sets.len() + gets.len() + dels.len();
        if total == 0 {
            return Err(BulkError::EmptyBatch);
        }
        if total > MAX_BATCH_KEYS {
            return Err(BulkError::BatchTooLarge {
                size: total,
                max: MAX_BATCH_KEYS,
            });
        }

        let mut commands = Vec::with_capacity(total);
        commands.extend(sets.iter().map(|(key, value)| BatchCommand::Set {
            key: key.clone(),
            value: value.clone(),
        }));
        commands.extend(gets.iter().map(|key| BatchCommand::Get { key: key.clone() }));
        commands.extend(dels.iter().map(|key| BatchCommand::Del { key: key.clone() }));

        let start = Instant::now();
        self.store.run_batch(&commands).await?;
        let elapsed = start.elapsed();

        info!(
            sets = sets.len(),
            gets = gets.len(),
            dels = dels.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "mixed pipeline complete"
        );

        Ok(MixedReport {
            commands: total,
            elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pipekv_storage::{MemoryKvStore, StorageResult};

    fn handler() -> (Arc<MemoryKvStore>, BulkHandler<MemoryKvStore>) {
        let store = MemoryKvStore::new_shared();
        let handler = BulkHandler::new(Arc::clone(&store));
        (store, handler)
    }

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn entries(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn pipelined_write_then_read_round_trips() {
        let (_, handler) = handler();
        let data = entries(&[("user:1", "alice"), ("user:2", "bob")]);

        assert_eq!(handler.write_pipelined(&data).await.unwrap(), 2);

        let read = handler
            .read_pipelined(&keys(&["user:1", "user:2", "user:3"]))
            .await
            .unwrap();
        assert_eq!(read.len(), 2);
        assert_eq!(read["user:1"], "alice");
        assert_eq!(read["user:2"], "bob");
        assert!(!read.contains_key("user:3"));
    }

    #[tokio::test]
    async fn pipelined_and_sequential_writes_produce_identical_state() {
        let (store_a, handler_a) = handler();
        let (store_b, handler_b) = handler();
        let data = entries(&[("k:1", "v1"), ("k:2", "v2"), ("k:3", "v3")]);

        handler_a.write_pipelined(&data).await.unwrap();
        handler_b.write_sequential(&data).await.unwrap();

        for key in data.keys() {
            let a = store_a.get(key).await.unwrap();
            let b = store_b.get(key).await.unwrap();
            assert_eq!(a, b);
            assert_eq!(a, Some(data[key].clone()));
        }
    }

    #[tokio::test]
    async fn increments_count_up_from_one() {
        let (_, handler) = handler();
        let counters = keys(&["page:home", "page:about"]);

        let first = handler.increment_pipelined(&counters).await.unwrap();
        assert_eq!(first, vec![Some(1), Some(1)]);

        let second = handler.increment_pipelined(&counters).await.unwrap();
        assert_eq!(second, vec![Some(2), Some(2)]);
    }

    /// Store that answers `Nil` to every command, exercising the failed
    /// increment path a live store only produces under error conditions.
    struct NilStore;

    #[async_trait]
    impl KvStore for NilStore {
        async fn set(&self, _: &str, _: &str) -> StorageResult<()> {
            Ok(())
        }
        async fn get(&self, _: &str) -> StorageResult<Option<String>> {
            Ok(None)
        }
        async fn incr(&self, _: &str) -> StorageResult<i64> {
            Ok(0)
        }
        async fn del(&self, _: &str) -> StorageResult<bool> {
            Ok(false)
        }
        async fn exists(&self, _: &str) -> StorageResult<bool> {
            Ok(false)
        }
        async fn ping(&self) -> StorageResult<()> {
            Ok(())
        }
        async fn run_batch(&self, commands: &[BatchCommand]) -> StorageResult<Vec<Reply>> {
            Ok(vec![Reply::Nil; commands.len()])
        }
    }

    #[tokio::test]
    async fn failed_increments_keep_their_position() {
        let handler = BulkHandler::new(Arc::new(NilStore));
        let result = handler
            .increment_pipelined(&keys(&["a", "b", "c"]))
            .await
            .unwrap();
        // None placeholders keep result[i] aligned with keys[i].
        assert_eq!(result, vec![None, None, None]);
    }

    #[tokio::test]
    async fn delete_counts_only_existing_keys() {
        let (_, handler) = handler();
        handler
            .write_pipelined(&entries(&[("a", "1"), ("b", "2")]))
            .await
            .unwrap();

        let deleted = handler
            .delete_pipelined(&keys(&["a", "b", "ghost"]))
            .await
            .unwrap();
        assert_eq!(deleted, 2);
    }

    #[tokio::test]
    async fn exists_maps_each_key_positionally() {
        let (_, handler) = handler();
        handler
            .write_pipelined(&entries(&[("user:1", "alice")]))
            .await
            .unwrap();

        let result = handler
            .exists_pipelined(&keys(&["user:1", "user:999"]))
            .await
            .unwrap();
        assert_eq!(result["user:1"], true);
        assert_eq!(result["user:999"], false);
    }

    #[tokio::test]
    async fn mixed_pipeline_applies_all_command_kinds() {
        let (store, handler) = handler();
        store.set("old", "x").await.unwrap();

        let report = handler
            .mixed_pipelined(
                &entries(&[("new", "y")]),
                &keys(&["old"]),
                &keys(&["old"]),
            )
            .await
            .unwrap();

        assert_eq!(report.commands, 3);
        assert_eq!(store.get("new").await.unwrap().as_deref(), Some("y"));
        assert_eq!(store.get("old").await.unwrap(), None);
    }

    #[tokio::test]
    async fn empty_batches_are_rejected_before_the_store() {
        let (_, handler) = handler();

        assert!(matches!(
            handler.write_pipelined(&HashMap::new()).await,
            Err(BulkError::EmptyBatch)
        ));
        assert!(matches!(
            handler.read_pipelined(&[]).await,
            Err(BulkError::EmptyBatch)
        ));
        assert!(matches!(
            handler.delete_pipelined(&[]).await,
            Err(BulkError::EmptyBatch)
        ));
        assert!(matches!(
            handler.mixed_pipelined(&HashMap::new(), &[], &[]).await,
            Err(BulkError::EmptyBatch)
        ));
    }

    #[tokio::test]
    async fn empty_keys_are_rejected() {
        let (_, handler) = handler();
        let err = handler
            .read_pipelined(&keys(&["ok", ""]))
            .await
            .unwrap_err();
        assert!(matches!(err, BulkError::InvalidKey { index: 1, .. }));
    }

    #[tokio::test]
    async fn oversized_batches_are_rejected() {
        let (_, handler) = handler();
        let too_many: Vec<String> = (0..=MAX_BATCH_KEYS).map(|i| format!("k:{i}")).collect();
        let err = handler.read_pipelined(&too_many).await.unwrap_err();
        assert!(matches!(err, BulkError::BatchTooLarge { .. }));
    }
}
