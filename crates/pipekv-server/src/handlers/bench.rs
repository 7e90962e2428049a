//! Benchmark harness: timed pipeline-vs-sequential comparison.
//!
//! `compare` runs two equally sized bulk writes, one pipelined and one
//! sequential, over disjoint synthetic key spaces and reports the elapsed
//! times and their ratio. The key spaces are disjoint so the sequential run
//! never benefits from overwriting keys the pipelined run just created.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pipekv_storage::KvStore;
use tracing::info;

use super::bulk::{BulkError, BulkHandler};

/// Key prefix for generated sample records.
const SAMPLE_KEY_PREFIX: &str = "test:user:";
/// Key prefixes reserved for the two comparison phases.
const PIPELINE_KEY_PREFIX: &str = "perf:test:";
const SEQUENTIAL_KEY_PREFIX: &str = "perf:test2:";

/// Errors from benchmark operations.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    /// The operation count must be at least 1.
    #[error("operation count must be positive, got {count}")]
    InvalidCount { count: usize },

    /// A bulk phase failed; the whole comparison is aborted.
    #[error(transparent)]
    Bulk(#[from] BulkError),
}

/// Result of one pipeline-vs-sequential comparison.
///
/// Constructed once per invocation and returned immediately; nothing here is
/// persisted.
#[derive(Debug, Clone)]
pub struct CompareReport {
    /// Number of write operations in each phase.
    pub operations: usize,
    /// Wall-clock time of the pipelined bulk write.
    pub pipeline_time: Duration,
    /// Wall-clock time of the sequential bulk write.
    pub normal_time: Duration,
    /// `normal_time / pipeline_time`, or `None` when the pipelined phase
    /// measured zero (coarse timer resolution at very low counts).
    pub speedup: Option<f64>,
}

/// Computes the speedup ratio, guarding the zero denominator explicitly
/// rather than relying on floating-point division producing infinity.
fn speedup(normal: Duration, pipeline: Duration) -> Option<f64> {
    if pipeline.is_zero() {
        None
    } else {
        Some(normal.as_secs_f64() / pipeline.as_secs_f64())
    }
}

/// Handler for the benchmark endpoints.
pub struct BenchHandler<S: KvStore> {
    bulk: BulkHandler<S>,
}

impl<S: KvStore> Clone for BenchHandler<S> {
    fn clone(&self) -> Self {
        Self {
            bulk: self.bulk.clone(),
        }
    }
}

fn synthetic_records(prefix: &str, value_word: &str, count: usize) -> HashMap<String, String> {
    (1..=count)
        .map(|i| (format!("{prefix}{i}"), format!("{value_word} {i}")))
        .collect()
}

impl<S: KvStore> BenchHandler<S> {
    /// Creates a new benchmark handler over the shared store.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            bulk: BulkHandler::new(store),
        }
    }

    /// Writes `count` sample records `test:user:{i}` -> `User {i}` through
    /// the pipelined bulk path. Returns the number of records generated.
    pub async fn generate(&self, count: usize) -> Result<usize, BenchError> {
        if count == 0 {
            return Err(BenchError::InvalidCount { count });
        }

        let records = synthetic_records(SAMPLE_KEY_PREFIX, "User", count);
        let generated = self.bulk.write_pipelined(&records).await?;
        info!(generated, "sample data generated");
        Ok(generated)
    }

    /// Runs the pipelined-vs-sequential comparison over `count` writes.
    ///
    /// A failure in either phase aborts the whole comparison; no partial
    /// report is produced.
    pub async fn compare(&self, count: usize) -> Result<CompareReport, BenchError> {
        if count == 0 {
            return Err(BenchError::InvalidCount { count });
        }

        let pipelined_records = synthetic_records(PIPELINE_KEY_PREFIX, "Value", count);
        let start = Instant::now();
        self.bulk.write_pipelined(&pipelined_records).await?;
        let pipeline_time = start.elapsed();

        // Fresh, disjoint key space for the sequential phase.
        let sequential_records = synthetic_records(SEQUENTIAL_KEY_PREFIX, "Value", count);
        let start = Instant::now();
        self.bulk.write_sequential(&sequential_records).await?;
        let normal_time = start.elapsed();

        let report = CompareReport {
            operations: count,
            pipeline_time,
            normal_time,
            speedup: speedup(normal_time, pipeline_time),
        };

        info!(
            operations = count,
            pipeline_ms = pipeline_time.as_millis() as u64,
            normal_ms = normal_time.as_millis() as u64,
            "comparison complete"
        );

        Ok(report)
    }
}
