//! KvStore trait definition and batch command/reply types.

use async_trait::async_trait;

use crate::error::StorageResult;

/// A single command within a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchCommand {
    /// Set a key to a value.
    Set { key: String, value: String },
    /// Read the value of a key.
    Get { key: String },
    /// Increment the integer counter at a key, creating it at 0 first.
    Incr { key: String },
    /// Delete a key.
    Del { key: String },
    /// Check whether a key exists.
    Exists { key: String },
}

impl BatchCommand {
    /// The command name, for error reporting.
    pub fn name(&self) -> &'static str {
        match self {
            BatchCommand::Set { .. } => "SET",
            BatchCommand::Get { .. } => "GET",
            BatchCommand::Incr { .. } => "INCR",
            BatchCommand::Del { .. } => "DEL",
            BatchCommand::Exists { .. } => "EXISTS",
        }
    }
}

/// A decoded reply to a single batch command.
///
/// Backends decode raw wire replies into this representation in one uniform
/// step immediately after batch submission, so callers never see raw bytes.
/// Byte-sequence replies are decoded as UTF-8 text (lossily, matching what a
/// textual store client would hand back).
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Uniform acknowledgment (e.g. the `OK` status of a SET).
    Ok,
    /// Textual value.
    Text(String),
    /// Integer value (INCR result, DEL count, EXISTS count).
    Int(i64),
    /// Boolean value (EXISTS under RESP3).
    Bool(bool),
    /// Absent value (missing key).
    Nil,
}

impl Reply {
    /// Returns the textual payload, if any.
    pub fn into_text(self) -> Option<String> {
        match self {
            Reply::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer payload, if any.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Reply::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Interprets the reply as an existence/effect flag: boolean true or a
    /// positive integer count as true, anything else as false.
    pub fn is_positive(&self) -> bool {
        match self {
            Reply::Bool(b) => *b,
            Reply::Int(n) => *n > 0,
            _ => false,
        }
    }
}

/// Abstract key-value store interface.
///
/// Implementations must be thread-safe (Send + Sync) and support async
/// operations. The connection is assumed to be safely shareable across
/// concurrent logical operations.
#[async_trait]
pub trait KvStore: Send + Sync + 'static {
    /// Sets a key to a value in a single round trip.
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Reads the value of a key. Returns `None` for a missing key.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Increments the counter at a key, returning the new value.
    async fn incr(&self, key: &str) -> StorageResult<i64>;

    /// Deletes a key. Returns true when the key existed.
    async fn del(&self, key: &str) -> StorageResult<bool>;

    /// Checks whether a key exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Liveness probe against the store.
    async fn ping(&self) -> StorageResult<()>;

    /// Submits all commands in one outbound batch.
    ///
    /// The returned replies are in submission order, one per command; callers
    /// correlate replies back to commands positionally, so implementations
    /// must never reorder or drop entries. If the batch fails, no partial
    /// results are reported.
    async fn run_batch(&self, commands: &[BatchCommand]) -> StorageResult<Vec<Reply>>;
}
