//! Redis implementation of KvStore.
//!
//! Single commands go through the multiplexed async connection one round trip
//! at a time. `run_batch` buffers every command into a `redis::Pipeline` and
//! flushes them in a single outbound write; the server replies with one
//! result per command, in submission order.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Value};
use tracing::instrument;

use crate::error::{StorageError, StorageResult};
use crate::traits::{BatchCommand, KvStore, Reply};

/// Redis-backed key-value store.
///
/// The multiplexed connection is cheap to clone and safe to share across
/// concurrent operations; each call clones its own handle.
#[derive(Clone)]
pub struct RedisKvStore {
    conn: MultiplexedConnection,
}

impl RedisKvStore {
    /// Connects to Redis at the given URL (e.g. `redis://localhost:6379`).
    pub async fn connect(url: &str) -> StorageResult<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self { conn })
    }

    /// Connects with explicit response and connect timeouts.
    pub async fn connect_with_timeouts(
        url: &str,
        response_timeout: Duration,
        connect_timeout: Duration,
    ) -> StorageResult<Self> {
        let client = redis::Client::open(url)?;
        let conn = client
            .get_multiplexed_async_connection_with_timeouts(response_timeout, connect_timeout)
            .await?;
        Ok(Self { conn })
    }
}

/// Decodes a full pipeline result, pairing each reply with the command that
/// produced it. A reply count that differs from the command count breaks the
/// positional correlation contract and is rejected outright rather than
/// silently truncated.
fn decode_batch(commands: &[BatchCommand], raw: Vec<Value>) -> StorageResult<Vec<Reply>> {
    if raw.len() != commands.len() {
        return Err(StorageError::ProtocolError {
            message: format!(
                "pipeline returned {} replies for {} commands",
                raw.len(),
                commands.len()
            ),
        });
    }
    commands
        .iter()
        .zip(raw)
        .map(|(command, value)| decode_reply(command, value))
        .collect()
}

/// Decodes one raw wire reply into the uniform [`Reply`] representation.
///
/// This is the single decode step applied to every element of a batch result
/// right after submission. Depending on serializer configuration the client
/// may hand back either text or raw bytes for the same command; bytes are
/// decoded as UTF-8 text here so call sites never type-check raw values.
fn decode_reply(command: &BatchCommand, value: Value) -> StorageResult<Reply> {
    match value {
        Value::Okay => Ok(Reply::Ok),
        Value::SimpleString(s) => Ok(Reply::Text(s)),
        Value::BulkString(bytes) => Ok(Reply::Text(String::from_utf8_lossy(&bytes).into_owned())),
        Value::Int(n) => Ok(Reply::Int(n)),
        Value::Boolean(b) => Ok(Reply::Bool(b)),
        Value::Nil => Ok(Reply::Nil),
        other => Err(StorageError::UnexpectedReply {
            command: command.name().to_string(),
            reply: format!("{other:?}"),
        }),
    }
}

#[async_trait]
impl KvStore for RedisKvStore {
    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn incr(&self, key: &str) -> StorageResult<i64> {
        let mut conn = self.conn.clone();
        let value: i64 = conn.incr(key, 1).await?;
        Ok(value)
    }

    async fn del(&self, key: &str) -> StorageResult<bool> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(key).await?;
        Ok(removed > 0)
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let mut conn = self.conn.clone();
        let exists: bool = conn.exists(key).await?;
        Ok(exists)
    }

    async fn ping(&self) -> StorageResult<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    #[instrument(skip(self, commands), fields(commands = commands.len()))]
    async fn run_batch(&self, commands: &[BatchCommand]) -> StorageResult<Vec<Reply>> {
        let mut pipe = redis::pipe();
        for command in commands {
            match command {
                BatchCommand::Set { key, value } => {
                    pipe.set(key, value);
                }
                BatchCommand::Get { key } => {
                    pipe.get(key);
                }
                BatchCommand::Incr { key } => {
                    pipe.incr(key, 1);
                }
                BatchCommand::Del { key } => {
                    pipe.del(key);
                }
                BatchCommand::Exists { key } => {
                    pipe.exists(key);
                }
            }
        }

        let mut conn = self.conn.clone();
        let raw: Vec<Value> = pipe.query_async(&mut conn).await?;
        decode_batch(commands, raw)
    }
}
