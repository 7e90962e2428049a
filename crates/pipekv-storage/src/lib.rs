//! pipekv-storage: Storage abstraction layer
//!
//! This crate provides the key-value store abstraction for pipekv, including:
//! - KvStore trait with single-command and pipelined batch operations
//! - Redis implementation backed by a multiplexed async connection
//! - In-memory implementation for testing
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               pipekv-storage                 │
//! ├─────────────────────────────────────────────┤
//! │  traits.rs   - KvStore trait, batch types   │
//! │  redis.rs    - Redis implementation         │
//! │  memory.rs   - In-memory implementation     │
//! └─────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod memory;
pub mod redis;
pub mod traits;

// Re-export commonly used types
pub use crate::redis::RedisKvStore;
pub use error::{StorageError, StorageResult};
pub use memory::MemoryKvStore;
pub use traits::{BatchCommand, KvStore, Reply};
