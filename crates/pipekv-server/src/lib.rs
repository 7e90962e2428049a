//! pipekv-server: Request handlers and configuration
//!
//! This crate contains the business logic layer including:
//! - Bulk handler for pipelined and sequential batch operations
//! - Benchmark handler for pipeline-vs-sequential timing comparisons
//! - Configuration management
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               pipekv-server                  │
//! ├─────────────────────────────────────────────┤
//! │  config.rs   - Configuration management     │
//! │  handlers/   - Request handlers             │
//! │    bulk.rs   - Batched KV operations        │
//! │    bench.rs  - Benchmark harness            │
//! └─────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod handlers;

// Re-exports for convenience
pub use config::{ConfigLoadError, ServerConfig};
pub use handlers::bench::{BenchError, BenchHandler, CompareReport};
pub use handlers::bulk::{BulkError, BulkHandler, MixedReport};
