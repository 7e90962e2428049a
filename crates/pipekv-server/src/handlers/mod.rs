//! Request handlers for bulk key-value operations.
//!
//! `bulk` is the batch executor: it translates a logical group of
//! identical-shaped operations into either one pipelined round trip or N
//! sequential calls, and normalizes the replies. `bench` orchestrates timed
//! comparisons between the two paths.

pub mod bench;
pub mod bulk;

pub use bench::{BenchError, BenchHandler, CompareReport};
pub use bulk::{BulkError, BulkHandler, BulkResult, MixedReport, MAX_BATCH_KEYS};
