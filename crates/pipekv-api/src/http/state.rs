//! Application state for HTTP handlers.

use std::sync::Arc;

use pipekv_server::handlers::{BenchHandler, BulkHandler};
use pipekv_storage::KvStore;

/// Application state shared across all HTTP handlers.
///
/// Holds the shared store handle plus the two handlers built over it. The
/// handlers are stateless per call; the only process-wide state is the store
/// connection itself, injected at construction so tests can substitute the
/// in-memory store.
///
/// # Type Parameters
///
/// * `S` - The storage backend implementing `KvStore`
#[derive(Clone)]
pub struct AppState<S: KvStore> {
    /// The storage backend.
    pub store: Arc<S>,
    /// Bulk operation handler (pipelined and sequential paths).
    pub bulk: BulkHandler<S>,
    /// Benchmark handler (sample data, timing comparison).
    pub bench: BenchHandler<S>,
}

impl<S: KvStore> AppState<S> {
    /// Creates a new application state over the shared store.
    pub fn new(store: Arc<S>) -> Self {
        let bulk = BulkHandler::new(Arc::clone(&store));
        let bench = BenchHandler::new(Arc::clone(&store));
        Self { store, bulk, bench }
    }
}
