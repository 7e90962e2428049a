//! Performance benchmarks for BulkHandler.
//!
//! Run with: cargo bench -p pipekv-server
//!
//! Measures pipelined vs sequential bulk writes against the in-memory store
//! at several batch sizes. The in-memory store has no network round trip, so
//! the gap here reflects only per-call overhead; against a live Redis the
//! pipelined path saves one round trip per command.

use std::collections::HashMap;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tokio::runtime::Runtime;

use pipekv_server::handlers::bulk::BulkHandler;
use pipekv_storage::MemoryKvStore;

fn synthetic_entries(count: usize) -> HashMap<String, String> {
    (0..count)
        .map(|i| (format!("bench:key:{i}"), format!("value-{i}")))
        .collect()
}

fn bench_bulk_writes(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let mut group = c.benchmark_group("bulk_write");

    for &count in &[10usize, 100, 1_000] {
        let entries = synthetic_entries(count);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(
            BenchmarkId::new("pipelined", count),
            &entries,
            |b, entries| {
                let handler = BulkHandler::new(Arc::new(MemoryKvStore::new()));
                b.to_async(&rt)
                    .iter(|| async { handler.write_pipelined(entries).await.unwrap() });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("sequential", count),
            &entries,
            |b, entries| {
                let handler = BulkHandler::new(Arc::new(MemoryKvStore::new()));
                b.to_async(&rt)
                    .iter(|| async { handler.write_sequential(entries).await.unwrap() });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_bulk_writes);
criterion_main!(benches);
