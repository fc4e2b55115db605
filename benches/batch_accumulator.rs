//! Criterion benchmarks for the batch accumulator
//!
//! Measures the cost of buffering sends and of the flush path with a
//! writer that does no I/O.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use switchyard::domain::models::{BatchPolicy, BatchStrategy, OperationResult, Payload};
use switchyard::services::{BatchAccumulator, BatchWriter};
use switchyard::AdapterResult;

struct DiscardWriter;

#[async_trait]
impl BatchWriter for DiscardWriter {
    async fn write_batch(&self, items: Vec<Payload>, _batch_number: u64) -> AdapterResult<OperationResult> {
        Ok(OperationResult::success("discarded").with_records_processed(items.len() as u64))
    }
}

fn accumulator(size: usize) -> BatchAccumulator {
    BatchAccumulator::new(
        "bench",
        BatchPolicy {
            strategy: BatchStrategy::Mixed,
            size: Some(size),
            timeout: Duration::from_secs(3600),
        },
        Arc::new(DiscardWriter),
    )
}

/// Benchmark adding payloads with periodic size-triggered flushes
fn bench_add(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("batch_add");

    for size in [10usize, 100, 1000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("fill_and_flush", size), &size, |b, &size| {
            b.to_async(&runtime).iter(|| async move {
                let accumulator = accumulator(size);
                for i in 0..size {
                    black_box(accumulator.add(Payload::from(format!("record-{i}"))).await);
                }
            });
        });
    }
    group.finish();
}

/// Benchmark flushing a buffer that never reaches its size limit
fn bench_explicit_flush(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    c.bench_function("batch_explicit_flush_100", |b| {
        b.to_async(&runtime).iter(|| async {
            let accumulator = accumulator(usize::MAX);
            for i in 0..100 {
                accumulator.add(Payload::from(vec![i as u8; 64])).await;
            }
            black_box(accumulator.flush().await)
        });
    });
}

criterion_group!(benches, bench_add, bench_explicit_flush);
criterion_main!(benches);
