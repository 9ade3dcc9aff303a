//! Performance benchmarks for StreamDigest
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use streamdigest::engine::DigestEngine;
use streamdigest::hash::hash_bytes;
use streamdigest::HashAlgorithm;

fn test_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 256) as u8).collect()
}

fn bench_one_shot(c: &mut Criterion) {
    let mut group = c.benchmark_group("one_shot");
    let data = test_data(1024 * 1024);
    group.throughput(Throughput::Bytes(data.len() as u64));

    for algorithm in HashAlgorithm::ALL {
        group.bench_with_input(
            BenchmarkId::from_parameter(algorithm.name()),
            &algorithm,
            |b, &algorithm| {
                b.iter(|| hash_bytes(black_box(&data), algorithm).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_chunked_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_chunked");
    let data = test_data(1024 * 1024);
    group.throughput(Throughput::Bytes(data.len() as u64));

    for chunk_size in [64usize, 4096, 64 * 1024] {
        group.bench_with_input(
            BenchmarkId::from_parameter(chunk_size),
            &chunk_size,
            |b, &chunk_size| {
                let mut engine = DigestEngine::default();
                b.iter(|| {
                    let handle = engine.create(1).unwrap();
                    for chunk in data.chunks(chunk_size) {
                        engine.update(handle, black_box(chunk)).unwrap();
                    }
                    let digest = engine.finalize(handle).unwrap();
                    engine.destroy(handle).unwrap();
                    digest
                });
            },
        );
    }

    group.finish();
}

fn bench_lifecycle_overhead(c: &mut Criterion) {
    let mut engine = DigestEngine::default();

    c.bench_function("create_finalize_destroy_empty", |b| {
        b.iter(|| {
            let handle = engine.create(black_box(1)).unwrap();
            let digest = engine.finalize(handle).unwrap();
            engine.destroy(handle).unwrap();
            digest
        });
    });
}

criterion_group!(
    benches,
    bench_one_shot,
    bench_chunked_engine,
    bench_lifecycle_overhead
);
criterion_main!(benches);
