//! Benchmarks for cache key derivation and entry decoding
//!
//! This benchmark measures:
//! - Default `method-url-query-body` keys for small and large bodies
//! - The SHA-256 hashed variant
//! - A full read of a stored entry (decode + freshness check)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use request_cache::cache::{CacheKeyGenerator, CacheStore};
use request_cache::{MemoryStorage, RequestDescriptor};

fn request_with_items(n: usize) -> RequestDescriptor {
    let items: Vec<_> = (0..n)
        .map(|i| json!({"id": i, "name": format!("item-{}", i), "tags": ["a", "b"]}))
        .collect();
    RequestDescriptor::post("/v1/search")
        .with_query(json!({"page": 1, "size": 50, "sort": "name"}))
        .with_body(json!({"filters": items}))
}

fn bench_key_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_generation");
    let plain = CacheKeyGenerator::new();
    let hashed = CacheKeyGenerator::new().hashed(true);

    for size in [0usize, 10, 100] {
        let req = request_with_items(size);
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("plain", size), &req, |b, req| {
            b.iter(|| plain.generate(black_box(req)))
        });
        group.bench_with_input(BenchmarkId::new("hashed", size), &req, |b, req| {
            b.iter(|| hashed.generate(black_box(req)))
        });
    }
    group.finish();
}

fn bench_store_read(c: &mut Criterion) {
    let store = CacheStore::new(Arc::new(MemoryStorage::new()));
    let req = request_with_items(100);
    let key = CacheKeyGenerator::new().generate(&req);
    store
        .write(&key, &req.body, Duration::from_secs(3600))
        .expect("write");

    c.bench_function("store_read_fresh", |b| {
        b.iter(|| store.read::<serde_json::Value>(black_box(&key)).expect("read"))
    });
}

criterion_group!(benches, bench_key_generation, bench_store_read);
criterion_main!(benches);
