use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use skir_runtime::{from_bytes, from_json, to_bytes, to_dense_json, to_readable_json};

#[path = "../tests/common/mod.rs"]
mod common;

use common::{jane, tarzan, User, UserRegistry};

fn registry(size: i64) -> UserRegistry {
    let mut registry = UserRegistry::default();
    for id in 0..size {
        let mut user = if id % 2 == 0 { tarzan() } else { jane() };
        user.user_id = id;
        registry.users.push_back(user);
    }
    registry
}

fn encode_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    let user = tarzan();

    group.bench_function("dense_json/user", |b| b.iter(|| black_box(to_dense_json(black_box(&user)))));
    group.bench_function("readable_json/user", |b| {
        b.iter(|| black_box(to_readable_json(black_box(&user))))
    });
    group.bench_function("binary/user", |b| b.iter(|| black_box(to_bytes(black_box(&user)))));

    for size in [10, 1000] {
        let registry = registry(size);
        group.bench_with_input(BenchmarkId::new("dense_json/registry", size), &registry, |b, r| {
            b.iter(|| black_box(to_dense_json(r)))
        });
        group.bench_with_input(BenchmarkId::new("binary/registry", size), &registry, |b, r| {
            b.iter(|| black_box(to_bytes(r)))
        });
    }

    group.finish();
}

fn decode_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let user = tarzan();
    let dense = to_dense_json(&user);
    let readable = to_readable_json(&user);
    let bytes = to_bytes(&user);

    group.bench_function("dense_json/user", |b| {
        b.iter(|| black_box(from_json::<User>(black_box(&dense)).unwrap()))
    });
    group.bench_function("readable_json/user", |b| {
        b.iter(|| black_box(from_json::<User>(black_box(&readable)).unwrap()))
    });
    group.bench_function("binary/user", |b| {
        b.iter(|| black_box(from_bytes::<User>(black_box(&bytes)).unwrap()))
    });

    let registry = registry(1000);
    let dense = to_dense_json(&registry);
    let bytes = to_bytes(&registry);
    group.bench_function("dense_json/registry/1000", |b| {
        b.iter(|| black_box(from_json::<UserRegistry>(&dense).unwrap()))
    });
    group.bench_function("binary/registry/1000", |b| {
        b.iter(|| black_box(from_bytes::<UserRegistry>(&bytes).unwrap()))
    });

    group.finish();
}

fn lookup_benchmark(c: &mut Criterion) {
    let registry = registry(1000);
    c.bench_function("keyed/find_or_null", |b| {
        b.iter(|| black_box(registry.users.find_or_null(black_box(&777))))
    });
}

criterion_group!(benches, encode_benchmark, decode_benchmark, lookup_benchmark);
criterion_main!(benches);
