//! Criterion benchmarks for smarty-core hot paths.
//!
//! Covers: exact-sum token allocation and turnover series evaluation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use smarty_core::allocator::RandomAllocator;
use smarty_core::calendar::TurnoverSeries;

fn bench_allocate(c: &mut Criterion) {
    let mut allocator = RandomAllocator::new(StdRng::seed_from_u64(1));

    c.bench_function("allocate_1m_into_500", |b| {
        b.iter(|| allocator.allocate(black_box(1_000_000), black_box(500)))
    });
}

fn bench_turnover_series(c: &mut Criterion) {
    let series = TurnoverSeries::new(10_000.0, 0.2, 5);

    c.bench_function("turnover_series_full_pass", |b| {
        b.iter(|| black_box(&series).iter().sum::<f64>())
    });
}

criterion_group!(benches, bench_allocate, bench_turnover_series);
criterion_main!(benches);
