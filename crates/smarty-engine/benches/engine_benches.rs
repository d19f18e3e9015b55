//! Criterion benchmarks for smarty-engine.
//!
//! Covers: one simulated month and a single rebalancing pass.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use smarty_core::types::TokenType;
use smarty_core::SimulationParams;
use smarty_engine::SimulationClock;

fn month_params(seed_investors: u32) -> Arc<SimulationParams> {
    let mut params = SimulationParams::sample();
    params.num_months = 1;
    params.investors.insert(TokenType::Seed, seed_investors);
    Arc::new(params)
}

fn bench_simulated_month(c: &mut Criterion) {
    let params = month_params(200);

    c.bench_function("simulate_month_200_investors", |b| {
        b.iter_batched(
            || SimulationClock::new(Arc::clone(&params)).unwrap(),
            |mut clock| {
                clock.run().unwrap();
                black_box(clock.observations().len())
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_single_day(c: &mut Criterion) {
    let params = month_params(1_000);

    c.bench_function("settle_day_1_1000_investors", |b| {
        b.iter_batched(
            || SimulationClock::new(Arc::clone(&params)).unwrap(),
            |mut clock| black_box(clock.step().unwrap()),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_simulated_month, bench_single_day);
criterion_main!(benches);
