//! Criterion benchmarks for ctaflow hot paths.
//!
//! Benchmarks:
//! 1. Per-bar engine loop for each policy
//! 2. Indicator evaluation against a full rolling series
//! 3. Stop ratchet updates

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use ctaflow_core::config::StrategyKind;
use ctaflow_core::domain::Side;
use ctaflow_core::engine::NullSink;
use ctaflow_core::factory::AnyEngine;
use ctaflow_core::indicators::IndicatorSet;
use ctaflow_core::position::PositionState;
use ctaflow_core::series::{Field, RollingSeries};
use ctaflow_core::synthetic::random_walk;

// ── 1. Engine loop ───────────────────────────────────────────────────

fn bench_engine_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_loop");

    for &bar_count in &[252, 1260, 2520] {
        let bars = random_walk(bar_count, 42, 100.0);
        for kind in StrategyKind::ALL {
            let setting = kind.default_setting();
            group.bench_with_input(
                BenchmarkId::new(kind.name(), bar_count),
                &bar_count,
                |b, _| {
                    b.iter(|| {
                        let mut engine = match AnyEngine::from_setting(&setting) {
                            Ok(engine) => engine,
                            Err(err) => panic!("default settings rejected: {err}"),
                        };
                        engine.run(black_box(&bars), &mut NullSink)
                    });
                },
            );
        }
    }

    group.finish();
}

// ── 2. Indicators ────────────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicators");

    for &history in &[100, 200] {
        let mut series = RollingSeries::new(history, 1).expect("valid capacity");
        for bar in random_walk(history, 7, 100.0) {
            series.update(&bar);
        }
        let ind = IndicatorSet::new(&series);

        group.bench_with_input(BenchmarkId::new("sma_60", history), &history, |b, _| {
            b.iter(|| black_box(ind.sma(60)))
        });
        group.bench_with_input(BenchmarkId::new("std_20", history), &history, |b, _| {
            b.iter(|| black_box(ind.std(20)))
        });
        group.bench_with_input(BenchmarkId::new("atr_14", history), &history, |b, _| {
            b.iter(|| black_box(ind.atr(14)))
        });
        group.bench_with_input(BenchmarkId::new("rolling_max_30", history), &history, |b, _| {
            b.iter(|| black_box(ind.rolling_max(Field::High, 30)))
        });
    }

    group.finish();
}

// ── 3. Ratchet ───────────────────────────────────────────────────────

fn bench_ratchet(c: &mut Criterion) {
    let closes: Vec<f64> = random_walk(1260, 3, 100.0).iter().map(|b| b.close).collect();

    c.bench_function("ratchet/long_trail_1260", |b| {
        b.iter(|| {
            let mut position = PositionState::flat();
            position.open(Side::Long, 1, closes[0] - 5.0);
            for &close in &closes {
                position.tighten(Side::Long, black_box(close - 5.0));
            }
            position.long_stop()
        })
    });
}

criterion_group!(benches, bench_engine_loop, bench_indicators, bench_ratchet);
criterion_main!(benches);
