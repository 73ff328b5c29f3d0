//! Engine loop tests across all policies: warm-up, sinks, per-bar instruction
//! shape, determinism.

use ctaflow_core::config::{StrategyKind, StrategySetting, TrendSettings};
use ctaflow_core::domain::TradingInstruction;
use ctaflow_core::engine::{BarOutcome, ExecutionSink, NullSink, SkipReason, StrategyEngine};
use ctaflow_core::factory::{replay, AnyEngine};
use ctaflow_core::policy::TrendFollowing;
use ctaflow_core::synthetic::random_walk;

/// Counts what it receives instead of storing it.
#[derive(Default)]
struct CountingSink {
    cancels: usize,
    orders: usize,
}

impl ExecutionSink for CountingSink {
    fn submit(&mut self, instruction: &TradingInstruction) {
        if instruction.is_order() {
            self.orders += 1;
        } else {
            self.cancels += 1;
        }
    }
}

#[test]
fn every_evaluated_bar_starts_with_cancel_all() {
    let bars = random_walk(600, 17, 100.0);
    for kind in StrategyKind::ALL {
        let mut engine = AnyEngine::from_setting(&kind.default_setting()).unwrap();
        for bar in &bars {
            match engine.on_bar(bar) {
                BarOutcome::Skipped(_) => {}
                BarOutcome::Evaluated { instructions, .. } => {
                    assert_eq!(instructions[0], TradingInstruction::CancelAll);
                    assert!(instructions[1..].iter().all(TradingInstruction::is_order));
                    // one transition: a single order, or close + open on a reversal
                    assert!(instructions.len() <= 3, "{kind}: {instructions:?}");
                    if instructions.len() == 3 {
                        assert_eq!(kind, StrategyKind::TrendFollowing);
                    }
                }
            }
        }
    }
}

#[test]
fn position_tracks_emitted_orders() {
    let bars = random_walk(800, 23, 60.0);
    for kind in StrategyKind::ALL {
        let mut engine = AnyEngine::from_setting(&kind.default_setting()).unwrap();
        let mut net = 0i64;
        for bar in &bars {
            let outcome = engine.on_bar(bar);
            net += outcome
                .instructions()
                .iter()
                .map(TradingInstruction::position_delta)
                .sum::<i64>();
            assert_eq!(net, engine.position().pos(), "{kind}");
        }
    }
}

#[test]
fn breakout_never_goes_short() {
    let mut engine = AnyEngine::from_setting(&StrategyKind::LimitBreakout.default_setting()).unwrap();
    for bar in random_walk(1500, 5, 30.0) {
        engine.on_bar(&bar);
        assert!(engine.position().pos() >= 0);
    }
}

#[test]
fn run_delivers_to_sink_and_counts() {
    let bars = random_walk(500, 31, 100.0);
    let setting = StrategyKind::TrendFollowing.default_setting();
    let mut engine = AnyEngine::from_setting(&setting).unwrap();
    let mut sink = CountingSink::default();
    let summary = engine.run(&bars, &mut sink);

    assert_eq!(summary.bars, 500);
    assert_eq!(summary.skipped, setting.warmup_bars() - 1);
    assert_eq!(sink.cancels, summary.evaluated);
    assert_eq!(sink.orders, summary.orders);
    assert_eq!(summary.orders, summary.entries + summary.exits + 2 * summary.reversals);
}

#[test]
fn warm_up_shortens_the_skip_phase() {
    let bars = random_walk(200, 8, 100.0);
    let setting = StrategyKind::MeanReversion.default_setting();
    let warmup = setting.warmup_bars();

    let mut engine = AnyEngine::from_setting(&setting).unwrap();
    engine.warm_up(&bars[..warmup]);
    assert!(engine.is_initialized());
    assert!(engine.position().is_flat());

    let outcome = engine.on_bar(&bars[warmup]);
    assert!(!outcome.is_skipped());
}

#[test]
fn partial_warm_up_still_skips() {
    let bars = random_walk(10, 8, 100.0);
    let mut engine =
        StrategyEngine::new(TrendFollowing::new(TrendSettings::default())).unwrap();
    engine.warm_up(&bars[..5]);
    assert_eq!(engine.on_bar(&bars[5]), BarOutcome::Skipped(SkipReason::WarmingUp));
}

#[test]
fn replay_is_deterministic() {
    let bars = random_walk(700, 99, 45.0);
    for kind in StrategyKind::ALL {
        let setting = kind.default_setting();
        let first = replay(&setting, &bars).unwrap();
        let second = replay(&setting, &bars).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn null_sink_run_matches_recorded_run() {
    let bars = random_walk(400, 12, 100.0);
    let setting = StrategySetting::TrendFollowing(TrendSettings {
        fast_window: 5,
        slow_window: 20,
        history_size: 60,
        ..TrendSettings::default()
    });
    let mut a = AnyEngine::from_setting(&setting).unwrap();
    let mut b = AnyEngine::from_setting(&setting).unwrap();
    let mut recorded = Vec::new();
    let sa = a.run(&bars, &mut NullSink);
    let sb = b.run(&bars, &mut recorded);
    assert_eq!(sa, sb);
    assert_eq!(recorded.iter().filter(|i| i.is_order()).count(), sb.orders);
}
