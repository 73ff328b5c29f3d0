//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. SMA agrees with an independently computed mean
//! 2. Standard deviation of a constant window is exactly zero
//! 3. Ratchet monotonicity: stops may only tighten while a position is held
//! 4. Flat positions carry no stops; each stop only exists on its own side
//! 5. Nothing is emitted before the series is initialized

use proptest::prelude::*;

use ctaflow_core::config::{
    BreakoutSettings, MeanReversionSettings, StrategySetting, TrendSettings,
};
use ctaflow_core::domain::Side;
use ctaflow_core::engine::{BarOutcome, SkipReason};
use ctaflow_core::factory::AnyEngine;
use ctaflow_core::indicators::IndicatorSet;
use ctaflow_core::position::{PositionState, Ratchet};
use ctaflow_core::series::RollingSeries;
use ctaflow_core::synthetic::{bars_from_closes, random_walk};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((1.0..1000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0), 1..80)
}

/// Small windows so short random walks trade often.
fn active_settings() -> Vec<StrategySetting> {
    vec![
        StrategySetting::TrendFollowing(TrendSettings {
            fast_window: 3,
            slow_window: 8,
            atr_window: 5,
            atr_multiplier: 1.5,
            fixed_size: 1,
            history_size: 20,
        }),
        StrategySetting::MeanReversion(MeanReversionSettings {
            boll_window: 10,
            entry_dev: 1.0,
            exit_dev: 0.2,
            stop_multiplier: 2.0,
            fixed_size: 1,
            history_size: 20,
        }),
        StrategySetting::LimitBreakout(BreakoutSettings {
            fast_window: 3,
            slow_window: 8,
            breakout_window: 5,
            atr_window: 5,
            atr_multiplier: 1.0,
            fixed_size: 100,
            history_size: 20,
            ..BreakoutSettings::default()
        }),
    ]
}

fn series_of(closes: &[f64]) -> RollingSeries {
    let mut series = RollingSeries::new(closes.len().max(1), 1).unwrap();
    for bar in bars_from_closes(closes) {
        series.update(&bar);
    }
    series
}

// ── 1. SMA ───────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn sma_matches_independent_mean(closes in arb_closes(), pick in 0.0..1.0_f64) {
        let length = 1 + ((closes.len() - 1) as f64 * pick) as usize;
        let series = series_of(&closes);
        let sma = IndicatorSet::new(&series).sma(length).unwrap();

        let tail = &closes[closes.len() - length..];
        let expected = tail.iter().sum::<f64>() / length as f64;
        prop_assert!((sma - expected).abs() < 1e-9, "sma={} expected={}", sma, expected);
    }
}

// ── 2. Constant window ───────────────────────────────────────────────

proptest! {
    #[test]
    fn std_of_constant_window_is_zero(price in 0.01..10_000.0_f64, n in 2usize..60) {
        let series = series_of(&vec![price; n]);
        prop_assert_eq!(IndicatorSet::new(&series).std(n).unwrap(), 0.0);
    }

    #[test]
    fn mean_reversion_is_silent_on_flat_prices(price in 1.0..500.0_f64, n in 5usize..40) {
        let setting = StrategySetting::MeanReversion(MeanReversionSettings {
            boll_window: 5,
            ..MeanReversionSettings::default()
        });
        let mut engine = AnyEngine::from_setting(&setting).unwrap();
        for bar in bars_from_closes(&vec![price; n]) {
            let outcome = engine.on_bar(&bar);
            prop_assert!(outcome.instructions().is_empty());
        }
        prop_assert!(engine.position().is_flat());
    }
}

// ── 3. Ratchet monotonicity ──────────────────────────────────────────

proptest! {
    #[test]
    fn ratchet_never_loosens(
        initial in 50.0..150.0_f64,
        proposals in prop::collection::vec(50.0..150.0_f64, 1..50),
    ) {
        let mut long = Ratchet::new(Side::Long);
        let mut short = Ratchet::new(Side::Short);
        long.reset(initial);
        short.reset(initial);
        for p in proposals {
            let before = (long.level(), short.level());
            long.apply(p);
            short.apply(p);
            prop_assert!(long.level() >= before.0);
            prop_assert!(short.level() <= before.1);
        }
    }

    #[test]
    fn engine_stops_tighten_while_held(seed in 0u64..10_000) {
        let bars = random_walk(250, seed, 100.0);
        for setting in active_settings() {
            let mut engine = AnyEngine::from_setting(&setting).unwrap();
            let mut prev: PositionState = *engine.position();
            for bar in &bars {
                let outcome = engine.on_bar(bar);
                let now = *engine.position();
                let traded = outcome.instructions().iter().any(|i| i.is_order());
                if !traded && prev.is_long() && now.is_long() {
                    prop_assert!(now.long_stop() >= prev.long_stop(),
                        "{:?}: long stop loosened {:?} -> {:?}", setting.kind(), prev.long_stop(), now.long_stop());
                }
                if !traded && prev.is_short() && now.is_short() {
                    prop_assert!(now.short_stop() <= prev.short_stop(),
                        "{:?}: short stop loosened {:?} -> {:?}", setting.kind(), prev.short_stop(), now.short_stop());
                }
                prev = now;
            }
        }
    }
}

// ── 4. Stops follow the position ─────────────────────────────────────

proptest! {
    #[test]
    fn flat_means_no_stops(seed in 0u64..10_000) {
        let bars = random_walk(250, seed, 50.0);
        for setting in active_settings() {
            let mut engine = AnyEngine::from_setting(&setting).unwrap();
            for bar in &bars {
                engine.on_bar(bar);
                let p = engine.position();
                if p.is_flat() {
                    prop_assert_eq!(p.long_stop(), None);
                    prop_assert_eq!(p.short_stop(), None);
                }
                if p.long_stop().is_some() {
                    prop_assert!(p.is_long());
                }
                if p.short_stop().is_some() {
                    prop_assert!(p.is_short());
                }
            }
        }
    }
}

// ── 5. Warm-up ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn nothing_before_initialized(seed in 0u64..10_000, count in 1usize..60) {
        let bars = random_walk(count, seed, 100.0);
        for setting in active_settings() {
            let mut engine = AnyEngine::from_setting(&setting).unwrap();
            for (i, bar) in bars.iter().enumerate() {
                let outcome = engine.on_bar(bar);
                if i + 1 < setting.warmup_bars() {
                    prop_assert!(!engine.is_initialized());
                    prop_assert_eq!(&outcome, &BarOutcome::Skipped(SkipReason::WarmingUp));
                    prop_assert!(outcome.instructions().is_empty());
                }
            }
        }
    }
}
