//! Deterministic synthetic bar feeds.
//!
//! Used by tests, benchmarks and the CLI `synth` command. Generation is
//! seeded, so the same `(seed, count)` always produces the same bars.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::Bar;

/// Timestamp of the first synthetic bar.
pub fn base_datetime() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 2)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .unwrap_or_default()
}

/// Build bars from a close series.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
/// One bar per day starting at `base_datetime()`.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    let base = base_datetime();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                datetime: base + Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Multiplicative random walk with intrabar range.
///
/// Each step moves the close by up to ±2% and widens high/low by up to 1%
/// beyond the open/close envelope. Prices stay strictly positive.
pub fn random_walk(count: usize, seed: u64, start_price: f64) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let base = base_datetime();
    let mut prev_close = start_price.max(0.01);

    (0..count)
        .map(|i| {
            let open = prev_close;
            let close = (open * (1.0 + rng.gen_range(-0.02..0.02))).max(0.01);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = (open.min(close) * (1.0 - rng.gen_range(0.0..0.01))).max(0.005);
            let volume = rng.gen_range(500.0..5000.0_f64).round();
            prev_close = close;
            Bar {
                datetime: base + Duration::days(i as i64),
                open,
                high,
                low,
                close,
                volume,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_from_closes_shapes_ohlc() {
        let bars = bars_from_closes(&[10.0, 12.0]);
        assert_eq!(bars[0].open, 10.0);
        assert_eq!(bars[1].open, 10.0);
        assert_eq!(bars[1].high, 13.0);
        assert_eq!(bars[1].low, 9.0);
        assert!(bars.iter().all(Bar::is_sane));
        assert_eq!(bars[1].datetime - bars[0].datetime, Duration::days(1));
    }

    #[test]
    fn random_walk_is_deterministic() {
        let a = random_walk(50, 7, 100.0);
        let b = random_walk(50, 7, 100.0);
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_differ() {
        let a = random_walk(50, 7, 100.0);
        let b = random_walk(50, 8, 100.0);
        assert_ne!(a, b);
    }

    #[test]
    fn random_walk_bars_are_sane() {
        let bars = random_walk(500, 42, 50.0);
        assert_eq!(bars.len(), 500);
        assert!(bars.iter().all(Bar::is_sane));
        assert!(bars.windows(2).all(|w| w[0].datetime < w[1].datetime));
    }
}
