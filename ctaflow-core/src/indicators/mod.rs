//! On-demand indicators over a `RollingSeries`.
//!
//! `IndicatorSet` borrows the series and computes every value from scratch on
//! each call. There is no cache and no hidden state: two calls against the
//! same series state always agree. Each indicator lives in its own module as
//! an `impl IndicatorSet` block.

pub mod atr;
pub mod extrema;
pub mod sma;
pub mod snapshot;
pub mod std_dev;

pub use snapshot::{BandSnapshot, BreakoutSnapshot, IndicatorSnapshot, TrendSnapshot};

use crate::series::RollingSeries;

/// Read-only indicator view of a rolling series.
#[derive(Debug, Clone, Copy)]
pub struct IndicatorSet<'a> {
    series: &'a RollingSeries,
}

impl<'a> IndicatorSet<'a> {
    pub fn new(series: &'a RollingSeries) -> Self {
        Self { series }
    }

    pub fn series(&self) -> &'a RollingSeries {
        self.series
    }
}

impl<'a> From<&'a RollingSeries> for IndicatorSet<'a> {
    fn from(series: &'a RollingSeries) -> Self {
        Self::new(series)
    }
}

/// Build a series holding `bars` with room for all of them.
#[cfg(test)]
pub fn series_of(bars: &[crate::domain::Bar]) -> RollingSeries {
    let mut series = RollingSeries::new(bars.len().max(1), 1).unwrap();
    for bar in bars {
        series.update(bar);
    }
    series
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
