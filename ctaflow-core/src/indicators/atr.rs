//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|)
//! ATR uses Wilder smoothing (EMA with alpha = 1/period) over every true range
//! the series still retains.
//! Lookback: period (needs period+1 bars, since the first retained bar has no
//! previous close).

use super::IndicatorSet;
use crate::error::IndicatorError;
use crate::series::Field;

impl IndicatorSet<'_> {
    /// Wilder ATR over `length` periods.
    pub fn atr(&self, length: usize) -> Result<f64, IndicatorError> {
        let series = self.series();
        let required = length.max(1).saturating_add(1);
        if length == 0 || series.len() < required {
            return Err(IndicatorError::InsufficientHistory {
                required,
                available: series.len(),
            });
        }

        let high: Vec<f64> = series.values(Field::High).collect();
        let low: Vec<f64> = series.values(Field::Low).collect();
        let close: Vec<f64> = series.values(Field::Close).collect();

        // TR[0] has no previous close; the Wilder seed starts from TR[1].
        let tr = true_range(&high, &low, &close);
        wilder_smooth(&tr[1..], length).ok_or(IndicatorError::InsufficientHistory {
            required,
            available: series.len(),
        })
    }
}

/// Compute the True Range series from parallel high/low/close columns.
/// TR[0] = high[0] - low[0] (no previous close).
/// TR[t] = max(high[t]-low[t], |high[t]-close[t-1]|, |low[t]-close[t-1]|).
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    let n = high.len().min(low.len()).min(close.len());
    let mut tr = Vec::with_capacity(n);

    if n == 0 {
        return tr;
    }

    tr.push(high[0] - low[0]);
    for i in 1..n {
        let (h, l, pc) = (high[i], low[i], close[i - 1]);
        tr.push((h - l).max((h - pc).abs()).max((l - pc).abs()));
    }

    tr
}

/// Wilder-smoothed value at the end of `values`.
///
/// Seed: mean of the first `period` values. Each later value v updates
/// `prev = (prev * (period - 1) + v) / period`. Returns `None` when fewer
/// than `period` values are available.
pub fn wilder_smooth(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }

    let seed = values[..period].iter().sum::<f64>() / period as f64;
    let alpha = 1.0 / period as f64;
    Some(
        values[period..]
            .iter()
            .fold(seed, |prev, &v| alpha * v + (1.0 - alpha) * prev),
    )
}
