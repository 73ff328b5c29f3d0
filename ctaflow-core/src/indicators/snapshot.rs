//! Per-bar indicator bundles.
//!
//! Each policy reads one snapshot type. Snapshots are plain values built
//! from the series on every evaluated bar and dropped afterwards.

use serde::Serialize;

use super::IndicatorSet;
use crate::error::IndicatorError;
use crate::series::Field;

/// Moving-average crossover inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendSnapshot {
    pub close: f64,
    pub fast_ma: f64,
    pub slow_ma: f64,
    pub prev_fast_ma: f64,
    pub prev_slow_ma: f64,
    pub atr: f64,
}

impl TrendSnapshot {
    /// Fast average crossed above the slow one on this bar.
    pub fn golden_cross(&self) -> bool {
        self.prev_fast_ma <= self.prev_slow_ma && self.fast_ma > self.slow_ma
    }

    /// Fast average crossed below the slow one on this bar.
    pub fn death_cross(&self) -> bool {
        self.prev_fast_ma >= self.prev_slow_ma && self.fast_ma < self.slow_ma
    }
}

/// Bollinger band inputs. `upper`/`lower` are the entry bands,
/// `exit_upper`/`exit_lower` the inner bands used to take profit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandSnapshot {
    pub close: f64,
    pub mid: f64,
    pub std: f64,
    pub upper: f64,
    pub lower: f64,
    pub exit_upper: f64,
    pub exit_lower: f64,
}

/// Breakout inputs, including the daily price-limit flags.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BreakoutSnapshot {
    pub close: f64,
    pub prev_close: f64,
    pub fast_ma: f64,
    pub slow_ma: f64,
    pub atr: f64,
    pub breakout_high: f64,
    pub pullback_low: f64,
    pub near_limit_up: bool,
    pub limit_down_risk: bool,
}

/// Any policy's snapshot, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndicatorSnapshot {
    Trend(TrendSnapshot),
    Band(BandSnapshot),
    Breakout(BreakoutSnapshot),
}

impl IndicatorSnapshot {
    pub fn close(&self) -> f64 {
        match self {
            IndicatorSnapshot::Trend(s) => s.close,
            IndicatorSnapshot::Band(s) => s.close,
            IndicatorSnapshot::Breakout(s) => s.close,
        }
    }
}

impl From<TrendSnapshot> for IndicatorSnapshot {
    fn from(s: TrendSnapshot) -> Self {
        IndicatorSnapshot::Trend(s)
    }
}

impl From<BandSnapshot> for IndicatorSnapshot {
    fn from(s: BandSnapshot) -> Self {
        IndicatorSnapshot::Band(s)
    }
}

impl From<BreakoutSnapshot> for IndicatorSnapshot {
    fn from(s: BreakoutSnapshot) -> Self {
        IndicatorSnapshot::Breakout(s)
    }
}

/// Daily price-limit band around the previous close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimitBand {
    pub pct: f64,
    pub buffer: f64,
}

impl LimitBand {
    /// `(near_limit_up, limit_down_risk)` for `close` against `prev_close`.
    /// Both are false when there is no usable previous close.
    pub fn flags(&self, prev_close: f64, close: f64) -> (bool, bool) {
        if prev_close <= 0.0 {
            return (false, false);
        }
        let upper = prev_close * (1.0 + self.pct);
        let lower = prev_close * (1.0 - self.pct);
        (
            close >= upper * (1.0 - self.buffer),
            close <= lower * (1.0 + self.buffer),
        )
    }
}

impl IndicatorSet<'_> {
    fn close(&self) -> Result<f64, IndicatorError> {
        self.series()
            .latest(Field::Close)
            .ok_or(IndicatorError::InsufficientHistory {
                required: 1,
                available: 0,
            })
    }

    pub fn trend_snapshot(
        &self,
        fast: usize,
        slow: usize,
        atr: usize,
    ) -> Result<TrendSnapshot, IndicatorError> {
        Ok(TrendSnapshot {
            close: self.close()?,
            fast_ma: self.sma(fast)?,
            slow_ma: self.sma(slow)?,
            prev_fast_ma: self.sma_previous(fast)?,
            prev_slow_ma: self.sma_previous(slow)?,
            atr: self.atr(atr)?,
        })
    }

    /// Bands around the SMA of `window` closes.
    ///
    /// A zero standard deviation makes every band collapse onto the mean, so
    /// the snapshot is refused with `DegenerateIndicator`.
    pub fn band_snapshot(
        &self,
        window: usize,
        entry_dev: f64,
        exit_dev: f64,
    ) -> Result<BandSnapshot, IndicatorError> {
        let mid = self.sma(window)?;
        let std = self.std(window)?;
        if std == 0.0 {
            return Err(IndicatorError::DegenerateIndicator { indicator: "std" });
        }
        Ok(BandSnapshot {
            close: self.close()?,
            mid,
            std,
            upper: mid + std * entry_dev,
            lower: mid - std * entry_dev,
            exit_upper: mid + std * exit_dev,
            exit_lower: mid - std * exit_dev,
        })
    }

    pub fn breakout_snapshot(
        &self,
        fast: usize,
        slow: usize,
        breakout_window: usize,
        atr: usize,
        limit: LimitBand,
    ) -> Result<BreakoutSnapshot, IndicatorError> {
        let close = self.close()?;
        let prev_close =
            self.series()
                .previous(Field::Close)
                .ok_or(IndicatorError::InsufficientHistory {
                    required: 2,
                    available: self.series().len(),
                })?;
        let (near_limit_up, limit_down_risk) = limit.flags(prev_close, close);
        Ok(BreakoutSnapshot {
            close,
            prev_close,
            fast_ma: self.sma(fast)?,
            slow_ma: self.sma(slow)?,
            atr: self.atr(atr)?,
            breakout_high: self.rolling_max(Field::High, breakout_window)?,
            pullback_low: self.rolling_min(Field::Low, breakout_window)?,
            near_limit_up,
            limit_down_risk,
        })
    }
}
