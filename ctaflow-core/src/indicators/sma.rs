//! Simple Moving Average (SMA) of close prices.

use super::IndicatorSet;
use crate::error::IndicatorError;
use crate::series::{Field, Inclusion};

impl IndicatorSet<'_> {
    /// Arithmetic mean of the last `length` closes.
    pub fn sma(&self, length: usize) -> Result<f64, IndicatorError> {
        let window = self
            .series()
            .window(Field::Close, length, Inclusion::IncludeCurrent)?;
        Ok(mean(&window))
    }

    /// The same average as of the previous bar (window excludes the current bar).
    ///
    /// Crossover detection compares this against the current value instead of
    /// remembering last bar's result.
    pub fn sma_previous(&self, length: usize) -> Result<f64, IndicatorError> {
        let window = self
            .series()
            .window(Field::Close, length, Inclusion::ExcludeCurrent)?;
        Ok(mean(&window))
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
