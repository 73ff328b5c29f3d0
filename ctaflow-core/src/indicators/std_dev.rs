//! Population standard deviation of close prices.
//!
//! Divides by N, not N-1. Values are shifted by the first element of the
//! window before accumulating, which keeps the sum-of-squares form stable and
//! makes a constant window come out as exactly 0.0.

use super::IndicatorSet;
use crate::error::IndicatorError;
use crate::series::{Field, Inclusion};

impl IndicatorSet<'_> {
    /// Population standard deviation of the last `length` closes.
    pub fn std(&self, length: usize) -> Result<f64, IndicatorError> {
        let window = self
            .series()
            .window(Field::Close, length, Inclusion::IncludeCurrent)?;
        Ok(population_std(&window))
    }
}

pub(crate) fn population_std(values: &[f64]) -> f64 {
    let Some(&shift) = values.first() else {
        return 0.0;
    };
    let n = values.len() as f64;
    let (sum, sum_sq) = values.iter().fold((0.0, 0.0), |(s, sq), &v| {
        let d = v - shift;
        (s + d, sq + d * d)
    });
    let variance = (sum_sq - sum * sum / n) / n;
    variance.max(0.0).sqrt()
}
