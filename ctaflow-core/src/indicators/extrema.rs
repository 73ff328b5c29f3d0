//! Rolling extrema over the bars preceding the current one.
//!
//! The current bar is always excluded so a close can be compared against the
//! range it is breaking out of.

use super::IndicatorSet;
use crate::error::IndicatorError;
use crate::series::{Field, Inclusion};

impl IndicatorSet<'_> {
    /// Highest `field` value over the `length` bars before the current bar.
    pub fn rolling_max(&self, field: Field, length: usize) -> Result<f64, IndicatorError> {
        let window = self
            .series()
            .window(field, length, Inclusion::ExcludeCurrent)?;
        Ok(window.into_iter().fold(f64::NEG_INFINITY, f64::max))
    }

    /// Lowest `field` value over the `length` bars before the current bar.
    pub fn rolling_min(&self, field: Field, length: usize) -> Result<f64, IndicatorError> {
        let window = self
            .series()
            .window(field, length, Inclusion::ExcludeCurrent)?;
        Ok(window.into_iter().fold(f64::INFINITY, f64::min))
    }
}
