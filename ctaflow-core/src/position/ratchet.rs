//! Ratchet invariant enforcement
//!
//! **Core Rule:** Stops may tighten, never loosen (even if volatility expands).
//!
//! A wider ATR or band on a later bar would otherwise drag the trailing stop
//! away from price after a favorable move.

use crate::domain::Side;

/// Stop level for one side of the book.
///
/// - Long: the stop can only rise
/// - Short: the stop can only fall
/// - `None` means no stop is set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ratchet {
    side: Side,
    level: Option<f64>,
}

impl Ratchet {
    pub fn new(side: Side) -> Self {
        Self { side, level: None }
    }

    /// Level the ratchet would hold after `proposed`, without storing it.
    ///
    /// An unset ratchet takes the proposal as is. Otherwise the tighter of the
    /// current and proposed levels wins.
    pub fn preview(&self, proposed: f64) -> f64 {
        match self.level {
            None => proposed,
            Some(current) => match self.side {
                Side::Long => current.max(proposed),
                Side::Short => current.min(proposed),
            },
        }
    }

    /// Apply `proposed`; returns the level now held.
    ///
    /// # Example
    /// ```
    /// use ctaflow_core::domain::Side;
    /// use ctaflow_core::position::Ratchet;
    ///
    /// let mut ratchet = Ratchet::new(Side::Long);
    /// ratchet.reset(95.0);
    ///
    /// // Tightening: 95 → 100 (allowed)
    /// assert_eq!(ratchet.apply(100.0), 100.0);
    ///
    /// // Loosening: 100 → 90 (blocked, stays at 100)
    /// assert_eq!(ratchet.apply(90.0), 100.0);
    /// ```
    pub fn apply(&mut self, proposed: f64) -> f64 {
        let level = self.preview(proposed);
        self.level = Some(level);
        level
    }

    /// Overwrite the level, ignoring the ratchet rule. Used when a new
    /// position is opened.
    pub fn reset(&mut self, level: f64) {
        self.level = Some(level);
    }

    pub fn clear(&mut self) {
        self.level = None;
    }

    pub fn level(&self) -> Option<f64> {
        self.level
    }

    pub fn side(&self) -> Side {
        self.side
    }
}
