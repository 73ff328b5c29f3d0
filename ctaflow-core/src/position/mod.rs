//! Position state machine: Flat, Long, Short.
//!
//! **Invariants:**
//! 1. While long, `long_stop` never decreases; while short, `short_stop`
//!    never increases (see `ratchet`).
//! 2. Whenever the position returns to flat both stops are cleared.
//! 3. `long_stop` is only set while long, `short_stop` only while short.

pub mod ratchet;

pub use ratchet::Ratchet;

use serde::Serialize;

use crate::domain::Side;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionState {
    pos: i64,
    long_stop: Ratchet,
    short_stop: Ratchet,
}

impl Default for PositionState {
    fn default() -> Self {
        Self::flat()
    }
}

impl PositionState {
    pub fn flat() -> Self {
        Self {
            pos: 0,
            long_stop: Ratchet::new(Side::Long),
            short_stop: Ratchet::new(Side::Short),
        }
    }

    /// Signed size: 0 flat, > 0 long, < 0 short.
    pub fn pos(&self) -> i64 {
        self.pos
    }

    pub fn side(&self) -> Option<Side> {
        Side::from_position(self.pos)
    }

    pub fn is_flat(&self) -> bool {
        self.pos == 0
    }

    pub fn is_long(&self) -> bool {
        self.pos > 0
    }

    pub fn is_short(&self) -> bool {
        self.pos < 0
    }

    /// Absolute size as an order volume.
    pub fn volume(&self) -> u32 {
        u32::try_from(self.pos.unsigned_abs()).unwrap_or(u32::MAX)
    }

    pub fn long_stop(&self) -> Option<f64> {
        self.long_stop.level()
    }

    pub fn short_stop(&self) -> Option<f64> {
        self.short_stop.level()
    }

    /// `long_stop` with "unset" reported as negative infinity.
    pub fn long_stop_or_sentinel(&self) -> f64 {
        self.long_stop().unwrap_or(f64::NEG_INFINITY)
    }

    /// `short_stop` with "unset" reported as positive infinity.
    pub fn short_stop_or_sentinel(&self) -> f64 {
        self.short_stop().unwrap_or(f64::INFINITY)
    }

    /// Stop the long ratchet would hold after `proposed`.
    pub fn preview_long_stop(&self, proposed: f64) -> f64 {
        self.long_stop.preview(proposed)
    }

    /// Stop the short ratchet would hold after `proposed`.
    pub fn preview_short_stop(&self, proposed: f64) -> f64 {
        self.short_stop.preview(proposed)
    }

    /// Enter a fresh position on `side`, replacing whatever was held.
    pub fn open(&mut self, side: Side, volume: u32, initial_stop: f64) {
        self.long_stop.clear();
        self.short_stop.clear();
        match side {
            Side::Long => {
                self.pos = i64::from(volume);
                self.long_stop.reset(initial_stop);
            }
            Side::Short => {
                self.pos = -i64::from(volume);
                self.short_stop.reset(initial_stop);
            }
        }
    }

    /// Ratchet the stop of the side currently held.
    ///
    /// Returns the stop now in force, or `None` when `side` is not the held
    /// side (the proposal is ignored).
    pub fn tighten(&mut self, side: Side, proposed: f64) -> Option<f64> {
        if self.side() != Some(side) {
            return None;
        }
        Some(match side {
            Side::Long => self.long_stop.apply(proposed),
            Side::Short => self.short_stop.apply(proposed),
        })
    }

    /// Go flat. Returns the signed size that was closed.
    pub fn close(&mut self) -> i64 {
        let closed = self.pos;
        self.pos = 0;
        self.long_stop.clear();
        self.short_stop.clear();
        closed
    }

    pub fn summary(&self) -> PositionSummary {
        PositionSummary {
            pos: self.pos,
            long_stop: self.long_stop(),
            short_stop: self.short_stop(),
        }
    }
}

/// Serializable view of a `PositionState`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionSummary {
    pub pos: i64,
    pub long_stop: Option<f64>,
    pub short_stop: Option<f64>,
}
