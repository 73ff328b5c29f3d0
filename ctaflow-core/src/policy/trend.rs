//! Trend following: moving average crossover with ATR trailing stops.
//!
//! Golden cross opens long, death cross opens short. A cross against the held
//! position reverses it on the same bar. Between crosses the held side trails
//! a stop `atr_multiplier` ATRs from the close and exits when the close
//! reaches it.

use super::{Decision, ExitReason, SignalPolicy};
use crate::config::TrendSettings;
use crate::domain::Side;
use crate::error::IndicatorError;
use crate::indicators::{IndicatorSet, TrendSnapshot};
use crate::position::PositionState;

#[derive(Debug, Clone)]
pub struct TrendFollowing {
    settings: TrendSettings,
}

impl TrendFollowing {
    pub fn new(settings: TrendSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &TrendSettings {
        &self.settings
    }

    fn offset(&self, atr: f64) -> f64 {
        atr * self.settings.atr_multiplier
    }
}

impl Default for TrendFollowing {
    fn default() -> Self {
        Self::new(TrendSettings::default())
    }
}

impl SignalPolicy for TrendFollowing {
    type Snapshot = TrendSnapshot;

    fn name(&self) -> &str {
        "trend_following"
    }

    fn warmup_bars(&self) -> usize {
        self.settings.warmup_bars()
    }

    fn history_size(&self) -> usize {
        self.settings.history_size
    }

    fn fixed_size(&self) -> u32 {
        self.settings.fixed_size
    }

    fn snapshot(&self, indicators: &IndicatorSet<'_>) -> Result<TrendSnapshot, IndicatorError> {
        indicators.trend_snapshot(
            self.settings.fast_window,
            self.settings.slow_window,
            self.settings.atr_window,
        )
    }

    fn evaluate(&self, snap: &TrendSnapshot, position: &PositionState) -> Decision {
        let close = snap.close;
        let offset = self.offset(snap.atr);

        if snap.golden_cross() && !position.is_long() {
            let stop = close - offset;
            return if position.is_short() {
                Decision::reverse(Side::Long, stop)
            } else {
                Decision::enter(Side::Long, stop)
            };
        }

        if snap.death_cross() && !position.is_short() {
            let stop = close + offset;
            return if position.is_long() {
                Decision::reverse(Side::Short, stop)
            } else {
                Decision::enter(Side::Short, stop)
            };
        }

        if snap.atr <= 0.0 {
            return Decision::hold();
        }

        match position.side() {
            Some(Side::Long) => {
                let trail = close - offset;
                let decision = Decision::trail(trail);
                if close <= position.preview_long_stop(trail) {
                    decision.with_exit(ExitReason::StopHit)
                } else {
                    decision
                }
            }
            Some(Side::Short) => {
                let trail = close + offset;
                let decision = Decision::trail(trail);
                if close >= position.preview_short_stop(trail) {
                    decision.with_exit(ExitReason::StopHit)
                } else {
                    decision
                }
            }
            None => Decision::hold(),
        }
    }
}
