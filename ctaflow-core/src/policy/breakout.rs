//! Limit-aware breakout: long-only momentum for markets with daily price
//! limits.
//!
//! Entry: fast MA above slow MA and the close above the highest high of the
//! preceding `breakout_window` bars, unless the close is already pinned near
//! the limit-up price (an order there is unlikely to fill).
//!
//! Exit, first match wins:
//! 1. close near the limit-down price
//! 2. close at or below the ratcheted ATR stop
//! 3. close below the fast MA
//! 4. fast MA below slow MA
//! 5. close at or below the lowest low of the preceding window

use super::{Decision, ExitReason, SignalPolicy};
use crate::config::BreakoutSettings;
use crate::domain::Side;
use crate::error::IndicatorError;
use crate::indicators::snapshot::LimitBand;
use crate::indicators::{BreakoutSnapshot, IndicatorSet};
use crate::position::PositionState;

/// Initial stop as a fraction of the entry close when ATR is zero.
const FALLBACK_STOP_RATIO: f64 = 0.97;

#[derive(Debug, Clone)]
pub struct LimitAwareBreakout {
    settings: BreakoutSettings,
}

impl LimitAwareBreakout {
    pub fn new(settings: BreakoutSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &BreakoutSettings {
        &self.settings
    }

    fn limit_band(&self) -> LimitBand {
        LimitBand {
            pct: self.settings.limit_pct,
            buffer: self.settings.limit_buffer,
        }
    }
}

impl Default for LimitAwareBreakout {
    fn default() -> Self {
        Self::new(BreakoutSettings::default())
    }
}

impl SignalPolicy for LimitAwareBreakout {
    type Snapshot = BreakoutSnapshot;

    fn name(&self) -> &str {
        "limit_breakout"
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

    fn snapshot(&self, indicators: &IndicatorSet<'_>) -> Result<BreakoutSnapshot, IndicatorError> {
        indicators.breakout_snapshot(
            self.settings.fast_window,
            self.settings.slow_window,
            self.settings.breakout_window,
            self.settings.atr_window,
            self.limit_band(),
        )
    }

    fn evaluate(&self, snap: &BreakoutSnapshot, position: &PositionState) -> Decision {
        let close = snap.close;
        let offset = snap.atr * self.settings.atr_multiplier;

        match position.side() {
            None => {
                let entry = snap.fast_ma > snap.slow_ma
                    && close > snap.breakout_high
                    && !snap.near_limit_up;
                if !entry {
                    return Decision::hold();
                }
                let stop = if snap.atr > 0.0 {
                    close - offset
                } else {
                    close * FALLBACK_STOP_RATIO
                };
                Decision::enter(Side::Long, stop)
            }
            Some(Side::Long) => {
                let decision = if snap.atr > 0.0 {
                    Decision::trail(close - offset)
                } else {
                    Decision::hold()
                };
                let stop = match decision.trailing_stop {
                    Some(trail) => position.preview_long_stop(trail),
                    None => position.long_stop_or_sentinel(),
                };

                let reason = if snap.limit_down_risk {
                    Some(ExitReason::LimitDownRisk)
                } else if close <= stop {
                    Some(ExitReason::StopHit)
                } else if close < snap.fast_ma {
                    Some(ExitReason::BelowFastAverage)
                } else if snap.fast_ma < snap.slow_ma {
                    Some(ExitReason::TrendReversal)
                } else if close <= snap.pullback_low {
                    Some(ExitReason::SupportBreak)
                } else {
                    None
                };

                match reason {
                    Some(reason) => decision.with_exit(reason),
                    None => decision,
                }
            }
            // never opened by this policy; flatten anything handed to it
            Some(Side::Short) => Decision::hold().with_exit(ExitReason::TrendReversal),
        }
    }
}
