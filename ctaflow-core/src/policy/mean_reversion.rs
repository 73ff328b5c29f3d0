//! Mean reversion: fade closes outside the Bollinger bands.
//!
//! Flat: a close below the lower entry band buys, above the upper entry band
//! shorts. Held positions exit at the inner band on their own side of the
//! mean, or at a stop trailing `stop_multiplier` standard deviations from the
//! close. There is no direct long/short reversal.

use super::{Decision, ExitReason, SignalPolicy};
use crate::config::MeanReversionSettings;
use crate::domain::Side;
use crate::error::IndicatorError;
use crate::indicators::{BandSnapshot, IndicatorSet};
use crate::position::PositionState;

#[derive(Debug, Clone)]
pub struct MeanReversion {
    settings: MeanReversionSettings,
}

impl MeanReversion {
    pub fn new(settings: MeanReversionSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &MeanReversionSettings {
        &self.settings
    }
}

impl Default for MeanReversion {
    fn default() -> Self {
        Self::new(MeanReversionSettings::default())
    }
}

impl SignalPolicy for MeanReversion {
    type Snapshot = BandSnapshot;

    fn name(&self) -> &str {
        "mean_reversion"
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

    fn snapshot(&self, indicators: &IndicatorSet<'_>) -> Result<BandSnapshot, IndicatorError> {
        indicators.band_snapshot(
            self.settings.boll_window,
            self.settings.entry_dev,
            self.settings.exit_dev,
        )
    }

    fn evaluate(&self, snap: &BandSnapshot, position: &PositionState) -> Decision {
        let close = snap.close;
        let offset = snap.std * self.settings.stop_multiplier;

        match position.side() {
            None if close < snap.lower => Decision::enter(Side::Long, close - offset),
            None if close > snap.upper => Decision::enter(Side::Short, close + offset),
            None => Decision::hold(),
            Some(Side::Long) => {
                let trail = close - offset;
                let decision = Decision::trail(trail);
                if close >= snap.exit_upper {
                    decision.with_exit(ExitReason::BandReversion)
                } else if close <= position.preview_long_stop(trail) {
                    decision.with_exit(ExitReason::StopHit)
                } else {
                    decision
                }
            }
            Some(Side::Short) => {
                let trail = close + offset;
                let decision = Decision::trail(trail);
                if close <= snap.exit_lower {
                    decision.with_exit(ExitReason::BandReversion)
                } else if close >= position.preview_short_stop(trail) {
                    decision.with_exit(ExitReason::StopHit)
                } else {
                    decision
                }
            }
        }
    }
}
