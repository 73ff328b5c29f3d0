//! Signal policies: turn an indicator snapshot and the current position into
//! one decision per bar.
//!
//! Policies are pure: `evaluate` reads the snapshot and the position and
//! returns a `Decision`. The engine owns the position and applies the
//! decision afterwards, so a policy never mutates state and evaluating the
//! same inputs twice always gives the same answer.

pub mod breakout;
pub mod mean_reversion;
pub mod trend;

pub use breakout::LimitAwareBreakout;
pub use mean_reversion::MeanReversion;
pub use trend::TrendFollowing;

use serde::Serialize;
use std::fmt;

use crate::domain::Side;
use crate::error::IndicatorError;
use crate::indicators::{IndicatorSet, IndicatorSnapshot};
use crate::position::PositionState;

/// Why an open position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// Close crossed the ratcheted stop.
    StopHit,
    /// Close re-crossed the inner Bollinger band.
    BandReversion,
    /// Close fell below the fast moving average.
    BelowFastAverage,
    /// Fast average fell below the slow one.
    TrendReversal,
    /// Close fell to the pre-breakout range low.
    SupportBreak,
    /// Close is near the daily lower price limit.
    LimitDownRisk,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExitReason::StopHit => "stop_hit",
            ExitReason::BandReversion => "band_reversion",
            ExitReason::BelowFastAverage => "below_fast_average",
            ExitReason::TrendReversal => "trend_reversal",
            ExitReason::SupportBreak => "support_break",
            ExitReason::LimitDownRisk => "limit_down_risk",
        };
        f.write_str(label)
    }
}

/// The single position transition chosen for a bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// No transition.
    Hold,
    /// Open a position from flat with an initial stop.
    Enter { side: Side, stop: f64 },
    /// Close the held position.
    Exit { reason: ExitReason },
    /// Close the held position and open the opposite one on the same bar.
    Reverse { side: Side, stop: f64 },
}

/// Outcome of evaluating one bar.
///
/// `trailing_stop` is the raw trail proposed for the held side; the engine
/// ratchets it into the position before applying `action`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub action: Action,
    pub trailing_stop: Option<f64>,
}

impl Decision {
    pub fn hold() -> Self {
        Self {
            action: Action::Hold,
            trailing_stop: None,
        }
    }

    pub fn enter(side: Side, stop: f64) -> Self {
        Self {
            action: Action::Enter { side, stop },
            trailing_stop: None,
        }
    }

    pub fn reverse(side: Side, stop: f64) -> Self {
        Self {
            action: Action::Reverse { side, stop },
            trailing_stop: None,
        }
    }

    /// Keep the position, ratcheting its stop toward `trail`.
    pub fn trail(trail: f64) -> Self {
        Self {
            action: Action::Hold,
            trailing_stop: Some(trail),
        }
    }

    /// Replace the action, keeping any trail proposal.
    pub fn with_exit(self, reason: ExitReason) -> Self {
        Self {
            action: Action::Exit { reason },
            ..self
        }
    }

    pub fn exit_reason(&self) -> Option<ExitReason> {
        match self.action {
            Action::Exit { reason } => Some(reason),
            _ => None,
        }
    }
}

/// A trading rule set evaluated once per bar.
///
/// # Architecture invariant
/// `evaluate` never mutates. Everything a policy knows about the market comes
/// from its snapshot; everything it knows about the book comes from the
/// `PositionState` it is handed.
pub trait SignalPolicy: Send + Sync {
    type Snapshot: Copy + fmt::Debug + Into<IndicatorSnapshot>;

    /// Human-readable name (e.g., "trend_following").
    fn name(&self) -> &str;

    /// Bars the series must have received before the policy is evaluated.
    fn warmup_bars(&self) -> usize;

    /// Bars the series must retain.
    fn history_size(&self) -> usize;

    /// Order size for new positions.
    fn fixed_size(&self) -> u32;

    /// Compute this bar's indicator inputs.
    fn snapshot(&self, indicators: &IndicatorSet<'_>) -> Result<Self::Snapshot, IndicatorError>;

    /// Decide this bar's transition.
    fn evaluate(&self, snapshot: &Self::Snapshot, position: &PositionState) -> Decision;
}
