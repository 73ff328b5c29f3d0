//! Runtime policy selection.
//!
//! `StrategyEngine<P>` is generic over its policy. `AnyEngine` wraps the three
//! concrete engines so a caller can pick one from a `StrategySetting` chosen
//! at runtime (e.g., from the command line).

use crate::config::{StrategyKind, StrategySetting};
use crate::domain::{Bar, TradingInstruction};
use crate::engine::{BarOutcome, ExecutionSink, RunSummary, StrategyEngine};
use crate::error::ConfigError;
use crate::indicators::IndicatorSnapshot;
use crate::policy::{LimitAwareBreakout, MeanReversion, SignalPolicy, TrendFollowing};
use crate::position::PositionState;

#[derive(Debug, Clone)]
pub enum AnyEngine {
    TrendFollowing(StrategyEngine<TrendFollowing>),
    MeanReversion(StrategyEngine<MeanReversion>),
    LimitBreakout(StrategyEngine<LimitAwareBreakout>),
}

/// Dispatch `$body` on the wrapped engine, bound as `$engine`.
macro_rules! dispatch {
    ($self:expr, $engine:ident => $body:expr) => {
        match $self {
            AnyEngine::TrendFollowing($engine) => $body,
            AnyEngine::MeanReversion($engine) => $body,
            AnyEngine::LimitBreakout($engine) => $body,
        }
    };
}

impl AnyEngine {
    /// Validate `setting` and build the matching engine.
    pub fn from_setting(setting: &StrategySetting) -> Result<Self, ConfigError> {
        setting.validate()?;
        Ok(match setting {
            StrategySetting::TrendFollowing(s) => {
                AnyEngine::TrendFollowing(StrategyEngine::new(TrendFollowing::new(s.clone()))?)
            }
            StrategySetting::MeanReversion(s) => {
                AnyEngine::MeanReversion(StrategyEngine::new(MeanReversion::new(s.clone()))?)
            }
            StrategySetting::LimitBreakout(s) => {
                AnyEngine::LimitBreakout(StrategyEngine::new(LimitAwareBreakout::new(s.clone()))?)
            }
        })
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            AnyEngine::TrendFollowing(_) => StrategyKind::TrendFollowing,
            AnyEngine::MeanReversion(_) => StrategyKind::MeanReversion,
            AnyEngine::LimitBreakout(_) => StrategyKind::LimitBreakout,
        }
    }

    pub fn name(&self) -> &str {
        dispatch!(self, e => e.policy().name())
    }

    pub fn warmup_bars(&self) -> usize {
        dispatch!(self, e => e.warmup_bars())
    }

    pub fn is_initialized(&self) -> bool {
        dispatch!(self, e => e.is_initialized())
    }

    pub fn position(&self) -> &PositionState {
        dispatch!(self, e => e.position())
    }

    pub fn warm_up(&mut self, bars: &[Bar]) {
        dispatch!(self, e => e.warm_up(bars))
    }

    pub fn run<S: ExecutionSink>(&mut self, bars: &[Bar], sink: &mut S) -> RunSummary {
        dispatch!(self, e => e.run(bars, sink))
    }

    /// Process one bar; the snapshot is widened to `IndicatorSnapshot`.
    pub fn on_bar(&mut self, bar: &Bar) -> BarOutcome<IndicatorSnapshot> {
        dispatch!(self, e => widen(e.on_bar(bar)))
    }
}

fn widen<S: Into<IndicatorSnapshot>>(outcome: BarOutcome<S>) -> BarOutcome<IndicatorSnapshot> {
    match outcome {
        BarOutcome::Skipped(reason) => BarOutcome::Skipped(reason),
        BarOutcome::Evaluated {
            snapshot,
            instructions,
            exit_reason,
        } => BarOutcome::Evaluated {
            snapshot: snapshot.into(),
            instructions,
            exit_reason,
        },
    }
}

/// Run `setting` over `bars` from a fresh engine, collecting every instruction.
pub fn replay(
    setting: &StrategySetting,
    bars: &[Bar],
) -> Result<(RunSummary, Vec<TradingInstruction>), ConfigError> {
    let mut engine = AnyEngine::from_setting(setting)?;
    let mut instructions = Vec::new();
    let summary = engine.run(bars, &mut instructions);
    Ok((summary, instructions))
}
