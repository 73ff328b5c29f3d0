//! Strategy engine: the per-bar evaluation loop.
//!
//! Each bar runs through the same steps:
//!
//! 1. Update the rolling series
//! 2. Until the series is initialized: skip, emit nothing
//! 3. Compute the policy snapshot; missing history or a degenerate indicator
//!    skips the bar, emitting nothing
//! 4. Emit `CancelAll`
//! 5. Evaluate the policy against the current position
//! 6. Emit the orders of at most one position transition
//! 7. Apply the decision to the position (ratchet the trail, then transition)
//!
//! Fills are assumed at the bar's close: the position is updated before the
//! next bar arrives.

pub mod sink;

pub use sink::{ExecutionSink, NullSink};

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::domain::{Bar, TradingInstruction};
use crate::error::{ConfigError, IndicatorError};
use crate::indicators::IndicatorSet;
use crate::policy::{Action, Decision, ExitReason, SignalPolicy};
use crate::position::{PositionState, PositionSummary};
use crate::series::RollingSeries;

/// Why a bar produced no instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    WarmingUp,
    InsufficientHistory { required: usize, available: usize },
    DegenerateIndicator { indicator: &'static str },
}

impl From<IndicatorError> for SkipReason {
    fn from(err: IndicatorError) -> Self {
        match err {
            IndicatorError::InsufficientHistory {
                required,
                available,
            } => SkipReason::InsufficientHistory {
                required,
                available,
            },
            IndicatorError::DegenerateIndicator { indicator } => {
                SkipReason::DegenerateIndicator { indicator }
            }
        }
    }
}

/// Result of one `on_bar` call.
#[derive(Debug, Clone, PartialEq)]
pub enum BarOutcome<S> {
    Skipped(SkipReason),
    Evaluated {
        snapshot: S,
        /// `CancelAll` followed by the orders of at most one transition.
        instructions: Vec<TradingInstruction>,
        exit_reason: Option<ExitReason>,
    },
}

impl<S> BarOutcome<S> {
    pub fn instructions(&self) -> &[TradingInstruction] {
        match self {
            BarOutcome::Skipped(_) => &[],
            BarOutcome::Evaluated { instructions, .. } => instructions,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, BarOutcome::Skipped(_))
    }
}

/// Counters for a `run`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RunSummary {
    pub bars: usize,
    pub skipped: usize,
    pub evaluated: usize,
    pub orders: usize,
    pub entries: usize,
    pub exits: usize,
    pub reversals: usize,
    pub final_position: Option<PositionSummary>,
}

impl RunSummary {
    /// Count one bar's outcome.
    pub fn record<S>(&mut self, outcome: &BarOutcome<S>) {
        self.bars += 1;
        let instructions = match outcome {
            BarOutcome::Skipped(_) => {
                self.skipped += 1;
                return;
            }
            BarOutcome::Evaluated { instructions, .. } => instructions,
        };
        self.evaluated += 1;

        let orders: Vec<_> = instructions.iter().filter(|i| i.is_order()).collect();
        self.orders += orders.len();
        match orders.as_slice() {
            [] => {}
            [TradingInstruction::Buy { .. } | TradingInstruction::Short { .. }] => self.entries += 1,
            [_] => self.exits += 1,
            _ => self.reversals += 1,
        }
    }
}

/// One policy driving one instrument.
#[derive(Debug, Clone)]
pub struct StrategyEngine<P: SignalPolicy> {
    policy: P,
    series: RollingSeries,
    position: PositionState,
}

impl<P: SignalPolicy> StrategyEngine<P> {
    /// Fails if the policy's history cannot hold its own warm-up.
    pub fn new(policy: P) -> Result<Self, ConfigError> {
        let series = RollingSeries::new(policy.history_size(), policy.warmup_bars())?;
        Ok(Self {
            policy,
            series,
            position: PositionState::flat(),
        })
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn series(&self) -> &RollingSeries {
        &self.series
    }

    /// Authoritative open exposure after the last processed bar.
    pub fn position(&self) -> &PositionState {
        &self.position
    }

    pub fn warmup_bars(&self) -> usize {
        self.policy.warmup_bars()
    }

    pub fn is_initialized(&self) -> bool {
        self.series.is_initialized()
    }

    /// Load historical bars without evaluating the policy.
    pub fn warm_up(&mut self, bars: &[Bar]) {
        for bar in bars {
            self.ingest(bar);
        }
        debug!(
            strategy = self.policy.name(),
            bars = bars.len(),
            initialized = self.is_initialized(),
            "warm-up loaded"
        );
    }

    /// Process one bar.
    pub fn on_bar(&mut self, bar: &Bar) -> BarOutcome<P::Snapshot> {
        self.ingest(bar);

        if !self.series.is_initialized() {
            trace!(
                strategy = self.policy.name(),
                received = self.series.count(),
                required = self.series.required_warmup(),
                "warming up"
            );
            return BarOutcome::Skipped(SkipReason::WarmingUp);
        }

        let snapshot = match self.policy.snapshot(&IndicatorSet::new(&self.series)) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                trace!(strategy = self.policy.name(), datetime = %bar.datetime, %err, "bar skipped");
                return BarOutcome::Skipped(err.into());
            }
        };

        let decision = self.policy.evaluate(&snapshot, &self.position);

        let mut instructions = vec![TradingInstruction::CancelAll];
        self.apply(&decision, bar.close, &mut instructions);

        for instruction in instructions.iter().filter(|i| i.is_order()) {
            debug!(
                strategy = self.policy.name(),
                datetime = %bar.datetime,
                %instruction,
                exit_reason = decision.exit_reason().map(tracing::field::display),
                "instruction"
            );
        }

        BarOutcome::Evaluated {
            snapshot,
            instructions,
            exit_reason: decision.exit_reason(),
        }
    }

    /// Feed `bars` in order, delivering every instruction to `sink`.
    pub fn run<S: ExecutionSink>(&mut self, bars: &[Bar], sink: &mut S) -> RunSummary {
        let mut summary = RunSummary::default();

        for bar in bars {
            let outcome = self.on_bar(bar);
            summary.record(&outcome);
            for instruction in outcome.instructions() {
                sink.submit(instruction);
            }
        }

        summary.final_position = Some(self.position.summary());
        summary
    }

    fn ingest(&mut self, bar: &Bar) {
        let was_initialized = self.series.is_initialized();
        self.series.update(bar);
        if !was_initialized && self.series.is_initialized() {
            info!(
                strategy = self.policy.name(),
                bars = self.series.count(),
                datetime = %bar.datetime,
                "strategy initialized"
            );
        }
    }

    /// Ratchet the held side's trail, then perform the transition, pushing
    /// its orders onto `out`.
    fn apply(&mut self, decision: &Decision, close: f64, out: &mut Vec<TradingInstruction>) {
        if let (Some(trail), Some(side)) = (decision.trailing_stop, self.position.side()) {
            self.position.tighten(side, trail);
        }

        let size = self.policy.fixed_size();
        match decision.action {
            Action::Hold => {}
            Action::Enter { side, stop } => {
                if let Some(held) = self.position.side() {
                    // Enter is only meaningful from flat; treat it as a reversal.
                    out.push(TradingInstruction::close(held, close, self.position.volume()));
                }
                out.push(TradingInstruction::open(side, close, size));
                self.position.open(side, size, stop);
            }
            Action::Exit { .. } => {
                if let Some(held) = self.position.side() {
                    out.push(TradingInstruction::close(held, close, self.position.volume()));
                    self.position.close();
                }
            }
            Action::Reverse { side, stop } => {
                if let Some(held) = self.position.side().filter(|&h| h != side) {
                    out.push(TradingInstruction::close(held, close, self.position.volume()));
                }
                out.push(TradingInstruction::open(side, close, size));
                self.position.open(side, size, stop);
            }
        }
    }
}
