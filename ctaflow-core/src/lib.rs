//! ctaflow core: bar-driven strategy engine.
//!
//! This crate contains everything between a stream of price bars and the
//! trading instructions a strategy issues:
//! - Domain types (bars, instructions, sides)
//! - Rolling price history with warm-up tracking
//! - On-demand indicators (SMA, population std, Wilder ATR, rolling extrema)
//! - Position state with the stop ratchet invariant
//! - Signal policies (trend following, mean reversion, limit-aware breakout)
//! - The per-bar engine loop and its execution seam
//! - Settings, layered config loading and fingerprinting

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod factory;
pub mod fingerprint;
pub mod indicators;
pub mod policy;
pub mod position;
pub mod series;
pub mod synthetic;

pub use config::{StrategyKind, StrategySetting};
pub use domain::{Bar, Side, TradingInstruction};
pub use engine::{BarOutcome, ExecutionSink, RunSummary, SkipReason, StrategyEngine};
pub use error::{ConfigError, IndicatorError};
pub use factory::AnyEngine;
