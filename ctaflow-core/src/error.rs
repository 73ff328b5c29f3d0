//! Error types for the strategy engine.
//!
//! Two families with very different lifetimes:
//! - `ConfigError` is raised at construction time and is the only error a
//!   caller ever has to handle.
//! - `IndicatorError` describes why a bar could not be evaluated. The engine
//!   turns it into a `SkipReason`; it never escapes `on_bar`.

use std::path::PathBuf;
use thiserror::Error;

/// Invalid strategy configuration, rejected before any bar is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("window `{name}` must be positive, got {value}")]
    InvalidWindow { name: &'static str, value: usize },

    #[error("multiplier `{name}` must be positive and finite, got {value}")]
    InvalidMultiplier { name: &'static str, value: f64 },

    #[error("`{name}` must lie in {range}, got {value}")]
    OutOfRange {
        name: &'static str,
        range: &'static str,
        value: f64,
    },

    #[error("fixed_size must be positive")]
    ZeroSize,

    #[error("history_size {history_size} cannot hold the {warmup} bars required for warm-up")]
    HistoryTooShort { history_size: usize, warmup: usize },

    #[error("unknown strategy `{0}` (expected trend_following, mean_reversion or limit_breakout)")]
    UnknownStrategy(String),

    #[error("invalid parameter override `{0}` (expected key=value)")]
    InvalidOverride(String),

    #[error("config file {} must contain a table of parameters", path.display())]
    NotAnObject { path: PathBuf },

    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid parameters: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to render TOML: {0}")]
    TomlRender(#[from] toml::ser::Error),
}

/// Why an indicator could not be produced for the current bar.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    #[error("insufficient history: need {required} bars, have {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("degenerate indicator `{indicator}`")]
    DegenerateIndicator { indicator: &'static str },
}
