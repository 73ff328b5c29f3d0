//! Strategy settings: defaults, validation and layered loading.
//!
//! Settings are resolved in three layers, later layers winning:
//! 1. the documented defaults of the chosen strategy,
//! 2. an optional JSON or TOML file holding a flat table of parameters,
//! 3. `key=value` overrides (values cast to bool, integer, float, then string).
//!
//! Unknown keys are rejected. Every settings struct is validated before an
//! engine is built from it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::ConfigError;

/// Which policy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    TrendFollowing,
    MeanReversion,
    LimitBreakout,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::TrendFollowing,
        StrategyKind::MeanReversion,
        StrategyKind::LimitBreakout,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::TrendFollowing => "trend_following",
            StrategyKind::MeanReversion => "mean_reversion",
            StrategyKind::LimitBreakout => "limit_breakout",
        }
    }

    pub fn default_setting(&self) -> StrategySetting {
        match self {
            StrategyKind::TrendFollowing => StrategySetting::TrendFollowing(TrendSettings::default()),
            StrategyKind::MeanReversion => {
                StrategySetting::MeanReversion(MeanReversionSettings::default())
            }
            StrategyKind::LimitBreakout => StrategySetting::LimitBreakout(BreakoutSettings::default()),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = ConfigError;

    /// Accepts the canonical names and the short aliases
    /// `double_ma`, `bollinger` and `ashare_momentum`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trend_following" | "trend" | "double_ma" => Ok(StrategyKind::TrendFollowing),
            "mean_reversion" | "bollinger" | "bollinger_reversion" => Ok(StrategyKind::MeanReversion),
            "limit_breakout" | "breakout" | "ashare_momentum" => Ok(StrategyKind::LimitBreakout),
            _ => Err(ConfigError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Moving-average crossover with ATR trailing stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrendSettings {
    pub fast_window: usize,
    pub slow_window: usize,
    pub atr_window: usize,
    pub atr_multiplier: f64,
    pub fixed_size: u32,
    pub history_size: usize,
}

impl Default for TrendSettings {
    fn default() -> Self {
        Self {
            fast_window: 10,
            slow_window: 60,
            atr_window: 20,
            atr_multiplier: 2.0,
            fixed_size: 1,
            history_size: 100,
        }
    }
}

impl TrendSettings {
    pub fn warmup_bars(&self) -> usize {
        self.fast_window
            .max(self.slow_window)
            .saturating_add(self.atr_window)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_window("fast_window", self.fast_window)?;
        check_window("slow_window", self.slow_window)?;
        check_window("atr_window", self.atr_window)?;
        check_multiplier("atr_multiplier", self.atr_multiplier)?;
        check_size(self.fixed_size)?;
        check_history(self.history_size, self.warmup_bars())
    }
}

/// Bollinger band mean reversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeanReversionSettings {
    pub boll_window: usize,
    pub entry_dev: f64,
    /// Inner band width in standard deviations. Zero exits at the mean.
    pub exit_dev: f64,
    pub stop_multiplier: f64,
    pub fixed_size: u32,
    pub history_size: usize,
}

impl Default for MeanReversionSettings {
    fn default() -> Self {
        Self {
            boll_window: 20,
            entry_dev: 2.0,
            exit_dev: 0.8,
            stop_multiplier: 3.0,
            fixed_size: 1,
            history_size: 100,
        }
    }
}

impl MeanReversionSettings {
    pub fn warmup_bars(&self) -> usize {
        self.boll_window
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_window("boll_window", self.boll_window)?;
        check_multiplier("entry_dev", self.entry_dev)?;
        if !(self.exit_dev.is_finite() && self.exit_dev >= 0.0) {
            return Err(ConfigError::OutOfRange {
                name: "exit_dev",
                range: "[0, inf)",
                value: self.exit_dev,
            });
        }
        check_multiplier("stop_multiplier", self.stop_multiplier)?;
        check_size(self.fixed_size)?;
        check_history(self.history_size, self.warmup_bars())
    }
}

/// Long-only breakout aware of daily price limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BreakoutSettings {
    pub fast_window: usize,
    pub slow_window: usize,
    pub breakout_window: usize,
    pub atr_window: usize,
    pub atr_multiplier: f64,
    /// Daily price limit as a fraction of the previous close.
    pub limit_pct: f64,
    /// Distance from the limit, as a fraction of it, treated as "at the limit".
    pub limit_buffer: f64,
    pub fixed_size: u32,
    pub history_size: usize,
}

impl Default for BreakoutSettings {
    fn default() -> Self {
        Self {
            fast_window: 20,
            slow_window: 60,
            breakout_window: 30,
            atr_window: 14,
            atr_multiplier: 2.5,
            limit_pct: 0.095,
            limit_buffer: 0.002,
            fixed_size: 100,
            history_size: 200,
        }
    }
}

impl BreakoutSettings {
    pub fn warmup_bars(&self) -> usize {
        self.fast_window
            .max(self.slow_window)
            .max(self.breakout_window)
            .saturating_add(self.atr_window)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_window("fast_window", self.fast_window)?;
        check_window("slow_window", self.slow_window)?;
        check_window("breakout_window", self.breakout_window)?;
        check_window("atr_window", self.atr_window)?;
        check_multiplier("atr_multiplier", self.atr_multiplier)?;
        if !(self.limit_pct > 0.0 && self.limit_pct < 1.0) {
            return Err(ConfigError::OutOfRange {
                name: "limit_pct",
                range: "(0, 1)",
                value: self.limit_pct,
            });
        }
        if !(self.limit_buffer >= 0.0 && self.limit_buffer < 1.0) {
            return Err(ConfigError::OutOfRange {
                name: "limit_buffer",
                range: "[0, 1)",
                value: self.limit_buffer,
            });
        }
        check_size(self.fixed_size)?;
        check_history(self.history_size, self.warmup_bars())
    }
}

/// Resolved settings for one strategy instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum StrategySetting {
    TrendFollowing(TrendSettings),
    MeanReversion(MeanReversionSettings),
    LimitBreakout(BreakoutSettings),
}

impl StrategySetting {
    pub fn kind(&self) -> StrategyKind {
        match self {
            StrategySetting::TrendFollowing(_) => StrategyKind::TrendFollowing,
            StrategySetting::MeanReversion(_) => StrategyKind::MeanReversion,
            StrategySetting::LimitBreakout(_) => StrategyKind::LimitBreakout,
        }
    }

    pub fn warmup_bars(&self) -> usize {
        match self {
            StrategySetting::TrendFollowing(s) => s.warmup_bars(),
            StrategySetting::MeanReversion(s) => s.warmup_bars(),
            StrategySetting::LimitBreakout(s) => s.warmup_bars(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            StrategySetting::TrendFollowing(s) => s.validate(),
            StrategySetting::MeanReversion(s) => s.validate(),
            StrategySetting::LimitBreakout(s) => s.validate(),
        }
    }

    /// The parameters alone, as a flat JSON object.
    pub fn params(&self) -> Result<Value, ConfigError> {
        let value = match self {
            StrategySetting::TrendFollowing(s) => serde_json::to_value(s)?,
            StrategySetting::MeanReversion(s) => serde_json::to_value(s)?,
            StrategySetting::LimitBreakout(s) => serde_json::to_value(s)?,
        };
        Ok(value)
    }

    /// The parameters as a TOML table, suitable for a config file.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        let rendered = match self {
            StrategySetting::TrendFollowing(s) => toml::to_string_pretty(s)?,
            StrategySetting::MeanReversion(s) => toml::to_string_pretty(s)?,
            StrategySetting::LimitBreakout(s) => toml::to_string_pretty(s)?,
        };
        Ok(rendered)
    }

    /// Build a setting of `kind` from a flat parameter object, then validate.
    pub fn from_params(kind: StrategyKind, params: Value) -> Result<Self, ConfigError> {
        let setting = match kind {
            StrategyKind::TrendFollowing => {
                StrategySetting::TrendFollowing(serde_json::from_value(params)?)
            }
            StrategyKind::MeanReversion => {
                StrategySetting::MeanReversion(serde_json::from_value(params)?)
            }
            StrategyKind::LimitBreakout => {
                StrategySetting::LimitBreakout(serde_json::from_value(params)?)
            }
        };
        setting.validate()?;
        Ok(setting)
    }
}

/// Resolve the settings for `kind`: defaults, then `config_file`, then
/// `overrides` (each `key=value`).
pub fn build_setting(
    kind: StrategyKind,
    config_file: Option<&Path>,
    overrides: &[String],
) -> Result<StrategySetting, ConfigError> {
    let mut params = match kind.default_setting().params()? {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    if let Some(path) = config_file {
        params.extend(load_params_file(path)?);
    }

    for raw in overrides {
        let (key, value) = parse_override(raw)?;
        params.insert(key, value);
    }

    StrategySetting::from_params(kind, Value::Object(params))
}

/// Read a flat parameter table from a `.toml` file, or JSON otherwise.
pub fn load_params_file(path: &Path) -> Result<Map<String, Value>, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let value: Value = if is_toml {
        let table: toml::Table = toml::from_str(&text)?;
        serde_json::to_value(table)?
    } else {
        serde_json::from_str(&text)?
    };

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ConfigError::NotAnObject {
            path: path.to_path_buf(),
        }),
    }
}

/// Split `key=value` and cast the value.
pub fn parse_override(raw: &str) -> Result<(String, Value), ConfigError> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| ConfigError::InvalidOverride(raw.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ConfigError::InvalidOverride(raw.to_string()));
    }
    Ok((key.to_string(), cast_value(value.trim())))
}

/// bool, then integer, then float, then the raw string.
pub fn cast_value(raw: &str) -> Value {
    match raw.to_ascii_lowercase().as_str() {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::String(raw.to_string())
}

fn check_window(name: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidWindow { name, value });
    }
    Ok(())
}

fn check_multiplier(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ConfigError::InvalidMultiplier { name, value });
    }
    Ok(())
}

fn check_size(fixed_size: u32) -> Result<(), ConfigError> {
    if fixed_size == 0 {
        return Err(ConfigError::ZeroSize);
    }
    Ok(())
}

fn check_history(history_size: usize, warmup: usize) -> Result<(), ConfigError> {
    check_window("history_size", history_size)?;
    if history_size < warmup {
        return Err(ConfigError::HistoryTooShort {
            history_size,
            warmup,
        });
    }
    Ok(())
}
