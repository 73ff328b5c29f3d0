//! Run fingerprinting: deterministic identification of strategy settings and
//! bar feeds.
//!
//! - `ConfigHash`: exact identity of a `StrategySetting` (kind + all params).
//! - `DatasetHash`: content hash of a bar sequence.
//! - `RunFingerprint`: both, plus the bar range, printed with each run.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

use crate::config::{StrategyKind, StrategySetting};
use crate::domain::Bar;
use crate::error::ConfigError;

/// BLAKE3 hex digest of a canonical settings serialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ConfigHash(pub String);

/// BLAKE3 hex digest of a bar sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DatasetHash(pub String);

impl ConfigHash {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }

    /// First 12 hex characters, for log lines.
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl DatasetHash {
    /// First 12 hex characters, for log lines.
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl fmt::Display for ConfigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl StrategySetting {
    /// Hash of the strategy kind and every parameter value.
    ///
    /// Struct fields serialize in declaration order, so the JSON (and the
    /// hash) is stable for a given build.
    pub fn fingerprint(&self) -> Result<ConfigHash, ConfigError> {
        let json = serde_json::to_vec(self)?;
        Ok(ConfigHash::from_bytes(&json))
    }
}

/// Hash each bar's fields in order. Equal feeds hash equally regardless of
/// where they were loaded from.
pub fn dataset_hash(bars: &[Bar]) -> DatasetHash {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(&bar.datetime.and_utc().timestamp().to_le_bytes());
        for v in [bar.open, bar.high, bar.low, bar.close, bar.volume] {
            hasher.update(&v.to_le_bytes());
        }
    }
    DatasetHash(hasher.finalize().to_hex().to_string())
}

/// Identity of one replay: which settings ran over which bars.
#[derive(Debug, Clone, Serialize)]
pub struct RunFingerprint {
    pub strategy: StrategyKind,
    pub config_hash: ConfigHash,
    pub dataset_hash: DatasetHash,
    pub bar_count: usize,
    pub first_bar: Option<NaiveDateTime>,
    pub last_bar: Option<NaiveDateTime>,
}

impl RunFingerprint {
    pub fn new(setting: &StrategySetting, bars: &[Bar]) -> Result<Self, ConfigError> {
        Ok(Self {
            strategy: setting.kind(),
            config_hash: setting.fingerprint()?,
            dataset_hash: dataset_hash(bars),
            bar_count: bars.len(),
            first_bar: bars.first().map(|b| b.datetime),
            last_bar: bars.last().map(|b| b.datetime),
        })
    }
}
