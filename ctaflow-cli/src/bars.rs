//! CSV bar files: `datetime,open,high,low,close,volume`.
//!
//! Timestamps are accepted as `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`
//! or a bare `YYYY-MM-DD` (midnight). Rows must be sane OHLC and strictly
//! increasing in time; anything else is rejected with its row number.

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::Path;

use ctaflow_core::domain::Bar;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Serialize, Deserialize)]
struct CsvBar {
    datetime: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Load and validate a bar file.
pub fn load_bars(path: &Path) -> Result<Vec<Bar>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open bar file {}", path.display()))?;

    let mut bars: Vec<Bar> = Vec::new();
    for (i, record) in reader.deserialize::<CsvBar>().enumerate() {
        // header is line 1
        let line = i + 2;
        let row = record.with_context(|| format!("{}:{line}: malformed row", path.display()))?;
        let Some(datetime) = parse_datetime(&row.datetime) else {
            bail!("{}:{line}: unrecognized datetime `{}`", path.display(), row.datetime);
        };
        let bar = Bar {
            datetime,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        };
        if !bar.is_sane() {
            bail!("{}:{line}: inconsistent OHLCV values", path.display());
        }
        if let Some(prev) = bars.last() {
            if bar.datetime <= prev.datetime {
                bail!(
                    "{}:{line}: bar at {} is not after {}",
                    path.display(),
                    bar.datetime,
                    prev.datetime
                );
            }
        }
        bars.push(bar);
    }
    Ok(bars)
}

/// Write bars in the format `load_bars` reads.
pub fn write_bars(path: &Path, bars: &[Bar]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for bar in bars {
        writer.serialize(CsvBar {
            datetime: bar.datetime.format(DATETIME_FORMAT).to_string(),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Keep bars whose date falls within `[start, end]` (either bound optional).
pub fn filter_range(bars: Vec<Bar>, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Vec<Bar> {
    bars.into_iter()
        .filter(|b| start.map_or(true, |s| b.datetime.date() >= s))
        .filter(|b| end.map_or(true, |e| b.datetime.date() <= e))
        .collect()
}
