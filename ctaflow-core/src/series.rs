//! Rolling price history: fixed-capacity ring buffers of OHLCV values.
//!
//! Every indicator is computed from a `RollingSeries`. The buffer keeps the
//! last `capacity` bars; once full, each new bar evicts the oldest one.
//! `initialized` flips to true once `required_warmup` bars have been received
//! in total and stays true for the life of the series.

use std::collections::VecDeque;

use chrono::NaiveDateTime;

use crate::domain::Bar;
use crate::error::{ConfigError, IndicatorError};

/// Upper bound on the bars reserved up front. Larger histories grow on demand.
const PREALLOCATED_BARS: usize = 4096;

/// Which price column a window reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Open,
    High,
    Low,
    Close,
    Volume,
}

/// Whether a window ends at the current bar or at the bar before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inclusion {
    IncludeCurrent,
    ExcludeCurrent,
}

#[derive(Debug, Clone)]
pub struct RollingSeries {
    capacity: usize,
    required_warmup: usize,
    count: usize,
    initialized: bool,
    datetime: VecDeque<NaiveDateTime>,
    open: VecDeque<f64>,
    high: VecDeque<f64>,
    low: VecDeque<f64>,
    close: VecDeque<f64>,
    volume: VecDeque<f64>,
}

impl RollingSeries {
    /// Create an empty series.
    ///
    /// Fails if `capacity` is zero or cannot hold `required_warmup` bars,
    /// since such a series could never become initialized.
    pub fn new(capacity: usize, required_warmup: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::InvalidWindow {
                name: "history_size",
                value: capacity,
            });
        }
        if required_warmup > capacity {
            return Err(ConfigError::HistoryTooShort {
                history_size: capacity,
                warmup: required_warmup,
            });
        }
        let reserved = capacity.min(PREALLOCATED_BARS);
        Ok(Self {
            capacity,
            required_warmup,
            count: 0,
            initialized: false,
            datetime: VecDeque::with_capacity(reserved),
            open: VecDeque::with_capacity(reserved),
            high: VecDeque::with_capacity(reserved),
            low: VecDeque::with_capacity(reserved),
            close: VecDeque::with_capacity(reserved),
            volume: VecDeque::with_capacity(reserved),
        })
    }

    /// Append a bar, evicting the oldest one when the buffer is full.
    pub fn update(&mut self, bar: &Bar) {
        if self.close.len() == self.capacity {
            self.datetime.pop_front();
            self.open.pop_front();
            self.high.pop_front();
            self.low.pop_front();
            self.close.pop_front();
            self.volume.pop_front();
        }
        self.datetime.push_back(bar.datetime);
        self.open.push_back(bar.open);
        self.high.push_back(bar.high);
        self.low.push_back(bar.low);
        self.close.push_back(bar.close);
        self.volume.push_back(bar.volume);

        self.count += 1;
        if !self.initialized && self.count >= self.required_warmup {
            self.initialized = true;
        }
    }

    /// The most recent `length` values of `field`.
    ///
    /// With `ExcludeCurrent` the window ends at the previous bar, so
    /// `length + 1` bars must be retained. A zero-length window is never
    /// satisfiable.
    pub fn window(
        &self,
        field: Field,
        length: usize,
        inclusion: Inclusion,
    ) -> Result<Vec<f64>, IndicatorError> {
        let skip = match inclusion {
            Inclusion::IncludeCurrent => 0,
            Inclusion::ExcludeCurrent => 1,
        };
        let required = length.max(1).saturating_add(skip);
        let available = self.len();
        if length == 0 || available < required {
            return Err(IndicatorError::InsufficientHistory {
                required,
                available,
            });
        }
        let end = available - skip;
        Ok(self.column(field).range(end - length..end).copied().collect())
    }

    /// Every retained value of `field`, oldest first.
    pub fn values(&self, field: Field) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.column(field).iter().copied()
    }

    /// Value of `field` on the current bar.
    pub fn latest(&self, field: Field) -> Option<f64> {
        self.column(field).back().copied()
    }

    /// Value of `field` on the bar before the current one.
    pub fn previous(&self, field: Field) -> Option<f64> {
        let column = self.column(field);
        column.len().checked_sub(2).and_then(|i| column.get(i)).copied()
    }

    pub fn last_datetime(&self) -> Option<NaiveDateTime> {
        self.datetime.back().copied()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of bars currently retained (at most `capacity`).
    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total number of bars received since construction.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn required_warmup(&self) -> usize {
        self.required_warmup
    }

    fn column(&self, field: Field) -> &VecDeque<f64> {
        match field {
            Field::Open => &self.open,
            Field::High => &self.high,
            Field::Low => &self.low,
            Field::Close => &self.close,
            Field::Volume => &self.volume,
        }
    }
}
