//! Canonical in-memory representation of a time-series bar (OHLCV).
//!
//! This struct is used as the standard output for all
//! [`DataProvider`](crate::providers::DataProvider) implementations, regardless of asset class.

use chrono::{DateTime, Utc};

/// A single time-series bar (OHLCV) for a given timestamp.
///
/// `high >= max(open, close)` and `low <= min(open, close)` are expected to
/// hold but are not enforced here; providers deliver what the vendor reports.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// The timestamp for this bar (UTC, start of the bar interval).
    pub timestamp: DateTime<Utc>,

    /// Opening price.
    pub open: f64,

    /// Highest price during the bar interval.
    pub high: f64,

    /// Lowest price during the bar interval.
    pub low: f64,

    /// Closing price.
    pub close: f64,

    /// Volume traded during the bar interval.
    pub volume: f64,

    /// Trade count for the bar. Not all providers supply this.
    pub trade_count: Option<u64>,

    /// Volume-weighted average price. Not all providers supply this.
    pub vwap: Option<f64>,
}

impl Bar {
    /// Builds a bar with only the price fields set.
    pub fn ohlc(timestamp: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume: 0.0,
            trade_count: None,
            vwap: None,
        }
    }

    /// True when every price field is a finite number.
    ///
    /// Bars failing this check are treated as rows with missing values.
    pub fn is_complete(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Absolute size of the open/close body.
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// High minus low.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}
