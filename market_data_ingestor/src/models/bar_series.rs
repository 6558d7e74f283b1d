//! A collection of time-series bars for a specific symbol and timeframe.

use crate::models::{bar::Bar, timeframe::TimeFrame};

/// Represents a complete set of time-series data for a single symbol.
///
/// This struct groups a vector of [`Bar`]s with their corresponding symbol
/// and [`TimeFrame`], making the data set self-describing. Bars are in
/// chronological order with no duplicate timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    /// The symbol this data represents (e.g., "AAPL").
    pub symbol: String,
    /// The time interval for each bar in the series.
    pub timeframe: TimeFrame,
    /// The collection of OHLCV bars.
    pub bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(symbol: impl Into<String>, timeframe: TimeFrame, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Most recent bar, if any.
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Closing prices in bar order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Drops bars with missing (non-finite) prices. Returns how many were removed.
    pub fn retain_complete(&mut self) -> usize {
        let before = self.bars.len();
        self.bars.retain(Bar::is_complete);
        before - self.bars.len()
    }
}
