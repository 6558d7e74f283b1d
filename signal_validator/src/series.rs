//! Bars localized to the working timezone with their derived indicators.

use chrono::DateTime;
use chrono_tz::Tz;
use market_data_ingestor::models::bar::Bar;

use crate::{
    indicators::{MacdSettings, macd, sma},
    sma_alignment::SmaWindows,
};

/// One bar position with every indicator defined at it.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    /// Bar timestamp in the working timezone.
    pub timestamp: DateTime<Tz>,
    /// Closing price.
    pub close: f64,
    /// Fast SMA, `None` while warming up.
    pub sma_fast: Option<f64>,
    /// Slow SMA, `None` while warming up.
    pub sma_slow: Option<f64>,
    /// MACD line.
    pub macd: f64,
    /// MACD signal line.
    pub signal: f64,
}

/// Indicator rows in bar order, starting at the first position where MACD
/// and its signal are both defined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSeries {
    rows: Vec<IndicatorRow>,
}

impl IndicatorSeries {
    /// Computes SMA and MACD over `bars` and drops the undefined leading rows.
    pub fn compute(bars: &[Bar], tz: Tz, windows: SmaWindows, settings: MacdSettings) -> Self {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let fast = sma(&closes, windows.fast);
        let slow = sma(&closes, windows.slow);
        let points = macd(&closes, settings);

        let rows = bars
            .iter()
            .zip(fast)
            .zip(slow)
            .zip(points)
            .filter_map(|(((bar, sma_fast), sma_slow), point)| {
                let point = point?;
                Some(IndicatorRow {
                    timestamp: bar.timestamp.with_timezone(&tz),
                    close: bar.close,
                    sma_fast,
                    sma_slow,
                    macd: point.line,
                    signal: point.signal,
                })
            })
            .collect();

        Self { rows }
    }

    /// Builds a series from precomputed rows.
    pub fn from_rows(rows: Vec<IndicatorRow>) -> Self {
        Self { rows }
    }

    /// All rows, oldest first.
    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    /// Most recent row.
    pub fn last(&self) -> Option<&IndicatorRow> {
        self.rows.last()
    }

    /// Number of defined rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no row survived the warm-up.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Timelike, Utc};
    use chrono_tz::America::New_York;

    fn bars(n: usize) -> Vec<Bar> {
        let t0 = Utc.with_ymd_and_hms(2025, 3, 3, 14, 30, 0).unwrap();
        (0..n)
            .map(|i| {
                let c = 100.0 + i as f64 * 0.25;
                Bar::ohlc(t0 + Duration::minutes(15 * i as i64), c, c + 1.0, c - 1.0, c)
            })
            .collect()
    }

    fn compute(bars: &[Bar]) -> IndicatorSeries {
        IndicatorSeries::compute(bars, New_York, SmaWindows::default(), MacdSettings::default())
    }

    #[test]
    fn rows_start_after_macd_warm_up() {
        let s = compute(&bars(40));
        assert_eq!(s.len(), 7);
        let first = &s.rows()[0];
        assert!(first.sma_fast.is_some() && first.sma_slow.is_some());
        // index 33 → 14:30Z + 495min = 22:45Z = 17:45 EST
        assert_eq!(first.timestamp.hour(), 17);
        assert_eq!(first.timestamp.minute(), 45);
    }

    #[test]
    fn short_input_is_empty() {
        let s = compute(&bars(33));
        assert!(s.is_empty());
        assert!(s.last().is_none());
    }
}
