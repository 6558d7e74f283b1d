//! Price versus fast and slow simple moving averages.

use market_data_ingestor::models::bar_series::BarSeries;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    direction::Direction,
    error::SignalError,
    indicators::{latest, sma},
};

/// Fast and slow SMA windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmaWindows {
    /// Fast window.
    pub fast: usize,
    /// Slow window.
    pub slow: usize,
}

impl Default for SmaWindows {
    fn default() -> Self {
        Self { fast: 20, slow: 30 }
    }
}

/// Latest price and averages with the alignment verdict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmaAlignment {
    /// Latest close.
    pub price: f64,
    /// Latest fast SMA.
    pub fast: f64,
    /// Latest slow SMA.
    pub slow: f64,
    /// Price beyond both averages and fast beyond slow, in the direction asked.
    pub aligned: bool,
}

/// Checks that price, fast SMA and slow SMA are stacked in `direction`.
///
/// CALL needs `price > fast`, `price > slow` and `fast > slow`; PUT the mirror.
pub fn check_sma_alignment(
    series: &BarSeries,
    direction: Direction,
    windows: SmaWindows,
) -> Result<SmaAlignment, SignalError> {
    let closes = series.closes();
    let price = closes
        .last()
        .copied()
        .ok_or_else(|| SignalError::insufficient("bars", windows.slow, 0))?;
    let (Some(fast), Some(slow)) = (
        latest(&sma(&closes, windows.fast)),
        latest(&sma(&closes, windows.slow)),
    ) else {
        return Err(SignalError::insufficient(
            "bars",
            windows.fast.max(windows.slow),
            closes.len(),
        ));
    };
    if !(price.is_finite() && fast.is_finite() && slow.is_finite()) {
        return Err(SignalError::Computation(format!(
            "non-finite SMA inputs: price {price}, fast {fast}, slow {slow}"
        )));
    }

    let aligned = direction.confirms(price, fast)
        && direction.confirms(price, slow)
        && direction.confirms(fast, slow);
    Ok(SmaAlignment {
        price,
        fast,
        slow,
        aligned,
    })
}

/// Boolean form with the default 20/30 windows. Any failure is `false`.
pub fn validate_sma_alignment(series: &BarSeries, direction: Direction, label: &str) -> bool {
    validate_sma_alignment_with(series, direction, label, SmaWindows::default())
}

/// Boolean form with explicit windows. Logs the breakdown.
pub fn validate_sma_alignment_with(
    series: &BarSeries,
    direction: Direction,
    label: &str,
    windows: SmaWindows,
) -> bool {
    match check_sma_alignment(series, direction, windows) {
        Ok(a) => {
            info!(
                timeframe = label,
                %direction,
                price = a.price,
                sma_fast = a.fast,
                sma_slow = a.slow,
                "SMA {}",
                if a.aligned { "aligned" } else { "not aligned" }
            );
            a.aligned
        }
        Err(SignalError::InsufficientData { needed, got, .. }) => {
            warn!(timeframe = label, needed, got, "SMA omitted, not enough history");
            false
        }
        Err(e) => {
            warn!(timeframe = label, error = %e, kind = e.kind(), "SMA check failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use market_data_ingestor::models::{bar::Bar, timeframe::TimeFrame};

    fn series(closes: &[f64]) -> BarSeries {
        let t0 = Utc.with_ymd_and_hms(2025, 3, 3, 14, 30, 0).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::ohlc(t0 + Duration::minutes(5 * i as i64), c, c, c, c))
            .collect();
        BarSeries::new("TEST", TimeFrame::minutes(5).unwrap(), bars)
    }

    fn call_alignment(closes: &[f64]) -> SmaAlignment {
        check_sma_alignment(&series(closes), Direction::Call, SmaWindows::default()).unwrap()
    }

    fn rising(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn rising_prices_align_call_only() {
        let s = series(&rising(30));
        let a = check_sma_alignment(&s, Direction::Call, SmaWindows::default()).unwrap();
        // closes 100..=129: SMA20 = 119.5, SMA30 = 114.5
        assert_eq!(a.price, 129.0);
        assert!((a.fast - 119.5).abs() < 1e-9);
        assert!((a.slow - 114.5).abs() < 1e-9);
        assert!(a.aligned);
        assert!(validate_sma_alignment(&s, Direction::Call, "5Min"));
        assert!(!validate_sma_alignment(&s, Direction::Put, "5Min"));
    }

    #[test]
    fn falling_prices_align_put() {
        let mut closes = rising(30);
        closes.reverse();
        assert!(validate_sma_alignment(&series(&closes), Direction::Put, "5Min"));
    }

    #[test]
    fn price_below_fast_breaks_call() {
        // Uptrend then a last close between SMA30 and SMA20.
        let mut closes = rising(30);
        closes[29] = 116.0;
        let a = call_alignment(&closes);
        assert!(a.price < a.fast && a.price > a.slow && a.fast > a.slow);
        assert!(!a.aligned);
    }

    #[test]
    fn price_below_slow_breaks_call() {
        // Fast above slow and price under both is not aligned.
        let mut closes = rising(30);
        closes[29] = 105.0;
        let a = call_alignment(&closes);
        assert!(a.price < a.slow && a.fast > a.slow);
        assert!(!a.aligned);
    }

    #[test]
    fn fast_below_slow_breaks_call() {
        // Long decline then a spike: price tops both averages but fast < slow.
        let mut closes: Vec<f64> = (0..30).map(|i| 200.0 - i as f64).collect();
        closes[29] = 300.0;
        let a = call_alignment(&closes);
        assert!(a.price > a.fast && a.price > a.slow);
        assert!(a.fast < a.slow);
        assert!(!a.aligned);
    }

    #[test]
    fn short_history_is_false_not_panic() {
        let s = series(&rising(29));
        assert!(matches!(
            check_sma_alignment(&s, Direction::Call, SmaWindows::default()),
            Err(SignalError::InsufficientData { needed: 30, got: 29, .. })
        ));
        assert!(!validate_sma_alignment(&s, Direction::Call, "15Min"));
        assert!(!validate_sma_alignment(&series(&[]), Direction::Put, "15Min"));
    }

    #[test]
    fn non_finite_close_is_false() {
        let mut closes = rising(30);
        closes[29] = f64::NAN;
        let s = series(&closes);
        assert!(matches!(
            check_sma_alignment(&s, Direction::Call, SmaWindows::default()),
            Err(SignalError::Computation(_))
        ));
        assert!(!validate_sma_alignment(&s, Direction::Call, "5Min"));
    }
}
