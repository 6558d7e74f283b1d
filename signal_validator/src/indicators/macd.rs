use serde::{Deserialize, Serialize};

use super::ema::{Ema, ema};

/// EMA spans of the MACD line and its signal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct MacdSettings {
    /// Fast EMA span.
    pub fast: usize,
    /// Slow EMA span.
    pub slow: usize,
    /// Span of the EMA applied to the MACD line.
    pub signal: usize,
}

impl Default for MacdSettings {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

impl MacdSettings {
    /// Index of the first position where both line and signal are defined.
    pub fn warm_up(&self) -> usize {
        self.fast.max(self.slow) + self.signal - 2
    }
}

/// MACD line and signal line at one position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdPoint {
    /// Fast EMA minus slow EMA.
    pub line: f64,
    /// EMA of the line.
    pub signal: f64,
}

impl MacdPoint {
    /// Absolute gap between line and signal.
    pub fn impulse(&self) -> f64 {
        (self.line - self.signal).abs()
    }
}

/// MACD over closing prices; `None` until both line and signal are warm.
///
/// With the default 12/26/9 spans the first defined position is index 33.
pub fn macd(closes: &[f64], settings: MacdSettings) -> Vec<Option<MacdPoint>> {
    let mut fast = Ema::new(settings.fast);
    let mut slow = Ema::new(settings.slow);
    let line: Vec<Option<f64>> = closes
        .iter()
        .map(|&c| match (fast.update(c), slow.update(c)) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    let signal = ema(&line, settings.signal);
    line.into_iter()
        .zip(signal)
        .map(|(l, s)| Some(MacdPoint { line: l?, signal: s? }))
        .collect()
}
