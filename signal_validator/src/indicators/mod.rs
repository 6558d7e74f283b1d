//! Indicator kernels over closing prices.
//!
//! Outputs are aligned index-for-index with the input; warm-up positions are
//! `None`. Semantics follow pandas (`rolling(n).mean()`,
//! `ewm(span=n, adjust=False, min_periods=n).mean()`), which is what the
//! thresholds in this crate were tuned against.

pub mod ema;
pub mod macd;
pub mod sma;

pub use ema::{Ema, ema};
pub use macd::{MacdPoint, MacdSettings, macd};
pub use sma::sma;

/// Value at the last position, if defined.
pub fn latest<T: Copy>(values: &[Option<T>]) -> Option<T> {
    values.last().copied().flatten()
}
