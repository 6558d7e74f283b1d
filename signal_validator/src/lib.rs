//! Multi-timeframe signal validation.
//!
//! Given a ticker, a candidate [`Direction`] and a reference moment, the
//! crate answers three questions:
//! - does MACD on each timeframe agree with the direction, with a fresh
//!   enough crossover on the primary timeframe ([`diagnostic`])?
//! - are price, SMA(20) and SMA(30) stacked in that direction ([`sma_alignment`])?
//! - how strong is the latest one-minute impulse ([`scorer`])?
//!
//! Every evaluation fails closed: errors become a negative verdict or a
//! failure string and are reported through `tracing`, never returned to the
//! caller of the boolean/string entry points.

#![warn(missing_docs)]

pub mod candle;
pub mod config;
pub mod crossover;
pub mod diagnostic;
pub mod direction;
pub mod error;
pub mod indicators;
pub mod report;
pub mod scorer;
pub mod series;
pub mod sma_alignment;
pub mod tz;
pub mod validator;

pub use config::ValidatorConfig;
pub use direction::Direction;
pub use error::SignalError;
pub use validator::SignalValidator;
