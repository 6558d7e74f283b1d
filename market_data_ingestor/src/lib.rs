//! Market data access for the signal validation workspace.
//!
//! [`models`] holds the vendor-agnostic bar types, [`providers`] the
//! [`DataProvider`](providers::DataProvider) / [`ClockProvider`](providers::ClockProvider)
//! traits and the Alpaca REST implementation.

pub mod models;
pub mod providers;
