//! Alpaca Market Data v2 REST provider.
//!
//! - [`provider::AlpacaProvider`]: authenticated client implementing
//!   [`DataProvider`](crate::providers::DataProvider) and
//!   [`ClockProvider`](crate::providers::ClockProvider).
//! - [`params`]: Alpaca-only request options and query-string construction.
//! - [`response`]: wire shapes of the bars and clock endpoints.
//! - [`verify`]: credential and data-access check.

pub mod params;
pub mod provider;
pub mod response;
pub mod verify;

pub use params::AlpacaBarsParams;
pub use provider::AlpacaProvider;
