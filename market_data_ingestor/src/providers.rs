//! Provider abstraction for market data sources.
//!
//! This module defines the [`DataProvider`] trait, a unified interface for
//! fetching time-series bar data from any market data vendor, and the
//! [`ClockProvider`] trait for the vendor's authenticated market clock.
//!
//! Each concrete provider (currently only [`alpaca_rest`]) implements these
//! traits and handles vendor-specific API logic and validation. Both traits
//! are object safe, so callers can pick a provider at runtime behind
//! `Box<dyn DataProvider>`.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use market_data_ingestor::models::{
//!     bar_series::BarSeries,
//!     request_params::BarsRequestParams,
//! };
//! use market_data_ingestor::providers::{DataProvider, ProviderError};
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl DataProvider for MyProvider {
//!     async fn fetch_bars(
//!         &self,
//!         _params: BarsRequestParams,
//!     ) -> Result<Vec<BarSeries>, ProviderError> {
//!         Ok(vec![])
//!     }
//! }
//! ```

pub mod alpaca_rest;

use async_trait::async_trait;
use shared_utils::env::MissingEnvVarError;
use snafu::{Backtrace, Snafu};

use crate::models::{bar_series::BarSeries, clock::MarketClock, request_params::BarsRequestParams};

/// Trait for fetching time-series bar data from a market data provider.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Fetches time-series bar data for the given request parameters.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<BarSeries>)` - One series per symbol that had data, bars in ascending time order.
    /// * `Err(ProviderError)` - Transport, API or decoding failure.
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError>;

    /// Fetches the series of the first requested symbol.
    ///
    /// Vendors omit symbols without bars in the window, so a missing symbol
    /// comes back as an empty series rather than an error.
    async fn fetch_series(&self, params: BarsRequestParams) -> Result<BarSeries, ProviderError> {
        let symbol = match params.symbols.first() {
            Some(s) => s.clone(),
            None => {
                return ValidationSnafu {
                    message: "bars request names no symbol",
                }
                .fail();
            }
        };
        let timeframe = params.timeframe;
        let all = self.fetch_bars(params).await?;
        Ok(all
            .into_iter()
            .find(|s| s.symbol == symbol)
            .unwrap_or_else(|| BarSeries::new(symbol, timeframe, Vec::new())))
    }
}

/// Trait for reading the provider's market clock.
#[async_trait]
pub trait ClockProvider: Send + Sync {
    async fn clock(&self) -> Result<MarketClock, ProviderError>;
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// missed environment variable.
    #[snafu(display("Missing environment variable: {source}"))]
    MissingEnvVar {
        source: MissingEnvVarError,
        backtrace: Backtrace,
    },

    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// API key contains invalid characters.
    #[snafu(display("Invalid API key format: {source}"))]
    InvalidApiKey {
        source: reqwest::header::InvalidHeaderValue,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a `DataProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider's API answered with a non-success status.
    #[snafu(display("API error ({status}): {message}"))]
    Api {
        status: u16,
        message: String,
        backtrace: Backtrace,
    },

    /// The response body did not match the expected shape.
    #[snafu(display("Failed to decode provider response: {source}"))]
    Decode {
        source: serde_json::Error,
        backtrace: Backtrace,
    },

    /// The request parameters were invalid for this specific provider.
    #[snafu(display("Invalid parameters for provider: {message}"))]
    Validation {
        message: String,
        backtrace: Backtrace,
    },

    /// An internal error occurred while processing data within the provider.
    #[snafu(display("Internal provider error: {message}"))]
    Internal {
        message: String,
        backtrace: Backtrace,
    },

    /// An error during provider configuration or initialization.
    #[snafu(display("Provider initialization error: {source}"))]
    Init {
        #[snafu(backtrace)]
        source: ProviderInitError,
    },
}
