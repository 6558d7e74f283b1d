use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    models::{asset::AssetClass, timeframe::TimeFrame},
    providers::alpaca_rest::params::AlpacaBarsParams,
};

/// Universal parameters for requesting time-series bar data from any market data provider.
///
/// This struct is vendor-agnostic and is the standard input for all
/// [`DataProvider`](crate::providers::DataProvider) implementations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BarsRequestParams {
    /// List of symbols to request (e.g., `["AAPL"]`).
    pub symbols: Vec<String>,

    /// The time interval for each bar (e.g., 1 minute, 15 minutes).
    ///
    /// **Validation of allowed values is performed by each data provider
    /// implementation, according to their own API rules.**
    pub timeframe: TimeFrame,

    /// Start of the requested time range (inclusive, UTC).
    pub start: DateTime<Utc>,

    /// End of the requested time range (exclusive, UTC).
    ///
    /// Providers should return bars strictly before this timestamp.
    pub end: DateTime<Utc>,

    /// The asset class for the requested symbols.
    #[serde(default)]
    pub asset_class: AssetClass,

    /// Optional, provider-specific parameters.
    #[serde(default)]
    pub provider_specific: ProviderParams,
}

impl BarsRequestParams {
    /// Request for one US equity symbol with provider defaults.
    pub fn single(
        symbol: impl Into<String>,
        timeframe: TimeFrame,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            symbols: vec![symbol.into()],
            timeframe,
            start,
            end,
            asset_class: AssetClass::UsEquity,
            provider_specific: ProviderParams::None,
        }
    }

    pub fn with_provider_params(mut self, params: ProviderParams) -> Self {
        self.provider_specific = params;
        self
    }
}

/// Provider-specific request parameters.
///
/// This allows callers to specify detailed, per-request options for a
/// particular provider without cluttering the universal `BarsRequestParams`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub enum ProviderParams {
    #[default]
    None,
    Alpaca(AlpacaBarsParams),
}
