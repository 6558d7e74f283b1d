use async_trait::async_trait;
use indexmap::IndexMap;
use reqwest::{Client, header};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use shared_utils::env::{get_env_var, get_env_var_or};
use snafu::ResultExt;
use tracing::debug;

use crate::{
    models::{
        asset::AssetClass, bar_series::BarSeries, clock::MarketClock,
        request_params::BarsRequestParams,
    },
    providers::{
        ApiSnafu, ClientBuildSnafu, ClockProvider, DataProvider, DecodeSnafu, InvalidApiKeySnafu,
        MissingEnvVarSnafu, ProviderError, ProviderInitError, ReqwestSnafu, ValidationSnafu,
        alpaca_rest::{
            params::{construct_params, validate_timeframe},
            response::{AlpacaBar, AlpacaClock, AlpacaResponse},
        },
    },
};

pub const DATA_URL: &str = "https://data.alpaca.markets";
pub const PAPER_TRADING_URL: &str = "https://paper-api.alpaca.markets";

pub struct AlpacaProvider {
    client: Client,
    data_url: String,
    trading_url: String,
    _api_key: SecretString,
    _secret_key: SecretString,
}

impl AlpacaProvider {
    /// Creates a new Alpaca provider.
    ///
    /// Reads API keys from the `APCA_API_KEY_ID` and `APCA_API_SECRET_KEY`
    /// environment variables. `APCA_API_BASE_URL` (trading API, defaults to
    /// the paper endpoint) and `APCA_API_DATA_URL` override the hosts.
    pub fn new() -> Result<Self, ProviderInitError> {
        let api_key = SecretString::new(
            get_env_var("APCA_API_KEY_ID")
                .context(MissingEnvVarSnafu)?
                .into(),
        );
        let secret_key = SecretString::new(
            get_env_var("APCA_API_SECRET_KEY")
                .context(MissingEnvVarSnafu)?
                .into(),
        );

        Ok(Self::with_credentials(api_key, secret_key)?.with_urls(
            get_env_var_or("APCA_API_DATA_URL", DATA_URL),
            get_env_var_or("APCA_API_BASE_URL", PAPER_TRADING_URL),
        ))
    }

    /// Creates a provider from explicit credentials, using the default hosts.
    pub fn with_credentials(
        api_key: SecretString,
        secret_key: SecretString,
    ) -> Result<Self, ProviderInitError> {
        let mut key_header =
            header::HeaderValue::from_str(api_key.expose_secret()).context(InvalidApiKeySnafu)?;
        key_header.set_sensitive(true);
        let mut secret_header = header::HeaderValue::from_str(secret_key.expose_secret())
            .context(InvalidApiKeySnafu)?;
        secret_header.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert("APCA-API-KEY-ID", key_header);
        headers.insert("APCA-API-SECRET-KEY", secret_header);

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            data_url: DATA_URL.to_string(),
            trading_url: PAPER_TRADING_URL.to_string(),
            _api_key: api_key,
            _secret_key: secret_key,
        })
    }

    /// Points the provider at different hosts (live trading, a proxy, ...).
    pub fn with_urls(
        mut self,
        data_url: impl Into<String>,
        trading_url: impl Into<String>,
    ) -> Self {
        self.data_url = data_url.into().trim_end_matches('/').to_string();
        self.trading_url = trading_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<T, ProviderError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .context(ReqwestSnafu)?;

        let status = response.status();
        let body = response.text().await.context(ReqwestSnafu)?;
        if !status.is_success() {
            let message = if body.is_empty() {
                "Unknown API error".to_string()
            } else {
                body
            };
            return ApiSnafu {
                status: status.as_u16(),
                message,
            }
            .fail();
        }

        serde_json::from_str(&body).context(DecodeSnafu)
    }
}

#[async_trait]
impl DataProvider for AlpacaProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
        // Validate the timeframe before proceeding.
        validate_timeframe(&params.timeframe)?;
        if params.asset_class != AssetClass::UsEquity {
            return ValidationSnafu {
                message: format!("stock bars endpoint cannot serve {:?}", params.asset_class),
            }
            .fail();
        }

        let url = format!("{}/v2/stocks/bars", self.data_url);
        let mut all_bars: IndexMap<String, Vec<AlpacaBar>> = IndexMap::new();
        let mut next_page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let mut query_params = construct_params(&params);
            if let Some(token) = &next_page_token {
                query_params.push(("page_token".to_string(), token.clone()));
            }

            let page: AlpacaResponse = self.get_json(&url, &query_params).await?;
            pages += 1;

            // Merge the bars from the current page into our collection.
            for (symbol, bars) in page.bars.unwrap_or_default() {
                all_bars.entry(symbol).or_default().extend(bars);
            }

            match page.next_page_token {
                Some(token) => next_page_token = Some(token),
                None => break,
            }
        }

        debug!(
            symbols = %params.symbols.join(","),
            timeframe = %params.timeframe,
            pages,
            "fetched alpaca bars"
        );

        Ok(into_series(all_bars, &params))
    }
}

/// Maps merged pages to one series per symbol, keeping `[start, end)`.
///
/// Alpaca treats `end` as inclusive, so a bar opening exactly at `end` is dropped here.
fn into_series(
    all_bars: IndexMap<String, Vec<AlpacaBar>>,
    params: &BarsRequestParams,
) -> Vec<BarSeries> {
    all_bars
        .into_iter()
        .map(|(symbol, alpaca_bars)| BarSeries {
            symbol,
            timeframe: params.timeframe,
            bars: alpaca_bars
                .into_iter()
                .filter(|b| b.timestamp >= params.start && b.timestamp < params.end)
                .map(Into::into)
                .collect(),
        })
        .collect()
}

#[async_trait]
impl ClockProvider for AlpacaProvider {
    async fn clock(&self) -> Result<MarketClock, ProviderError> {
        let url = format!("{}/v2/clock", self.trading_url);
        let clock: AlpacaClock = self.get_json(&url, &[]).await?;
        Ok(clock.into())
    }
}
