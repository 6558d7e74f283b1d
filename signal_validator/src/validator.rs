//! The evaluation service: a bars provider plus the settings every check uses.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use market_data_ingestor::{
    models::{bar_series::BarSeries, request_params::BarsRequestParams, timeframe::TimeFrame},
    providers::DataProvider,
};
use tracing::debug;

use crate::{config::ValidatorConfig, error::SignalError};

/// Runs the signal checks against one bars provider.
///
/// Holds no state between calls; every check fetches its own window.
pub struct SignalValidator<P> {
    provider: P,
    config: ValidatorConfig,
}

impl<P: DataProvider> SignalValidator<P> {
    /// Creates a validator. `config` is assumed to be validated.
    pub fn new(provider: P, config: ValidatorConfig) -> Self {
        Self { provider, config }
    }

    /// Settings in use.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Working timezone.
    pub fn timezone(&self) -> Tz {
        self.config.timezone
    }

    /// Fetches `[end - lookback, end)` for `ticker` and drops incomplete bars.
    pub(crate) async fn fetch_window(
        &self,
        ticker: &str,
        timeframe: TimeFrame,
        end: DateTime<Tz>,
        lookback_minutes: u32,
    ) -> Result<BarSeries, SignalError> {
        let start = end - Duration::minutes(i64::from(lookback_minutes));
        let params = BarsRequestParams::single(ticker, timeframe, start.to_utc(), end.to_utc())
            .with_provider_params(self.config.provider.params());

        let mut series = self.provider.fetch_series(params).await?;
        let dropped = series.retain_complete();
        debug!(
            ticker,
            %timeframe,
            %start,
            %end,
            bars = series.len(),
            dropped,
            "fetched bars window"
        );
        Ok(series)
    }
}
