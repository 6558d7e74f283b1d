//! Credential and data-access check.
//!
//! A key pair can be valid for trading yet lack a market-data subscription, so
//! both APIs are exercised: the trading clock first, then a tiny bars request
//! for the previous session's opening 15 minutes.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::US::Eastern;
use tracing::{info, warn};

use crate::{
    models::{
        clock::MarketClock,
        request_params::{BarsRequestParams, ProviderParams},
        timeframe::{TimeFrame, TimeFrameUnit},
    },
    providers::{
        ClockProvider, DataProvider, InternalSnafu, ProviderError,
        alpaca_rest::params::{Adjustment, AlpacaBarsParams},
    },
};

/// Symbol used for the data-access check.
pub const PROBE_SYMBOL: &str = "AAPL";

/// Checks that the configured keys can read the trading clock and market data.
///
/// Returns the clock on success so callers can reuse the authenticated time.
pub async fn verify_access<P>(provider: &P) -> Result<MarketClock, ProviderError>
where
    P: ClockProvider + DataProvider,
{
    let clock = provider.clock().await.inspect_err(|e| {
        warn!(error = %e, "trading API rejected the credentials");
    })?;

    let params = access_check_request(clock.timestamp)?;
    provider.fetch_bars(params).await.inspect_err(|e| {
        warn!(error = %e, "market data API rejected the credentials");
    })?;

    info!(is_open = clock.is_open, "credential and market data check complete");
    Ok(clock)
}

/// Bars request for yesterday 09:30–09:45 US/Eastern, raw adjustment.
pub fn access_check_request(now: DateTime<Utc>) -> Result<BarsRequestParams, ProviderError> {
    let yesterday = now.with_timezone(&Eastern).date_naive() - Duration::days(1);
    let at = |h, m| {
        let naive = yesterday.and_time(NaiveTime::from_hms_opt(h, m, 0)?);
        Eastern
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    };
    let (Some(start), Some(end)) = (at(9, 30), at(9, 45)) else {
        return InternalSnafu {
            message: format!("no unambiguous 09:30 Eastern on {yesterday}"),
        }
        .fail();
    };

    Ok(
        BarsRequestParams::single(
            PROBE_SYMBOL,
            TimeFrame::new(15, TimeFrameUnit::Minute),
            start,
            end,
        )
        .with_provider_params(ProviderParams::Alpaca(AlpacaBarsParams {
            adjustment: Some(Adjustment::Raw),
            ..Default::default()
        })),
    )
}
