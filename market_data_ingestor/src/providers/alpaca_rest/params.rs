use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::{
    models::{
        request_params::{BarsRequestParams, ProviderParams},
        timeframe::TimeFrame,
    },
    providers::{ProviderError, ValidationSnafu},
};

/// Specifies the corporate action adjustment for stock data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    #[default]
    Raw,
    Split,
    Dividend,
    All,
}

impl Adjustment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Adjustment::Raw => "raw",
            Adjustment::Split => "split",
            Adjustment::Dividend => "dividend",
            Adjustment::All => "all",
        }
    }
}

/// Specifies the source feed for stock data.
///
/// Free plans only have access to `iex`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    #[default]
    Sip,
    Iex,
    Otc,
}

impl Feed {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feed::Sip => "sip",
            Feed::Iex => "iex",
            Feed::Otc => "otc",
        }
    }
}

/// Specifies the sort order for the bars.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Sort {
    #[default]
    Asc,
    Desc,
}

impl Sort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sort::Asc => "asc",
            Sort::Desc => "desc",
        }
    }
}

/// Alpaca-specific parameters for a bars request.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct AlpacaBarsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment: Option<Adjustment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed: Option<Feed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
}

/// Rejects timeframes the bars endpoint does not accept.
pub fn validate_timeframe(tf: &TimeFrame) -> Result<(), ProviderError> {
    tf.validate().map_err(|e| {
        ValidationSnafu {
            message: e.to_string(),
        }
        .build()
    })
}

/// Builds the query string for `GET /v2/stocks/bars` (without `page_token`).
pub fn construct_params(params: &BarsRequestParams) -> Vec<(String, String)> {
    let mut query = vec![
        ("symbols".to_string(), params.symbols.join(",")),
        ("timeframe".to_string(), params.timeframe.to_string()),
        (
            "start".to_string(),
            params.start.to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
        (
            "end".to_string(),
            params.end.to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
    ];

    if let ProviderParams::Alpaca(extra) = &params.provider_specific {
        if let Some(adjustment) = extra.adjustment {
            query.push(("adjustment".to_string(), adjustment.as_str().to_string()));
        }
        if let Some(feed) = extra.feed {
            query.push(("feed".to_string(), feed.as_str().to_string()));
        }
        if let Some(currency) = &extra.currency {
            query.push(("currency".to_string(), currency.clone()));
        }
        if let Some(limit) = extra.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(sort) = extra.sort {
            query.push(("sort".to_string(), sort.as_str().to_string()));
        }
    }

    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::timeframe::TimeFrameUnit;
    use chrono::{TimeZone, Utc};

    fn base() -> BarsRequestParams {
        BarsRequestParams::single(
            "AAPL",
            TimeFrame::new(15, TimeFrameUnit::Minute),
            Utc.with_ymd_and_hms(2025, 3, 3, 14, 30, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 3, 14, 45, 0).unwrap(),
        )
    }

    fn get<'a>(q: &'a [(String, String)], key: &str) -> Option<&'a str> {
        q.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn universal_fields_only_by_default() {
        let q = construct_params(&base());
        assert_eq!(get(&q, "symbols"), Some("AAPL"));
        assert_eq!(get(&q, "timeframe"), Some("15Min"));
        assert_eq!(get(&q, "start"), Some("2025-03-03T14:30:00Z"));
        assert_eq!(get(&q, "end"), Some("2025-03-03T14:45:00Z"));
        assert_eq!(q.len(), 4);
    }

    #[test]
    fn alpaca_options_are_appended() {
        let p = base().with_provider_params(ProviderParams::Alpaca(AlpacaBarsParams {
            adjustment: Some(Adjustment::Raw),
            feed: Some(Feed::Iex),
            limit: Some(500),
            sort: Some(Sort::Desc),
            ..Default::default()
        }));
        let q = construct_params(&p);
        assert_eq!(get(&q, "adjustment"), Some("raw"));
        assert_eq!(get(&q, "feed"), Some("iex"));
        assert_eq!(get(&q, "limit"), Some("500"));
        assert_eq!(get(&q, "sort"), Some("desc"));
        assert_eq!(get(&q, "currency"), None);
    }

    #[test]
    fn multi_symbol_join() {
        let mut p = base();
        p.symbols = vec!["AAPL".into(), "MSFT".into()];
        assert_eq!(get(&construct_params(&p), "symbols"), Some("AAPL,MSFT"));
    }

    #[test]
    fn invalid_timeframe_is_validation_error() {
        let err = validate_timeframe(&TimeFrame::new(90, TimeFrameUnit::Minute)).unwrap_err();
        assert!(matches!(err, ProviderError::Validation { .. }));
    }
}
