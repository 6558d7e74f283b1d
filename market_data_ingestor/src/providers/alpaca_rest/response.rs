use chrono::{DateTime, FixedOffset, Utc};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::models::{bar::Bar, clock::MarketClock};

#[derive(Deserialize, Debug)]
pub struct AlpacaBar {
    #[serde(rename = "t")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "o")]
    pub open: f64,
    #[serde(rename = "h")]
    pub high: f64,
    #[serde(rename = "l")]
    pub low: f64,
    #[serde(rename = "c")]
    pub close: f64,
    #[serde(rename = "v")]
    pub volume: f64,
    #[serde(rename = "n")]
    pub trade_count: Option<u64>,
    #[serde(rename = "vw")]
    pub vwap: Option<f64>,
}

impl From<AlpacaBar> for Bar {
    fn from(ab: AlpacaBar) -> Self {
        Bar {
            timestamp: ab.timestamp,
            open: ab.open,
            high: ab.high,
            low: ab.low,
            close: ab.close,
            volume: ab.volume,
            trade_count: ab.trade_count,
            vwap: ab.vwap,
        }
    }
}

/// `bars` is `null` when no symbol has data in the window.
#[derive(Deserialize, Debug)]
pub struct AlpacaResponse {
    #[serde(default)]
    pub bars: Option<IndexMap<String, Vec<AlpacaBar>>>,
    pub next_page_token: Option<String>,
}

/// `GET /v2/clock`. Alpaca reports these with the exchange offset.
#[derive(Deserialize, Debug)]
pub struct AlpacaClock {
    pub timestamp: DateTime<FixedOffset>,
    pub is_open: bool,
    pub next_open: DateTime<FixedOffset>,
    pub next_close: DateTime<FixedOffset>,
}

impl From<AlpacaClock> for MarketClock {
    fn from(c: AlpacaClock) -> Self {
        MarketClock {
            timestamp: c.timestamp.with_timezone(&Utc),
            is_open: c.is_open,
            next_open: c.next_open.with_timezone(&Utc),
            next_close: c.next_close.with_timezone(&Utc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn decodes_bars_page() {
        let body = r#"{
            "bars": {
                "AAPL": [
                    {"t":"2025-03-03T14:30:00Z","o":241.79,"h":242.5,"l":241.2,"c":242.1,
                     "v":120345,"n":1500,"vw":241.9}
                ]
            },
            "next_page_token": "QUFQTHxNfDIwMjU="
        }"#;
        let resp: AlpacaResponse = serde_json::from_str(body).unwrap();
        let mut bars = resp.bars.unwrap();
        let bar: Bar = bars.swap_remove("AAPL").unwrap().into_iter().next().unwrap().into();
        assert_eq!(bar.timestamp, Utc.with_ymd_and_hms(2025, 3, 3, 14, 30, 0).unwrap());
        assert_eq!(bar.close, 242.1);
        assert_eq!(bar.trade_count, Some(1500));
        assert_eq!(resp.next_page_token.as_deref(), Some("QUFQTHxNfDIwMjU="));
    }

    #[test]
    fn null_bars_means_no_data() {
        let resp: AlpacaResponse =
            serde_json::from_str(r#"{"bars":null,"next_page_token":null}"#).unwrap();
        assert!(resp.bars.is_none());
        assert!(resp.next_page_token.is_none());
    }

    #[test]
    fn clock_converts_to_utc() {
        let body = r#"{
            "timestamp":"2025-03-03T10:15:30.123456789-05:00",
            "is_open":true,
            "next_open":"2025-03-04T09:30:00-05:00",
            "next_close":"2025-03-03T16:00:00-05:00"
        }"#;
        let clock: MarketClock = serde_json::from_str::<AlpacaClock>(body).unwrap().into();
        assert!(clock.is_open);
        assert_eq!(clock.next_close, Utc.with_ymd_and_hms(2025, 3, 3, 21, 0, 0).unwrap());
    }
}
