#![allow(dead_code)]

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use market_data_ingestor::{
    models::{
        bar::Bar, bar_series::BarSeries, request_params::BarsRequestParams, timeframe::TimeFrame,
    },
    providers::{ApiSnafu, DataProvider, ProviderError},
};
use signal_validator::{SignalValidator, ValidatorConfig};

/// Returns the same bars for a timeframe whatever window is asked for, so a
/// fixture can stand in for a feed with gaps. Records every request.
#[derive(Default)]
pub struct CannedProvider {
    bars: HashMap<TimeFrame, Vec<Bar>>,
    pub requests: Mutex<Vec<BarsRequestParams>>,
}

impl CannedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, timeframe: &str, bars: Vec<Bar>) -> Self {
        self.bars.insert(tf(timeframe), bars);
        self
    }

    pub fn requests(&self) -> Vec<BarsRequestParams> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DataProvider for CannedProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
        self.requests.lock().unwrap().push(params.clone());
        Ok(match self.bars.get(&params.timeframe) {
            Some(bars) => params
                .symbols
                .iter()
                .map(|s| BarSeries::new(s.clone(), params.timeframe, bars.clone()))
                .collect(),
            None => Vec::new(),
        })
    }
}

/// Every request fails like a rate-limited API.
pub struct FailingProvider;

#[async_trait]
impl DataProvider for FailingProvider {
    async fn fetch_bars(
        &self,
        _params: BarsRequestParams,
    ) -> Result<Vec<BarSeries>, ProviderError> {
        ApiSnafu {
            status: 429u16,
            message: "too many requests",
        }
        .fail()
    }
}

pub fn tf(label: &str) -> TimeFrame {
    label.parse().unwrap()
}

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

pub fn validator<P: DataProvider>(provider: P) -> SignalValidator<P> {
    SignalValidator::new(provider, ValidatorConfig::default())
}

/// Bars `step_minutes` apart starting at `start`, one per close, with a
/// half-point wick on each side.
pub fn bars_from_closes(start: DateTime<Utc>, step_minutes: i64, closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            Bar::ohlc(
                start + Duration::minutes(step_minutes * i as i64),
                c,
                c + 0.5,
                c - 0.5,
                c,
            )
        })
        .collect()
}

/// Start of the 15-minute crossover fixture.
pub fn crossover_start() -> DateTime<Utc> {
    utc(2025, 3, 3, 9, 0)
}

/// 40 quarter-hour bars: a steady decline for 35 bars, then a recovery.
/// MACD crosses up its signal exactly once, at bar 36 (18:00Z), and stays
/// above it through bar 39.
pub fn crossover_bars() -> Vec<Bar> {
    let closes: Vec<f64> = (0..40)
        .map(|i| {
            if i <= 34 {
                140.0 - i as f64
            } else {
                106.0 + 1.5 * (i - 34) as f64
            }
        })
        .collect();
    bars_from_closes(crossover_start(), 15, &closes)
}

/// 40 bars rising one point per bar.
pub fn rising_bars(start: DateTime<Utc>, step_minutes: i64) -> Vec<Bar> {
    let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
    bars_from_closes(start, step_minutes, &closes)
}

/// 39 flat one-minute bars at 100 and a final bar shaped by the caller.
pub fn impulse_bars(
    start: DateTime<Utc>,
    last_open: f64,
    last_high: f64,
    last_low: f64,
    last_close: f64,
) -> Vec<Bar> {
    let mut bars: Vec<Bar> = (0..39)
        .map(|i| Bar::ohlc(start + Duration::minutes(i), 100.0, 100.0, 100.0, 100.0))
        .collect();
    bars.push(Bar::ohlc(
        start + Duration::minutes(39),
        last_open,
        last_high,
        last_low,
        last_close,
    ));
    bars
}
