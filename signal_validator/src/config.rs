//! Validator configuration: TOML parsing, defaults and validation.
//!
//! Every field has a default, so an empty document is a complete config:
//!
//! ```toml
//! timezone = "America/New_York"
//!
//! [diagnostic]
//! timeframes = ["5Min", "15Min"]
//! primary_timeframe = "15Min"
//! lookback_minutes = 600
//! min_bars = 35
//! crossover_max_age_minutes = 180
//!
//! [sma]
//! fast = 20
//! slow = 30
//!
//! [macd]
//! fast = 12
//! slow = 26
//! signal = 9
//!
//! [candle]
//! dominance_threshold = 0.65
//!
//! [scorer]
//! timeframe = "1Min"
//! lookback_minutes = 30
//!
//! [provider]
//! feed = "iex"
//! adjustment = "raw"
//! ```
//!
//! Entrypoints: [`load_config_str`] and [`load_config_path`].

use std::path::Path;

use anyhow::{Context, bail, ensure};
use chrono_tz::Tz;
use market_data_ingestor::{
    models::{
        request_params::ProviderParams,
        timeframe::{TimeFrame, TimeFrameUnit},
    },
    providers::alpaca_rest::{
        AlpacaBarsParams,
        params::{Adjustment, Feed},
    },
};
use serde::{Deserialize, Serialize};

use crate::{
    candle::DEFAULT_DOMINANCE_THRESHOLD, indicators::MacdSettings, sma_alignment::SmaWindows,
};

/// Top-level settings of a [`SignalValidator`](crate::SignalValidator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Working timezone for bar timestamps and naive reference moments.
    pub timezone: Tz,
    /// Multi-timeframe MACD diagnostic.
    pub diagnostic: DiagnosticConfig,
    /// SMA alignment windows.
    pub sma: SmaWindows,
    /// MACD spans shared by the diagnostic and the scorer.
    pub macd: MacdSettings,
    /// Candle shape analysis.
    pub candle: CandleConfig,
    /// Quality scorer.
    pub scorer: ScorerConfig,
    /// Bars request extras.
    pub provider: ProviderConfig,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::America::New_York,
            diagnostic: DiagnosticConfig::default(),
            sma: SmaWindows::default(),
            macd: MacdSettings::default(),
            candle: CandleConfig::default(),
            scorer: ScorerConfig::default(),
            provider: ProviderConfig::default(),
        }
    }
}

/// Settings of the per-timeframe MACD diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiagnosticConfig {
    /// Timeframes evaluated by a full report, in order.
    pub timeframes: Vec<TimeFrame>,
    /// Timeframe on which a stale crossover vetoes the verdict; `None` disables the rule.
    pub primary_timeframe: Option<TimeFrame>,
    /// Length of the bars request ending at the snapped moment.
    pub lookback_minutes: u32,
    /// Fewest usable bars accepted.
    pub min_bars: usize,
    /// Oldest acceptable crossover on the primary timeframe.
    pub crossover_max_age_minutes: u32,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        Self {
            timeframes: vec![
                TimeFrame::new(5, TimeFrameUnit::Minute),
                TimeFrame::new(15, TimeFrameUnit::Minute),
            ],
            primary_timeframe: Some(TimeFrame::new(15, TimeFrameUnit::Minute)),
            lookback_minutes: 600,
            min_bars: 35,
            crossover_max_age_minutes: 180,
        }
    }
}

/// Candle shape thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CandleConfig {
    /// Body/range ratio at or above which a candle is body-dominant.
    pub dominance_threshold: f64,
}

impl Default for CandleConfig {
    fn default() -> Self {
        Self {
            dominance_threshold: DEFAULT_DOMINANCE_THRESHOLD,
        }
    }
}

/// Quality scorer window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScorerConfig {
    /// Bar interval of the scoring window.
    pub timeframe: TimeFrame,
    /// Minutes of bars before the reference moment.
    ///
    /// MACD 12/26/9 is first defined at the 34th bar, so the default 30 minutes of
    /// `1Min` bars never yields a score and the verdict is always the failure string.
    /// Raise it (60 or more) when scoring against a live feed.
    pub lookback_minutes: u32,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            timeframe: TimeFrame::new(1, TimeFrameUnit::Minute),
            lookback_minutes: 30,
        }
    }
}

/// Optional Alpaca request extras applied to every bars request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// Source feed; free plans need `iex`.
    pub feed: Option<Feed>,
    /// Corporate action adjustment.
    pub adjustment: Option<Adjustment>,
}

impl ProviderConfig {
    /// Provider parameters to attach to bars requests.
    pub fn params(&self) -> ProviderParams {
        if self.feed.is_none() && self.adjustment.is_none() {
            return ProviderParams::None;
        }
        ProviderParams::Alpaca(AlpacaBarsParams {
            feed: self.feed,
            adjustment: self.adjustment,
            ..Default::default()
        })
    }
}

impl ValidatorConfig {
    /// Checks cross-field constraints serde cannot express.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.sma.fast > 0 && self.sma.fast < self.sma.slow,
            "sma.fast ({}) must be positive and below sma.slow ({})",
            self.sma.fast,
            self.sma.slow
        );
        ensure!(
            self.macd.fast > 0 && self.macd.signal > 0 && self.macd.fast < self.macd.slow,
            "macd spans must be positive with fast ({}) below slow ({})",
            self.macd.fast,
            self.macd.slow
        );
        ensure!(
            !self.diagnostic.timeframes.is_empty(),
            "diagnostic.timeframes cannot be empty"
        );
        ensure!(
            self.diagnostic.lookback_minutes > 0,
            "diagnostic.lookback_minutes must be positive"
        );
        ensure!(self.diagnostic.min_bars > 0, "diagnostic.min_bars must be positive");
        ensure!(self.scorer.lookback_minutes > 0, "scorer.lookback_minutes must be positive");

        let threshold = self.candle.dominance_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            bail!("candle.dominance_threshold must be in (0, 1], got {threshold}");
        }
        Ok(())
    }
}

/// Parses and validates a TOML config document.
pub fn load_config_str(toml_str: &str) -> anyhow::Result<ValidatorConfig> {
    let cfg: ValidatorConfig =
        toml::from_str(toml_str).context("failed to parse validator config TOML")?;
    cfg.validate().context("invalid validator config")?;
    Ok(cfg)
}

/// Reads, parses and validates a TOML config file.
pub fn load_config_path(path: impl AsRef<Path>) -> anyhow::Result<ValidatorConfig> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("read config file {}", path.as_ref().display()))?;
    load_config_str(&text)
}
