//! Multi-timeframe MACD diagnostic.
//!
//! For one timeframe: snap the reference moment to the last closed bar, fetch
//! the lookback window, compute MACD and compare the latest line with its
//! signal. On the primary timeframe a crossover older than the configured age
//! vetoes the verdict whatever the current relation is.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use market_data_ingestor::{
    models::{bar_series::BarSeries, timeframe::TimeFrame},
    providers::DataProvider,
};
use tracing::{info, warn};

use crate::{
    crossover::{CrossoverEvent, last_crossover},
    direction::Direction,
    error::SignalError,
    series::IndicatorSeries,
    tz::last_closed_bar_end,
    validator::SignalValidator,
};

/// Result of one MACD diagnostic that reached a verdict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MacdOutcome {
    /// Latest MACD sits on the requested side of its signal.
    Confirmed {
        /// Latest MACD line.
        macd: f64,
        /// Latest signal line.
        signal: f64,
    },
    /// Latest MACD sits on the wrong side of (or on) its signal.
    Rejected {
        /// Latest MACD line.
        macd: f64,
        /// Latest signal line.
        signal: f64,
    },
    /// The last crossover on the primary timeframe is too old to trade.
    StaleCrossover {
        /// The crossover found.
        crossover: CrossoverEvent,
        /// Whole minutes between the crossover and the reference moment.
        minutes: i64,
    },
}

impl MacdOutcome {
    /// Only [`MacdOutcome::Confirmed`] passes.
    pub fn passed(&self) -> bool {
        matches!(self, MacdOutcome::Confirmed { .. })
    }
}

impl<P: DataProvider> SignalValidator<P> {
    /// Boolean MACD diagnostic. Every error and a stale crossover yield `false`.
    pub async fn diagnose_macd(
        &self,
        ticker: &str,
        timeframe: TimeFrame,
        moment: DateTime<Tz>,
        direction: Direction,
    ) -> bool {
        let outcome = self.try_diagnose_macd(ticker, timeframe, moment, direction).await;
        log_outcome(ticker, timeframe, direction, &outcome);
        matches!(outcome, Ok(o) if o.passed())
    }

    /// Structured MACD diagnostic.
    pub async fn try_diagnose_macd(
        &self,
        ticker: &str,
        timeframe: TimeFrame,
        moment: DateTime<Tz>,
        direction: Direction,
    ) -> Result<MacdOutcome, SignalError> {
        let moment = moment.with_timezone(&self.timezone());
        let series = self.fetch_diagnostic_window(ticker, timeframe, moment).await?;
        self.diagnose_series(&series, timeframe, moment, direction)
    }

    /// Bars for the diagnostic window of `timeframe` at `moment`.
    pub(crate) async fn fetch_diagnostic_window(
        &self,
        ticker: &str,
        timeframe: TimeFrame,
        moment: DateTime<Tz>,
    ) -> Result<BarSeries, SignalError> {
        let end = last_closed_bar_end(moment, timeframe);
        self.fetch_window(ticker, timeframe, end, self.config().diagnostic.lookback_minutes)
            .await
    }

    /// Diagnostic over already fetched, complete bars.
    pub(crate) fn diagnose_series(
        &self,
        series: &BarSeries,
        timeframe: TimeFrame,
        moment: DateTime<Tz>,
        direction: Direction,
    ) -> Result<MacdOutcome, SignalError> {
        let cfg = self.config();
        let min_bars = cfg.diagnostic.min_bars;
        if series.len() < min_bars {
            return Err(SignalError::insufficient("bars", min_bars, series.len()));
        }

        let indicators = IndicatorSeries::compute(&series.bars, self.timezone(), cfg.sma, cfg.macd);
        let Some(latest) = indicators.last() else {
            return Err(SignalError::insufficient(
                "bars",
                cfg.macd.warm_up() + 1,
                series.len(),
            ));
        };
        if !(latest.macd.is_finite() && latest.signal.is_finite()) {
            return Err(SignalError::Computation(format!(
                "non-finite MACD {} / signal {} at {}",
                latest.macd, latest.signal, latest.timestamp
            )));
        }

        if cfg.diagnostic.primary_timeframe == Some(timeframe) {
            if let Some(crossover) = last_crossover(indicators.rows()) {
                let age = moment - crossover.timestamp;
                let minutes = age.num_minutes();
                info!(
                    ticker = %series.symbol,
                    %timeframe,
                    crossed_at = %crossover.timestamp,
                    crossed = %crossover.direction,
                    minutes,
                    "last MACD crossover"
                );
                if age > Duration::minutes(i64::from(cfg.diagnostic.crossover_max_age_minutes)) {
                    return Ok(MacdOutcome::StaleCrossover { crossover, minutes });
                }
            }
        }

        let (macd, signal) = (latest.macd, latest.signal);
        Ok(if direction.confirms(macd, signal) {
            MacdOutcome::Confirmed { macd, signal }
        } else {
            MacdOutcome::Rejected { macd, signal }
        })
    }
}

pub(crate) fn log_outcome(
    ticker: &str,
    timeframe: TimeFrame,
    direction: Direction,
    outcome: &Result<MacdOutcome, SignalError>,
) {
    match outcome {
        Ok(MacdOutcome::Confirmed { macd, signal }) => {
            info!(ticker, %timeframe, %direction, macd, signal, "MACD confirms")
        }
        Ok(MacdOutcome::Rejected { macd, signal }) => {
            info!(ticker, %timeframe, %direction, macd, signal, "MACD does not confirm")
        }
        Ok(MacdOutcome::StaleCrossover { crossover, minutes }) => warn!(
            ticker,
            %timeframe,
            %direction,
            crossed_at = %crossover.timestamp,
            minutes,
            "MACD crossover too old, signal rejected"
        ),
        Err(e) => warn!(
            ticker,
            %timeframe,
            %direction,
            kind = e.kind(),
            error = %e,
            "MACD diagnostic failed"
        ),
    }
}
