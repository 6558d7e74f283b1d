//! Full evaluation of a candidate signal across the configured timeframes.

use std::fmt;

use chrono::DateTime;
use chrono_tz::Tz;
use market_data_ingestor::{models::timeframe::TimeFrame, providers::DataProvider};

use crate::{
    diagnostic::{MacdOutcome, log_outcome},
    direction::Direction,
    error::SignalError,
    sma_alignment::validate_sma_alignment_with,
    validator::SignalValidator,
};

/// Checks on one timeframe.
#[derive(Debug)]
pub struct TimeframeVerdict {
    /// Timeframe checked.
    pub timeframe: TimeFrame,
    /// MACD diagnostic result.
    pub macd: Result<MacdOutcome, SignalError>,
    /// SMA alignment; `false` when it could not be computed.
    pub sma_aligned: bool,
}

impl TimeframeVerdict {
    /// Both checks passed.
    pub fn passed(&self) -> bool {
        self.sma_aligned && matches!(&self.macd, Ok(o) if o.passed())
    }
}

/// Per-timeframe verdicts and the quality text for one candidate signal.
#[derive(Debug)]
pub struct SignalReport {
    /// Symbol evaluated.
    pub ticker: String,
    /// Hypothesis tested.
    pub direction: Direction,
    /// Reference moment in the working timezone.
    pub moment: DateTime<Tz>,
    /// One entry per configured timeframe, in configuration order.
    pub timeframes: Vec<TimeframeVerdict>,
    /// Scorer verdict or failure text.
    pub quality: String,
}

impl SignalReport {
    /// Every timeframe passed MACD and SMA checks.
    pub fn all_confirmed(&self) -> bool {
        !self.timeframes.is_empty() && self.timeframes.iter().all(TimeframeVerdict::passed)
    }
}

impl fmt::Display for SignalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {} at {}",
            self.ticker,
            self.direction,
            self.moment.format("%Y-%m-%d %H:%M:%S %Z")
        )?;
        for tf in &self.timeframes {
            let macd = match &tf.macd {
                Ok(MacdOutcome::Confirmed { macd, signal }) => {
                    format!("MACD confirms ({macd:.4} vs {signal:.4})")
                }
                Ok(MacdOutcome::Rejected { macd, signal }) => {
                    format!("MACD does not confirm ({macd:.4} vs {signal:.4})")
                }
                Ok(MacdOutcome::StaleCrossover { crossover, minutes }) => format!(
                    "MACD crossover at {} is {minutes} min old",
                    crossover.timestamp.format("%H:%M")
                ),
                Err(e) => format!("MACD unavailable: {e}"),
            };
            let sma = if tf.sma_aligned { "SMA aligned" } else { "SMA not aligned" };
            writeln!(f, "  {:>6}: {macd}; {sma}", tf.timeframe.to_string())?;
        }
        writeln!(f, "{}", self.quality)?;
        write!(
            f,
            "signal {}",
            if self.all_confirmed() { "CONFIRMED" } else { "REJECTED" }
        )
    }
}

impl<P: DataProvider> SignalValidator<P> {
    /// SMA alignment on the diagnostic window of `timeframe` at `moment`.
    /// Any failure is `false`.
    pub async fn sma_alignment(
        &self,
        ticker: &str,
        timeframe: TimeFrame,
        moment: DateTime<Tz>,
        direction: Direction,
    ) -> bool {
        let moment = moment.with_timezone(&self.timezone());
        match self.fetch_diagnostic_window(ticker, timeframe, moment).await {
            Ok(series) => validate_sma_alignment_with(
                &series,
                direction,
                &timeframe.to_string(),
                self.config().sma,
            ),
            Err(e) => {
                tracing::warn!(ticker, %timeframe, kind = e.kind(), error = %e, "SMA check failed");
                false
            }
        }
    }

    /// Runs MACD and SMA checks on every configured timeframe, then the scorer.
    ///
    /// One fetch per timeframe feeds both checks; calls run one after another.
    pub async fn evaluate(
        &self,
        ticker: &str,
        direction: Direction,
        moment: DateTime<Tz>,
    ) -> SignalReport {
        let moment = moment.with_timezone(&self.timezone());
        let mut timeframes = Vec::with_capacity(self.config().diagnostic.timeframes.len());

        for &timeframe in &self.config().diagnostic.timeframes {
            let window = self.fetch_diagnostic_window(ticker, timeframe, moment).await;
            let (macd, sma_aligned) = match window {
                Ok(series) => (
                    self.diagnose_series(&series, timeframe, moment, direction),
                    validate_sma_alignment_with(
                        &series,
                        direction,
                        &timeframe.to_string(),
                        self.config().sma,
                    ),
                ),
                Err(e) => (Err(e), false),
            };
            log_outcome(ticker, timeframe, direction, &macd);
            timeframes.push(TimeframeVerdict {
                timeframe,
                macd,
                sma_aligned,
            });
        }

        let quality = self
            .evaluate_quality(ticker, moment.date_naive(), direction, moment)
            .await;

        SignalReport {
            ticker: ticker.to_string(),
            direction,
            moment,
            timeframes,
            quality,
        }
    }
}
