//! Institutional quality score of the latest one-minute impulse.
//!
//! ```text
//! score = round4(dominance × 2 + impulse + deviation × 0.5)
//! ```
//!
//! * dominance: body/range of the latest bar
//! * impulse: |MACD − signal| at the latest bar
//! * deviation: |close − SMA20| at the latest bar

use std::fmt;

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use market_data_ingestor::providers::DataProvider;
use tracing::{info, warn};

use crate::{
    candle::{dominance_ratio, is_body_dominant},
    direction::Direction,
    error::SignalError,
    indicators::{latest, macd, sma},
    validator::SignalValidator,
};

/// Raw inputs of the score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreComponents {
    /// Body/range of the latest bar.
    pub dominance: f64,
    /// Distance between MACD and its signal.
    pub impulse: f64,
    /// Distance between the close and the fast SMA.
    pub deviation: f64,
}

impl ScoreComponents {
    /// Weighted sum rounded to four decimals, with its tier.
    pub fn score(&self) -> QualityScore {
        let value = round_to(self.dominance * 2.0 + self.impulse + self.deviation * 0.5, 4);
        QualityScore {
            value,
            tier: QualityTier::from_score(value),
        }
    }
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Ordered quality tiers; lower bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QualityTier {
    /// Below 2.5.
    Weak,
    /// 2.5 and above.
    Decent,
    /// 3.5 and above.
    Clean,
    /// 4.0 and above.
    Elite,
}

impl QualityTier {
    /// Tier for a score.
    pub fn from_score(score: f64) -> Self {
        if score >= 4.0 {
            QualityTier::Elite
        } else if score >= 3.5 {
            QualityTier::Clean
        } else if score >= 2.5 {
            QualityTier::Decent
        } else {
            QualityTier::Weak
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            QualityTier::Elite => "elite institutional signal",
            QualityTier::Clean => "clean tactical signal",
            QualityTier::Decent => "decent signal, watch for continuation",
            QualityTier::Weak => "weak signal, likely congestion",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A score and its tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityScore {
    /// Rounded score.
    pub value: f64,
    /// Tier of `value`.
    pub tier: QualityTier,
}

/// Everything the scorer measured on one window.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityAssessment {
    /// Score inputs.
    pub components: ScoreComponents,
    /// Score and tier.
    pub score: QualityScore,
    /// Latest bar passes the candle dominance threshold.
    pub body_dominant: bool,
    /// Timestamp of the latest bar.
    pub bar_time: DateTime<Tz>,
}

impl QualityAssessment {
    /// Multi-line verdict with tier label and score.
    pub fn verdict(&self) -> String {
        format!(
            "\n*Institutional evaluation:*\n→ {}\n*Technical score:* `{}`",
            self.score.tier.label(),
            self.score.value
        )
    }
}

/// Text returned instead of a verdict when scoring fails.
pub fn failure_verdict(err: &SignalError) -> String {
    format!("\n*Evaluation failed:* {err}")
}

impl<P: DataProvider> SignalValidator<P> {
    /// Scores the bars in the lookback window before `moment`.
    pub async fn assess_quality(
        &self,
        ticker: &str,
        moment: DateTime<Tz>,
    ) -> Result<QualityAssessment, SignalError> {
        let cfg = self.config();
        let moment = moment.with_timezone(&self.timezone());
        let series = self
            .fetch_window(ticker, cfg.scorer.timeframe, moment, cfg.scorer.lookback_minutes)
            .await?;
        let Some(last) = series.last() else {
            return Err(SignalError::insufficient("bars", 1, 0));
        };

        let closes = series.closes();
        let point = latest(&macd(&closes, cfg.macd));
        let fast = latest(&sma(&closes, cfg.sma.fast));
        let (Some(point), Some(fast)) = (point, fast) else {
            let needed = (cfg.macd.warm_up() + 1).max(cfg.sma.fast);
            return Err(SignalError::insufficient("bars", needed, closes.len()));
        };

        let components = ScoreComponents {
            dominance: dominance_ratio(last),
            impulse: point.impulse(),
            deviation: (last.close - fast).abs(),
        };
        let score = components.score();
        if !score.value.is_finite() {
            return Err(SignalError::Computation(format!(
                "non-finite score from {components:?}"
            )));
        }

        Ok(QualityAssessment {
            components,
            score,
            body_dominant: is_body_dominant(last, cfg.candle.dominance_threshold),
            bar_time: last.timestamp.with_timezone(&self.timezone()),
        })
    }

    /// Quality verdict text for a candidate trade. Never fails: errors come
    /// back as a failure string.
    ///
    /// `trade_date` and `direction` only label the log lines.
    pub async fn evaluate_quality(
        &self,
        ticker: &str,
        trade_date: NaiveDate,
        direction: Direction,
        moment: DateTime<Tz>,
    ) -> String {
        match self.assess_quality(ticker, moment).await {
            Ok(a) => {
                info!(
                    ticker,
                    %trade_date,
                    %direction,
                    bar_time = %a.bar_time,
                    dominance = a.components.dominance,
                    body_dominant = a.body_dominant,
                    impulse = a.components.impulse,
                    deviation = a.components.deviation,
                    score = a.score.value,
                    tier = %a.score.tier,
                    "quality score"
                );
                a.verdict()
            }
            Err(e) => {
                warn!(
                    ticker,
                    %trade_date,
                    %direction,
                    kind = e.kind(),
                    error = %e,
                    "quality scoring failed"
                );
                failure_verdict(&e)
            }
        }
    }
}
