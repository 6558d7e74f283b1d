//! Bar interval expressed as amount × unit.
//!
//! The text form follows the labels Alpaca uses on the wire (`1Min`, `15Min`,
//! `1Hour`, `1Day`, `1Week`, `1Month`). Parsing also accepts the short CLI
//! form (`5m`, `3h`, `1D`, `1W`, `6M`); note that `m` is minutes and `M` is months.
//!
//! ```
//! use market_data_ingestor::models::timeframe::{TimeFrame, TimeFrameUnit};
//!
//! let tf: TimeFrame = "15Min".parse().unwrap();
//! assert_eq!(tf, TimeFrame::new(15, TimeFrameUnit::Minute));
//! assert_eq!(tf.to_string(), "15Min");
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimeFrameError {
    #[error("Invalid amount for {:?}: {}", unit, message)]
    InvalidAmount {
        unit: TimeFrameUnit,
        message: String,
    },

    #[error("Invalid input: {}", message)]
    InvalidInput { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeFrameUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeFrame {
    pub amount: u32,
    pub unit: TimeFrameUnit,
}

impl TimeFrame {
    /// Creates a timeframe without checking the amount against provider limits.
    pub const fn new(amount: u32, unit: TimeFrameUnit) -> Self {
        Self { amount, unit }
    }

    /// Creates a timeframe, rejecting amounts the bars API does not serve.
    pub fn try_new(amount: u32, unit: TimeFrameUnit) -> Result<Self, TimeFrameError> {
        let tf = Self::new(amount, unit);
        tf.validate()?;
        Ok(tf)
    }

    pub fn minutes(amount: u32) -> Result<Self, TimeFrameError> {
        Self::try_new(amount, TimeFrameUnit::Minute)
    }

    pub fn hours(amount: u32) -> Result<Self, TimeFrameError> {
        Self::try_new(amount, TimeFrameUnit::Hour)
    }

    pub const fn day() -> Self {
        Self::new(1, TimeFrameUnit::Day)
    }

    pub const fn week() -> Self {
        Self::new(1, TimeFrameUnit::Week)
    }

    pub fn months(amount: u32) -> Result<Self, TimeFrameError> {
        Self::try_new(amount, TimeFrameUnit::Month)
    }

    pub fn validate(&self) -> Result<(), TimeFrameError> {
        let unit = self.unit;
        match unit {
            TimeFrameUnit::Minute if !(1..=59).contains(&self.amount) => {
                Err(TimeFrameError::InvalidAmount {
                    unit,
                    message: "Minute units can only be used with amounts between 1-59.".into(),
                })
            }
            TimeFrameUnit::Hour if !(1..=23).contains(&self.amount) => {
                Err(TimeFrameError::InvalidAmount {
                    unit,
                    message: "Hour units can only be used with amounts 1-23".into(),
                })
            }
            TimeFrameUnit::Day | TimeFrameUnit::Week if self.amount != 1 => {
                Err(TimeFrameError::InvalidAmount {
                    unit,
                    message: "Day and Week units can only be used with amount 1".into(),
                })
            }
            TimeFrameUnit::Month if ![1, 2, 3, 4, 6, 12].contains(&self.amount) => {
                Err(TimeFrameError::InvalidAmount {
                    unit,
                    message: "Month units can only be used with amount 1, 2, 3, 4, 6 and 12".into(),
                })
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            TimeFrameUnit::Minute => "Min",
            TimeFrameUnit::Hour => "Hour",
            TimeFrameUnit::Day => "Day",
            TimeFrameUnit::Week => "Week",
            TimeFrameUnit::Month => "Month",
        };
        write!(f, "{}{unit}", self.amount)
    }
}

impl FromStr for TimeFrame {
    type Err = TimeFrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = |message: String| TimeFrameError::InvalidInput { message };

        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| invalid(format!("timeframe '{s}' has no unit")))?;
        let (digits, unit) = s.split_at(split);
        if digits.is_empty() {
            return Err(invalid(format!("timeframe '{s}' has no amount")));
        }
        let amount: u32 = digits
            .parse()
            .map_err(|e| invalid(format!("bad timeframe amount '{digits}': {e}")))?;

        let unit = match unit {
            "Min" | "min" | "m" | "T" => TimeFrameUnit::Minute,
            "Hour" | "hour" | "h" | "H" => TimeFrameUnit::Hour,
            "Day" | "day" | "d" | "D" => TimeFrameUnit::Day,
            "Week" | "week" | "w" | "W" => TimeFrameUnit::Week,
            "Month" | "month" | "mo" | "M" => TimeFrameUnit::Month,
            other => return Err(invalid(format!("unknown timeframe unit: {other}"))),
        };
        Self::try_new(amount, unit)
    }
}

impl TryFrom<String> for TimeFrame {
    type Error = TimeFrameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeFrame> for String {
    fn from(tf: TimeFrame) -> Self {
        tf.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_alpaca_labels() {
        assert_eq!("1Min".parse::<TimeFrame>().unwrap(), TimeFrame::new(1, TimeFrameUnit::Minute));
        assert_eq!(
            "15Min".parse::<TimeFrame>().unwrap(),
            TimeFrame::new(15, TimeFrameUnit::Minute)
        );
        assert_eq!("4Hour".parse::<TimeFrame>().unwrap(), TimeFrame::new(4, TimeFrameUnit::Hour));
        assert_eq!("1Day".parse::<TimeFrame>().unwrap(), TimeFrame::day());
        assert_eq!("1Week".parse::<TimeFrame>().unwrap(), TimeFrame::week());
    }

    #[test]
    fn short_form_keeps_minute_and_month_apart() {
        assert_eq!("5m".parse::<TimeFrame>().unwrap().unit, TimeFrameUnit::Minute);
        assert_eq!("6M".parse::<TimeFrame>().unwrap().unit, TimeFrameUnit::Month);
    }

    #[test]
    fn display_round_trips_through_parse() {
        for label in ["1Min", "5Min", "15Min", "1Hour", "1Day", "1Week", "3Month"] {
            let tf: TimeFrame = label.parse().unwrap();
            assert_eq!(tf.to_string(), label);
        }
    }

    #[test]
    fn rejects_out_of_range_amounts() {
        assert!(TimeFrame::minutes(0).is_err());
        assert!(TimeFrame::minutes(60).is_err());
        assert!(TimeFrame::hours(24).is_err());
        assert!(TimeFrame::months(5).is_err());
        assert!("2Day".parse::<TimeFrame>().is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!("".parse::<TimeFrame>().is_err());
        assert!("Min".parse::<TimeFrame>().is_err());
        assert!("15".parse::<TimeFrame>().is_err());
        assert!("15Fortnight".parse::<TimeFrame>().is_err());
    }

    #[test]
    fn error_messages_name_the_rule() {
        match TimeFrame::minutes(60) {
            Err(TimeFrameError::InvalidAmount { unit, message }) => {
                assert_eq!(unit, TimeFrameUnit::Minute);
                assert!(message.contains("1-59"));
            }
            other => panic!("expected InvalidAmount, got {other:?}"),
        }
    }
}
