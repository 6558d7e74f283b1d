//! Time zone parsing and reference-moment arithmetic.
//!
//! What this module provides:
//! - [`parse_timezone`]: IANA name to [`chrono_tz::Tz`].
//! - [`localize`]: naive wall time to an instant in a zone (earliest at fall-back).
//! - [`parse_moment`]: RFC-3339 (any offset) or naive local time, expressed in the working zone.
//! - [`snap_to_bucket`] / [`last_closed_bar_end`]: where a bars request should end.
//!
//! Snapping happens on the local wall clock: 10:37:42 on `15Min` snaps to
//! 10:30, and the last closed bar window ends one minute earlier at 10:29.

use anyhow::{Context, anyhow};
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Timelike};
use chrono_tz::Tz;
use market_data_ingestor::models::timeframe::{TimeFrame, TimeFrameUnit};

/// Parses an IANA zone name such as `America/New_York`.
pub fn parse_timezone(name: &str) -> anyhow::Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| anyhow!("{e}"))
        .with_context(|| format!("bad tz: {name}"))
}

/// Resolves a naive local time in `tz`.
///
/// The repeated hour at fall-back resolves to its first occurrence. Wall
/// times skipped by spring-forward are an error.
pub fn localize(naive: NaiveDateTime, tz: Tz) -> anyhow::Result<DateTime<Tz>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .with_context(|| format!("nonexistent local time {naive} in {}", tz.name()))
}

/// Parses a reference moment.
///
/// RFC-3339 input keeps its instant and is shown in `tz`. Naive input
/// (`2025-03-03T10:37:00`, `2025-03-03 10:37`) is read as wall time in `tz`;
/// the repeated hour at fall-back resolves to its first occurrence.
pub fn parse_moment(s: &str, tz: Tz) -> anyhow::Result<DateTime<Tz>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&tz));
    }
    let naive = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .with_context(|| format!("bad moment: {s} (expected RFC-3339 or YYYY-MM-DD HH:MM[:SS])"))?;
    localize(naive, tz)
}

/// Drops seconds and sub-seconds, then for minute timeframes rounds the
/// minute down to a multiple of the timeframe amount.
pub fn snap_to_bucket(moment: DateTime<Tz>, timeframe: TimeFrame) -> DateTime<Tz> {
    let truncated = moment
        - Duration::seconds(i64::from(moment.second()))
        - Duration::nanoseconds(i64::from(moment.nanosecond()));
    match timeframe.unit {
        TimeFrameUnit::Minute if timeframe.amount > 1 => {
            let excess = truncated.minute() % timeframe.amount;
            truncated - Duration::minutes(i64::from(excess))
        }
        _ => truncated,
    }
}

/// End of the request window for `timeframe` at `moment`: the snapped bucket
/// start minus one minute, so the still-forming bar is excluded.
pub fn last_closed_bar_end(moment: DateTime<Tz>, timeframe: TimeFrame) -> DateTime<Tz> {
    snap_to_bucket(moment, timeframe) - Duration::minutes(1)
}
