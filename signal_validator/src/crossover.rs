//! MACD/signal crossover detection.
//!
//! Policy: most-recent-first, first match wins. Adjacent rows are scanned from
//! the newest pair backwards and the first strict crossing is reported; the
//! size of the crossing never matters.

use chrono::DateTime;
use chrono_tz::Tz;

use crate::{direction::Direction, series::IndicatorRow};

/// Where MACD crossed its signal line, stamped with the row after the cross.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossoverEvent {
    /// Timestamp of the first row on the new side of the signal line.
    pub timestamp: DateTime<Tz>,
    /// CALL for an upward cross, PUT for a downward one.
    pub direction: Direction,
}

/// Every crossover in `rows`, newest first.
///
/// Touching the signal line without moving through it is not a crossover.
pub fn crossovers_newest_first(rows: &[IndicatorRow]) -> impl Iterator<Item = CrossoverEvent> + '_ {
    rows.windows(2).rev().filter_map(|pair| {
        let (prev, cur) = (&pair[0], &pair[1]);
        let direction = if prev.macd < prev.signal && cur.macd > cur.signal {
            Direction::Call
        } else if prev.macd > prev.signal && cur.macd < cur.signal {
            Direction::Put
        } else {
            return None;
        };
        Some(CrossoverEvent {
            timestamp: cur.timestamp,
            direction,
        })
    })
}

/// The most recent crossover, if any.
pub fn last_crossover(rows: &[IndicatorRow]) -> Option<CrossoverEvent> {
    crossovers_newest_first(rows).next()
}
