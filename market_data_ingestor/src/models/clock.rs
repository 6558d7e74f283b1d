use chrono::{DateTime, Utc};

/// Snapshot of the market clock as reported by an authenticated provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketClock {
    /// Provider's current time.
    pub timestamp: DateTime<Utc>,
    /// Whether the regular session is open right now.
    pub is_open: bool,
    pub next_open: DateTime<Utc>,
    pub next_close: DateTime<Utc>,
}
