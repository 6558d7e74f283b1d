//! Single-bar shape: how much of the high/low range the open/close body covers.

use market_data_ingestor::models::bar::Bar;

/// Body/range ratio at or above which a bar counts as body-dominant.
pub const DEFAULT_DOMINANCE_THRESHOLD: f64 = 0.65;

/// Fraction of the bar's range occupied by its body; 0 for a flat or inverted bar.
pub fn dominance_ratio(bar: &Bar) -> f64 {
    let range = bar.range();
    if range > 0.0 { bar.body() / range } else { 0.0 }
}

/// True when the body covers at least `threshold` of the range (inclusive).
///
/// A bar with zero range is never dominant, whatever the threshold.
pub fn is_body_dominant(bar: &Bar, threshold: f64) -> bool {
    let range = bar.range();
    if range == 0.0 {
        return false;
    }
    bar.body() / range >= threshold
}
