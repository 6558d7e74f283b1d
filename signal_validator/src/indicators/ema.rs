/// Exponential Moving Average — incremental computation.
///
/// Matches pandas `ewm(span=window, adjust=False, min_periods=window).mean()`:
///
///   bar 0  → value = price (first observation)
///   bar 1+ → value = α·price + (1−α)·prev   where α = 2/(window+1)
///
/// [`Ema::update`] returns `None` until `window` observations have been seen.
#[derive(Debug, Clone)]
pub struct Ema {
    alpha: f64,
    value: f64,
    window: usize,
    count: usize,
}

impl Ema {
    /// New average for the given span.
    pub fn new(window: usize) -> Self {
        Self {
            alpha: 2.0 / (window as f64 + 1.0),
            value: 0.0,
            window,
            count: 0,
        }
    }

    /// Feed one observation, return the EMA once warm.
    pub fn update(&mut self, price: f64) -> Option<f64> {
        if self.count == 0 {
            // First bar: seed with the observation itself (adjust=False)
            self.value = price;
        } else {
            self.value = self.alpha * price + (1.0 - self.alpha) * self.value;
        }
        self.count += 1;
        self.is_warm().then_some(self.value)
    }

    /// True once `window` observations have been fed.
    pub fn is_warm(&self) -> bool {
        self.count >= self.window
    }
}

/// EMA over a series whose leading entries may be undefined.
///
/// Undefined entries before the first defined one are skipped (the first
/// defined value seeds the average); undefined entries after that stay `None`
/// without advancing the average.
pub fn ema(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut avg = Ema::new(window);
    values
        .iter()
        .map(|v| v.and_then(|x| avg.update(x)))
        .collect()
}
