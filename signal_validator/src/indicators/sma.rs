/// Simple moving average over the trailing `window` values.
///
/// Positions with fewer than `window` values behind them are `None`; a zero
/// window yields all `None`.
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                let slice = &values[i + 1 - window..=i];
                Some(slice.iter().sum::<f64>() / window as f64)
            }
        })
        .collect()
}
