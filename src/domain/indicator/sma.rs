//! Simple Moving Average.
//!
//! SMA(n)[i] = sum(x[i-j] for j in 0..n) / n
//! Warmup: first (n-1) points are undefined.

pub fn calculate_sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }
    let warmup = period - 1;

    (0..values.len())
        .map(|i| {
            if i < warmup {
                return None;
            }
            let window = &values[i + 1 - period..=i];
            Some(window.iter().sum::<f64>() / period as f64)
        })
        .collect()
}
