//! Signal-to-return accounting and the compounded equity curve.
//!
//! Absent overnight returns become zero here and nowhere earlier.

/// Trend + Breadth accounting.
///
/// return[i] = signal[i-1] * into_tomorrow[i-1]; row 0 has no predecessor and
/// earns zero.
pub fn lagged_returns(signals: &[bool], into_tomorrow: &[Option<f64>]) -> Vec<f64> {
    debug_assert_eq!(signals.len(), into_tomorrow.len());

    (0..signals.len())
        .map(|i| match i.checked_sub(1) {
            Some(p) if signals[p] => into_tomorrow[p].unwrap_or(0.0),
            _ => 0.0,
        })
        .collect()
}

/// Low-Volatility Confirmation accounting.
///
/// A signal on row i books into_tomorrow[i] on row i+1. Built into a fresh
/// vector from the completed signal column; a signal on the last row has no
/// row to land on and is dropped.
pub fn forward_assigned_returns(signals: &[bool], into_tomorrow: &[Option<f64>]) -> Vec<f64> {
    debug_assert_eq!(signals.len(), into_tomorrow.len());

    let mut returns = vec![0.0; signals.len()];
    for (i, slot) in returns.iter_mut().enumerate().skip(1) {
        if signals[i - 1] {
            *slot = into_tomorrow[i - 1].unwrap_or(0.0);
        }
    }
    returns
}

/// equity[k] = equity[k-1] * (1 + return[k]), seeded at 1.0 before row 0.
pub fn equity_curve(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0_f64, |equity, r| {
            *equity *= 1.0 + r;
            Some(*equity)
        })
        .collect()
}
