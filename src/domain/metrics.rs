//! Performance statistics over a strategy's daily return series.

use chrono::NaiveDate;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const CALENDAR_DAYS_PER_YEAR: f64 = 365.25;

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceReport {
    pub sharpe_ratio: f64,
    pub cagr: f64,
    pub total_return: f64,
    pub years: f64,
    pub sample_length: usize,
    pub trade_count: usize,
}

impl PerformanceReport {
    /// Reduce one strategy run to its summary statistics.
    ///
    /// `dates`, `returns`, `equity` and `signals` are parallel columns of the
    /// same table.
    pub fn compute(
        dates: &[NaiveDate],
        returns: &[f64],
        equity: &[f64],
        signals: &[bool],
        risk_free_rate: f64,
    ) -> Self {
        let total_return = total_return(equity);
        let years = match (dates.first(), dates.last()) {
            (Some(&first), Some(&last)) => elapsed_years(first, last),
            _ => 0.0,
        };

        PerformanceReport {
            sharpe_ratio: sharpe_ratio(returns, risk_free_rate),
            cagr: cagr(total_return, years),
            total_return,
            years,
            sample_length: returns.len(),
            trade_count: signals.iter().filter(|&&s| s).count(),
        }
    }
}

/// Annualised Sharpe ratio of daily returns against an annual risk-free rate.
///
/// Uses the sample (n-1) standard deviation of excess returns. Zero when the
/// deviation is zero or undefined (fewer than two rows).
pub fn sharpe_ratio(returns: &[f64], annual_risk_free: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }

    let daily_rf = annual_risk_free / TRADING_DAYS_PER_YEAR;
    let excess: Vec<f64> = returns.iter().map(|r| r - daily_rf).collect();

    // Identical values can still leave rounding residue around their mean.
    if excess.iter().all(|&x| x == excess[0]) {
        return 0.0;
    }

    let n = excess.len() as f64;
    let mean = excess.iter().sum::<f64>() / n;
    let variance = excess.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);

    let annual_mean = mean * TRADING_DAYS_PER_YEAR;
    let annual_std = variance.sqrt() * TRADING_DAYS_PER_YEAR.sqrt();

    if annual_std > 0.0 {
        annual_mean / annual_std
    } else {
        0.0
    }
}

/// Final equity minus one; zero for an empty curve.
pub fn total_return(equity: &[f64]) -> f64 {
    equity.last().map(|e| e - 1.0).unwrap_or(0.0)
}

pub fn elapsed_years(first: NaiveDate, last: NaiveDate) -> f64 {
    (last - first).num_days() as f64 / CALENDAR_DAYS_PER_YEAR
}

/// (1 + total_return)^(1/years) - 1, or zero when no time has elapsed.
pub fn cagr(total_return: f64, years: f64) -> f64 {
    if years > 0.0 && total_return.is_finite() {
        (1.0 + total_return).powf(1.0 / years) - 1.0
    } else {
        0.0
    }
}
