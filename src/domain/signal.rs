//! Entry signals for the two overnight strategies.
//!
//! Trend + Breadth reads only the previous row, because everything it looks
//! at (close, moving average, bar colour) is known after that row closes.
//! Low-Volatility Confirmation reads the current row's overnight return,
//! which is already realised at the row's open.

use crate::domain::align::{CommonRow, CommonTable, JoinPolicy};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    TrendBreadth,
    LowVolConfirm,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 2] = [StrategyKind::TrendBreadth, StrategyKind::LowVolConfirm];

    /// Identifier used in config sections and key-value output.
    pub fn id(&self) -> &'static str {
        match self {
            StrategyKind::TrendBreadth => "trend_breadth",
            StrategyKind::LowVolConfirm => "low_vol",
        }
    }

    pub fn default_join_policy(&self) -> JoinPolicy {
        match self {
            StrategyKind::TrendBreadth => JoinPolicy::Left,
            StrategyKind::LowVolConfirm => JoinPolicy::Inner,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "trend_breadth" => Ok(StrategyKind::TrendBreadth),
            "low_vol" | "low_vol_confirm" => Ok(StrategyKind::LowVolConfirm),
            other => Err(format!("unknown strategy '{other}'")),
        }
    }
}

/// Trend + Breadth entry signal for every row of `table`.
///
/// `sma` is the moving average of the anchor close, aligned with `table.rows`.
/// Row i signals iff, on row i-1: close > SMA, the bar was green or its
/// overnight return into that day was positive, and at least one confirming
/// instrument's overnight return into the following day was positive.
pub fn trend_breadth_signals(table: &CommonTable, sma: &[Option<f64>]) -> Vec<bool> {
    debug_assert_eq!(table.rows.len(), sma.len());

    (0..table.rows.len())
        .map(|i| {
            let Some(p) = i.checked_sub(1) else {
                return false;
            };
            let prev = &table.rows[p];

            let above_trend = sma[p].is_some_and(|avg| prev.close > avg);
            let momentum = prev.is_green() || is_positive(prev.overnight_into_today);
            let breadth = prev
                .confirms
                .iter()
                .any(|c| is_positive(c.overnight_into_tomorrow));

            above_trend && momentum && breadth
        })
        .collect()
}

/// Low-Volatility Confirmation signal for a single row.
///
/// True iff the anchor's and every confirming instrument's overnight return
/// into this row is strictly below `threshold`. An absent return never
/// qualifies.
pub fn low_vol_row_signal(row: &CommonRow, threshold: f64) -> bool {
    let below = |r: Option<f64>| r.is_some_and(|v| v < threshold);
    below(row.overnight_into_today) && row.confirms.iter().all(|c| below(c.overnight_into_today))
}

pub fn low_vol_signals(table: &CommonTable, threshold: f64) -> Vec<bool> {
    table
        .rows
        .iter()
        .map(|row| low_vol_row_signal(row, threshold))
        .collect()
}

fn is_positive(value: Option<f64>) -> bool {
    value.is_some_and(|v| v > 0.0)
}
