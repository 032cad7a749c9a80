//! Date alignment of the anchor series with its confirming series.

use crate::domain::bar::SeriesBar;
use crate::domain::series::CanonicalSeries;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// How confirming series are joined onto the anchor's dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinPolicy {
    /// Keep every anchor date; confirming fields are absent where unmatched.
    Left,
    /// Keep only dates present in every series.
    Inner,
}

impl JoinPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinPolicy::Left => "left",
            JoinPolicy::Inner => "inner",
        }
    }
}

impl fmt::Display for JoinPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JoinPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "left" => Ok(JoinPolicy::Left),
            "inner" => Ok(JoinPolicy::Inner),
            other => Err(format!("unknown join policy '{other}' (expected left or inner)")),
        }
    }
}

/// A confirming instrument's overnight returns on one common-table row.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConfirmFields {
    pub overnight_into_today: Option<f64>,
    pub overnight_into_tomorrow: Option<f64>,
}

impl From<&SeriesBar> for ConfirmFields {
    fn from(bar: &SeriesBar) -> Self {
        Self {
            overnight_into_today: bar.overnight_into_today,
            overnight_into_tomorrow: bar.overnight_into_tomorrow,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommonRow {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    pub overnight_into_today: Option<f64>,
    pub overnight_into_tomorrow: Option<f64>,
    /// One entry per confirming instrument, in configuration order.
    pub confirms: Vec<ConfirmFields>,
}

impl CommonRow {
    /// close > open
    pub fn is_green(&self) -> bool {
        self.close > self.open
    }
}

/// One row per retained anchor date, ascending, positionally indexed.
#[derive(Debug, Clone)]
pub struct CommonTable {
    pub anchor: String,
    pub confirm_symbols: Vec<String>,
    pub policy: JoinPolicy,
    pub rows: Vec<CommonRow>,
}

impl CommonTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.close).collect()
    }
}

/// Join `confirms` onto `anchor` by date under `policy`.
///
/// The anchor's derived fields were computed over its own full series, so an
/// inner join that drops rows does not re-shift them.
pub fn align(anchor: &CanonicalSeries, confirms: &[CanonicalSeries], policy: JoinPolicy) -> CommonTable {
    let rows = anchor
        .bars
        .iter()
        .filter_map(|bar| {
            let matched: Vec<Option<&SeriesBar>> =
                confirms.iter().map(|c| c.get_bar(bar.date)).collect();

            if policy == JoinPolicy::Inner && matched.iter().any(Option::is_none) {
                return None;
            }

            Some(CommonRow {
                date: bar.date,
                open: bar.open,
                close: bar.close,
                overnight_into_today: bar.overnight_into_today,
                overnight_into_tomorrow: bar.overnight_into_tomorrow,
                confirms: matched
                    .into_iter()
                    .map(|m| m.map(ConfirmFields::from).unwrap_or_default())
                    .collect(),
            })
        })
        .collect();

    CommonTable {
        anchor: anchor.symbol.clone(),
        confirm_symbols: confirms.iter().map(|c| c.symbol.clone()).collect(),
        policy,
        rows,
    }
}
