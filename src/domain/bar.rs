//! Daily price bars and their derived overnight returns.

use chrono::NaiveDate;

/// One instrument, one trading day, as read from the data source.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
}

impl Bar {
    pub fn new(date: NaiveDate, open: f64, close: f64) -> Self {
        Self { date, open, close }
    }
}

/// A bar positioned inside a canonical series, with the neighbour-derived
/// fields filled in. Shifts are by position, not by calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesBar {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    pub prev_close: Option<f64>,
    pub next_open: Option<f64>,
    /// open / prev_close - 1
    pub overnight_into_today: Option<f64>,
    /// next_open / close - 1
    pub overnight_into_tomorrow: Option<f64>,
}

/// Attach shift-by-one fields to an already sorted run of bars.
pub fn derive_overnight(bars: &[Bar]) -> Vec<SeriesBar> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let prev_close = i.checked_sub(1).map(|p| bars[p].close);
            let next_open = bars.get(i + 1).map(|b| b.open);
            SeriesBar {
                date: bar.date,
                open: bar.open,
                close: bar.close,
                prev_close,
                next_open,
                overnight_into_today: prev_close.map(|pc| bar.open / pc - 1.0),
                overnight_into_tomorrow: next_open.map(|no| no / bar.close - 1.0),
            }
        })
        .collect()
}
