//! Canonical per-instrument series.
//!
//! Raw bars come in from a [`DataPort`](crate::ports::data_port::DataPort) in
//! whatever order the source holds them. A canonical series is filtered to the
//! start date, sorted ascending, checked for duplicate dates and carries the
//! derived overnight returns.

use crate::domain::bar::{derive_overnight, Bar, SeriesBar};
use crate::domain::error::OvernightError;
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct CanonicalSeries {
    pub symbol: String,
    pub bars: Vec<SeriesBar>,
    pub date_index: HashMap<NaiveDate, usize>,
}

impl CanonicalSeries {
    /// Build a canonical series from raw bars.
    ///
    /// `input` names the data source in error messages. Duplicate dates that
    /// survive the start-date filter are an error rather than being dropped.
    pub fn from_bars(
        symbol: &str,
        input: &str,
        mut raw: Vec<Bar>,
        start_date: NaiveDate,
    ) -> Result<Self, OvernightError> {
        raw.retain(|b| b.date >= start_date);
        raw.sort_by_key(|b| b.date);

        if let Some(w) = raw.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(OvernightError::DuplicateDate {
                input: input.to_string(),
                date: w[0].date,
            });
        }

        let bars = derive_overnight(&raw);
        let date_index = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| (bar.date, i))
            .collect();

        Ok(Self {
            symbol: symbol.to_string(),
            bars,
            date_index,
        })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn get_bar(&self, date: NaiveDate) -> Option<&SeriesBar> {
        self.date_index.get(&date).map(|&i| &self.bars[i])
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.bars.iter().map(|b| b.date)
    }
}
