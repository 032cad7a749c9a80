//! CSV file data adapter.
//!
//! Header names are matched case-insensitively; the date column may be
//! called `date` or `time`. Resolution happens once per file into a
//! [`ColumnMap`] so nothing downstream sees raw header names.

use crate::domain::bar::Bar;
use crate::domain::error::OvernightError;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, source: &str) -> PathBuf {
        self.base_path.join(source)
    }
}

/// Positions of the required columns within a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: usize,
    pub open: usize,
    pub close: usize,
}

impl ColumnMap {
    /// Resolve required columns from a header row.
    ///
    /// A `date` column wins over a `time` column when both are present.
    pub fn resolve<'a, I>(headers: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let names: Vec<String> = headers
            .into_iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_lowercase())
            .collect();
        let find = |name: &str| names.iter().position(|n| n == name);

        let date = find("date").or_else(|| find("time"));
        let open = find("open");
        let close = find("close");

        match (date, open, close) {
            (Some(date), Some(open), Some(close)) => Ok(Self { date, open, close }),
            _ => {
                let mut missing = Vec::new();
                if date.is_none() {
                    missing.push("date/time");
                }
                if open.is_none() {
                    missing.push("open");
                }
                if close.is_none() {
                    missing.push("close");
                }
                Err(format!("missing column(s): {}", missing.join(", ")))
            }
        }
    }
}

/// Shortest integer read as Unix epoch seconds (1973-03-03 onwards).
const MIN_EPOCH_DIGITS: usize = 9;

/// Parse a date cell. Accepts plain dates, compact `YYYYMMDD`, naive
/// datetimes, RFC 3339 timestamps and integer Unix epoch seconds.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        return match value.len() {
            8 => NaiveDate::parse_from_str(value, "%Y%m%d").ok(),
            n if n >= MIN_EPOCH_DIGITS => value
                .parse::<i64>()
                .ok()
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .map(|dt| dt.date_naive()),
            _ => None,
        };
    }

    if let Some(d) = DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(value, f).ok())
    {
        return Some(d);
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
    {
        return Some(dt.date());
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.date_naive())
}

fn parse_price(value: Option<&str>, column: &str, line: u64, source: &str) -> Result<f64, OvernightError> {
    let raw = value.ok_or_else(|| {
        OvernightError::schema(source, format!("line {line}: missing {column} value"))
    })?;
    let price: f64 = raw.trim().parse().map_err(|e| {
        OvernightError::schema(source, format!("line {line}: invalid {column} value '{raw}': {e}"))
    })?;
    if !price.is_finite() || price <= 0.0 {
        return Err(OvernightError::schema(
            source,
            format!("line {line}: {column} must be a positive number, got {raw}"),
        ));
    }
    Ok(price)
}

impl DataPort for CsvAdapter {
    fn missing_sources(&self, sources: &[&str]) -> Vec<String> {
        sources
            .iter()
            .filter(|s| !self.csv_path(s).exists())
            .map(|s| s.to_string())
            .collect()
    }

    fn fetch_bars(&self, source: &str) -> Result<Vec<Bar>, OvernightError> {
        let path = self.csv_path(source);
        let content = fs::read_to_string(&path)
            .map_err(|e| OvernightError::schema(source, format!("unreadable file: {e}")))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| OvernightError::schema(source, format!("unreadable header: {e}")))?
            .clone();
        let columns = ColumnMap::resolve(headers.iter())
            .map_err(|reason| OvernightError::schema(source, reason))?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record =
                result.map_err(|e| OvernightError::schema(source, format!("CSV parse error: {e}")))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let date_str = record.get(columns.date).unwrap_or_default();
            let date = parse_date(date_str).ok_or_else(|| {
                OvernightError::schema(source, format!("line {line}: invalid date '{date_str}'"))
            })?;

            let open = parse_price(record.get(columns.open), "open", line, source)?;
            let close = parse_price(record.get(columns.close), "close", line, source)?;

            bars.push(Bar { date, open, close });
        }

        Ok(bars)
    }
}
