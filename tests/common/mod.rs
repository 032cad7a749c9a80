#![allow(dead_code)]

use chrono::NaiveDate;
use overnight::domain::backtest::{BacktestConfig, InstrumentSource};
use overnight::domain::error::OvernightError;
pub use overnight::domain::bar::Bar;
use overnight::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, source: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(source.to_string(), bars);
        self
    }

    pub fn with_error(mut self, source: &str, reason: &str) -> Self {
        self.errors.insert(source.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn missing_sources(&self, sources: &[&str]) -> Vec<String> {
        sources
            .iter()
            .filter(|s| !self.data.contains_key(**s) && !self.errors.contains_key(**s))
            .map(|s| s.to_string())
            .collect()
    }

    fn fetch_bars(&self, source: &str) -> Result<Vec<Bar>, OvernightError> {
        if let Some(reason) = self.errors.get(source) {
            return Err(OvernightError::Schema {
                input: source.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(source).cloned().unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn day(i: usize) -> NaiveDate {
    date(2024, 1, 1) + chrono::Duration::days(i as i64)
}

/// Config pointing at "qqq", "spy" and "xlk" sources, starting in 2024.
pub fn sample_config() -> BacktestConfig {
    BacktestConfig {
        anchor: InstrumentSource::new("QQQ", "qqq"),
        confirms: vec![
            InstrumentSource::new("SPY", "spy"),
            InstrumentSource::new("XLK", "xlk"),
        ],
        start_date: date(2024, 1, 1),
        ..BacktestConfig::default()
    }
}

/// Bars on consecutive days where each open gaps `gaps[i]` away from the
/// previous close: open[i] = close[i-1] * (1 + gaps[i]).
pub fn bars_from_gaps(closes: &[f64], gaps: &[f64]) -> Vec<Bar> {
    assert_eq!(closes.len(), gaps.len());
    (0..closes.len())
        .map(|i| {
            let open = if i == 0 {
                closes[0] - 0.5
            } else {
                closes[i - 1] * (1.0 + gaps[i])
            };
            Bar::new(day(i), open, closes[i])
        })
        .collect()
}

pub fn generate_bars(start: NaiveDate, count: usize, start_price: f64) -> Vec<Bar> {
    (0..count)
        .map(|i| {
            let p = start_price + i as f64;
            Bar::new(start + chrono::Duration::days(i as i64), p - 0.25, p)
        })
        .collect()
}

/// Three 30-row series with hand-placed features.
///
/// QQQ closes rise by one a day from 100, except a dip to 90 on row 24 and
/// a flat, gapless row 26 (close 125, open 125). Default overnight gap is
/// +0.1% everywhere; QQQ gaps 1% on row 5 and 0.4% on row 12.
/// SPY and XLK close flat (50 and 20). SPY gaps +0.5% on row 8, -0.2% on
/// row 23 and -0.1% on row 29; XLK gaps +0.36% on row 15, -0.1% on row 23
/// and +0.2% on row 29.
pub struct Scenario {
    pub qqq: Vec<Bar>,
    pub spy: Vec<Bar>,
    pub xlk: Vec<Bar>,
}

pub const SCENARIO_ROWS: usize = 30;

pub fn scenario() -> Scenario {
    let mut qqq_close: Vec<f64> = (0..SCENARIO_ROWS).map(|i| 100.0 + i as f64).collect();
    qqq_close[24] = 90.0;
    qqq_close[26] = 125.0;
    let mut qqq_gap = vec![0.001; SCENARIO_ROWS];
    qqq_gap[5] = 0.01;
    qqq_gap[12] = 0.004;
    qqq_gap[26] = 0.0;

    let mut spy_gap = vec![0.001; SCENARIO_ROWS];
    spy_gap[8] = 0.005;
    spy_gap[23] = -0.002;
    spy_gap[29] = -0.001;

    let mut xlk_gap = vec![0.001; SCENARIO_ROWS];
    xlk_gap[15] = 0.0036;
    xlk_gap[23] = -0.001;
    xlk_gap[29] = 0.002;

    Scenario {
        qqq: bars_from_gaps(&qqq_close, &qqq_gap),
        spy: bars_from_gaps(&[50.0; SCENARIO_ROWS], &spy_gap),
        xlk: bars_from_gaps(&[20.0; SCENARIO_ROWS], &xlk_gap),
    }
}

/// Rows where Trend + Breadth (SMA20) signals in [`scenario`].
///
/// Warmup holds rows 0-19. Row 23 fails breadth (both confirms gap down on
/// row 23), row 25 follows the dip below the average, row 27 follows the
/// flat gapless bar.
pub const TREND_BREADTH_SIGNAL_ROWS: [usize; 7] = [20, 21, 22, 24, 26, 28, 29];

/// Rows where Low-Volatility Confirmation (0.35%) does not signal in
/// [`scenario`]: row 0 has no previous close, rows 5 and 12 (QQQ), 8 (SPY)
/// and 15 (XLK) gap too far.
pub const LOW_VOL_QUIET_ROWS: [usize; 5] = [0, 5, 8, 12, 15];

impl Scenario {
    pub fn port(&self) -> MockDataPort {
        MockDataPort::new()
            .with_bars("qqq", self.qqq.clone())
            .with_bars("spy", self.spy.clone())
            .with_bars("xlk", self.xlk.clone())
    }

    /// QQQ overnight return from row i's close to row i+1's open.
    pub fn qqq_into_tomorrow(&self, i: usize) -> f64 {
        self.qqq[i + 1].open / self.qqq[i].close - 1.0
    }
}

/// Independent Sharpe / CAGR for a daily return series spanning `days`.
pub fn reference_stats(returns: &[f64], days: i64, annual_rf: f64) -> (f64, f64) {
    let n = returns.len() as f64;
    let excess: Vec<f64> = returns.iter().map(|r| r - annual_rf / 252.0).collect();
    let mean = excess.iter().sum::<f64>() / n;
    let std = (excess.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (n - 1.0)).sqrt();
    let sharpe = (mean * 252.0) / (std * 252.0_f64.sqrt());

    let growth: f64 = returns.iter().map(|r| 1.0 + r).product();
    let years = days as f64 / 365.25;
    let cagr = growth.powf(1.0 / years) - 1.0;
    (sharpe, cagr)
}

/// Write bars as a CSV file with the given header names.
pub fn bars_to_csv(bars: &[Bar], date_header: &str) -> String {
    let mut out = format!("{date_header},Open,High,Low,Close,Volume\n");
    for b in bars {
        let hi = b.open.max(b.close);
        let lo = b.open.min(b.close);
        out.push_str(&format!(
            "{},{},{},{},{},1000\n",
            b.date.format("%Y-%m-%d"),
            b.open,
            hi,
            lo,
            b.close
        ));
    }
    out
}
