//! Backtest pipeline: load, align, signal, account, evaluate.
//!
//! [`BacktestConfig`] carries every tunable; nothing below reads globals.

use crate::domain::align::{align, CommonTable, JoinPolicy};
use crate::domain::error::OvernightError;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::metrics::PerformanceReport;
use crate::domain::returns::{equity_curve, forward_assigned_returns, lagged_returns};
use crate::domain::series::CanonicalSeries;
use crate::domain::signal::{low_vol_signals, trend_breadth_signals, StrategyKind};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;
pub const DEFAULT_SMA_WINDOW: usize = 20;
pub const DEFAULT_OVERNIGHT_THRESHOLD: f64 = 0.0035;

pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2006, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// A named instrument and where its bars live.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentSource {
    pub symbol: String,
    pub path: String,
}

impl InstrumentSource {
    pub fn new(symbol: &str, path: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            path: path.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub anchor: InstrumentSource,
    pub confirms: Vec<InstrumentSource>,
    pub start_date: NaiveDate,
    pub risk_free_rate: f64,
    pub sma_window: usize,
    pub overnight_threshold: f64,
    pub trend_breadth_join: JoinPolicy,
    pub low_vol_join: JoinPolicy,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            anchor: InstrumentSource::new("QQQ", "4 - QQQ.csv"),
            confirms: vec![
                InstrumentSource::new("SPY", "4 - SPY.csv"),
                InstrumentSource::new("XLK", "4 - XLK.csv"),
            ],
            start_date: default_start_date(),
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            sma_window: DEFAULT_SMA_WINDOW,
            overnight_threshold: DEFAULT_OVERNIGHT_THRESHOLD,
            trend_breadth_join: StrategyKind::TrendBreadth.default_join_policy(),
            low_vol_join: StrategyKind::LowVolConfirm.default_join_policy(),
        }
    }
}

impl BacktestConfig {
    pub fn join_policy(&self, kind: StrategyKind) -> JoinPolicy {
        match kind {
            StrategyKind::TrendBreadth => self.trend_breadth_join,
            StrategyKind::LowVolConfirm => self.low_vol_join,
        }
    }

    /// Anchor first, then confirming instruments in order.
    pub fn sources(&self) -> impl Iterator<Item = &InstrumentSource> {
        std::iter::once(&self.anchor).chain(self.confirms.iter())
    }

    /// Human-readable name of a strategy under this configuration.
    pub fn strategy_label(&self, kind: StrategyKind) -> String {
        let confirms: Vec<&str> = self.confirms.iter().map(|s| s.symbol.as_str()).collect();
        match kind {
            StrategyKind::TrendBreadth => format!(
                "SMA{} + {} overnight filter",
                self.sma_window,
                confirms.join("/")
            ),
            StrategyKind::LowVolConfirm => {
                let all: Vec<&str> = self.sources().map(|s| s.symbol.as_str()).collect();
                format!(
                    "{} overnight < {:.2}% confirmation",
                    all.join("/"),
                    self.overnight_threshold * 100.0
                )
            }
        }
    }
}

/// Canonical series for the anchor and each confirming instrument.
#[derive(Debug, Clone)]
pub struct LoadedUniverse {
    pub anchor: CanonicalSeries,
    pub confirms: Vec<CanonicalSeries>,
}

/// Everything one strategy run produced, column by column.
#[derive(Debug, Clone)]
pub struct StrategyRun {
    pub kind: StrategyKind,
    pub label: String,
    pub table: CommonTable,
    /// Moving average of the anchor close; only Trend + Breadth computes it.
    pub sma: Option<Vec<Option<f64>>>,
    pub signals: Vec<bool>,
    pub returns: Vec<f64>,
    pub equity: Vec<f64>,
    pub report: PerformanceReport,
}

/// Check every source up front, then load and canonicalise each one.
///
/// All missing sources are reported together before any file is parsed.
pub fn load_universe(
    data_port: &dyn DataPort,
    config: &BacktestConfig,
) -> Result<LoadedUniverse, OvernightError> {
    let paths: Vec<&str> = config.sources().map(|s| s.path.as_str()).collect();
    let missing = data_port.missing_sources(&paths);
    if !missing.is_empty() {
        return Err(OvernightError::MissingInput { paths: missing });
    }

    let load = |source: &InstrumentSource| -> Result<CanonicalSeries, OvernightError> {
        let raw = data_port.fetch_bars(&source.path)?;
        let series =
            CanonicalSeries::from_bars(&source.symbol, &source.path, raw, config.start_date)?;
        debug!(
            symbol = %source.symbol,
            path = %source.path,
            bars = series.len(),
            "loaded series"
        );
        Ok(series)
    };

    let anchor = load(&config.anchor)?;
    let confirms = config
        .confirms
        .iter()
        .map(load)
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        anchor = %anchor.symbol,
        confirms = confirms.len(),
        start_date = %config.start_date,
        "loaded {} instrument(s)",
        confirms.len() + 1
    );

    Ok(LoadedUniverse { anchor, confirms })
}

/// Run one strategy over an already loaded universe.
pub fn run_strategy(
    kind: StrategyKind,
    universe: &LoadedUniverse,
    config: &BacktestConfig,
) -> Result<StrategyRun, OvernightError> {
    let policy = config.join_policy(kind);
    let table = align(&universe.anchor, &universe.confirms, policy);
    if table.is_empty() {
        return Err(OvernightError::EmptySample {
            strategy: kind.id().to_string(),
        });
    }
    info!(
        strategy = %kind,
        join = %policy,
        anchor = %table.anchor,
        confirms = %table.confirm_symbols.join("/"),
        rows = table.len(),
        "aligned common table"
    );

    let into_tomorrow: Vec<Option<f64>> =
        table.rows.iter().map(|r| r.overnight_into_tomorrow).collect();

    let (sma, signals, returns) = match kind {
        StrategyKind::TrendBreadth => {
            let sma = calculate_sma(&table.closes(), config.sma_window);
            let signals = trend_breadth_signals(&table, &sma);
            let returns = lagged_returns(&signals, &into_tomorrow);
            (Some(sma), signals, returns)
        }
        StrategyKind::LowVolConfirm => {
            let signals = low_vol_signals(&table, config.overnight_threshold);
            let returns = forward_assigned_returns(&signals, &into_tomorrow);
            (None, signals, returns)
        }
    };

    let equity = equity_curve(&returns);
    let report = PerformanceReport::compute(
        &table.dates(),
        &returns,
        &equity,
        &signals,
        config.risk_free_rate,
    );

    if report.sharpe_ratio == 0.0 && report.sample_length > 1 {
        warn!(strategy = %kind, "excess returns have zero variance; Sharpe ratio reported as 0");
    }
    info!(
        strategy = %kind,
        trades = report.trade_count,
        days = report.sample_length,
        "strategy evaluated"
    );

    Ok(StrategyRun {
        kind,
        label: config.strategy_label(kind),
        table,
        sma,
        signals,
        returns,
        equity,
        report,
    })
}

/// Load once, then evaluate each requested strategy in order.
pub fn run_backtest(
    data_port: &dyn DataPort,
    config: &BacktestConfig,
    kinds: &[StrategyKind],
) -> Result<Vec<StrategyRun>, OvernightError> {
    let universe = load_universe(data_port, config)?;
    kinds
        .iter()
        .map(|&kind| run_strategy(kind, &universe, config))
        .collect()
}
