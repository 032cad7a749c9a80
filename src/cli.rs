//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::console_report::{ConsoleReport, ReportFormat};
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::align::JoinPolicy;
use crate::domain::backtest::{run_backtest, BacktestConfig, InstrumentSource};
use crate::domain::config_validation::{parse_date, validate_backtest_config, validate_config_file};
use crate::domain::error::OvernightError;
use crate::domain::signal::StrategyKind;
use crate::logging::init_logging;
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "overnight", about = "Overnight-gap strategy backtester")]
pub struct Cli {
    /// Anchor instrument CSV (default: "4 - QQQ.csv")
    pub anchor: Option<String>,
    /// First confirming instrument CSV (default: "4 - SPY.csv")
    pub confirm_1: Option<String>,
    /// Second confirming instrument CSV (default: "4 - XLK.csv")
    pub confirm_2: Option<String>,

    /// INI file with [inputs], [backtest], [trend_breadth] and [low_vol] sections
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Directory that relative input paths are resolved against
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = StrategyChoice::All)]
    pub strategy: StrategyChoice,
    /// Annual risk-free rate, e.g. 0.02
    #[arg(long)]
    pub risk_free_rate: Option<f64>,
    /// Moving-average window for the trend filter
    #[arg(long)]
    pub sma_window: Option<usize>,
    /// Overnight-return ceiling for the low-volatility filter, e.g. 0.0035
    #[arg(long)]
    pub threshold: Option<f64>,
    /// Drop bars before this date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyChoice {
    TrendBreadth,
    LowVol,
    All,
}

impl StrategyChoice {
    pub fn kinds(&self) -> Vec<StrategyKind> {
        match self {
            StrategyChoice::TrendBreadth => vec![StrategyKind::TrendBreadth],
            StrategyChoice::LowVol => vec![StrategyKind::LowVolConfirm],
            StrategyChoice::All => StrategyKind::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Kv,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ReportFormat::Text,
            OutputFormat::Kv => ReportFormat::KeyValue,
        }
    }
}

pub fn run(cli: Cli) -> ExitCode {
    // A second init (e.g. under a test harness) is harmless.
    let _ = init_logging(&cli.log_level);

    let (config, data_dir) = match resolve_config(&cli) {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let data_port = CsvAdapter::new(data_dir);
    let stdout = io::stdout();
    let mut report = ConsoleReport::new(stdout.lock(), cli.format.into());

    match run_pipeline(&data_port, &config, &cli.strategy.kinds(), &mut report) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Run every requested strategy, writing reports only once all succeed.
pub fn run_pipeline(
    data_port: &dyn crate::ports::data_port::DataPort,
    config: &BacktestConfig,
    kinds: &[StrategyKind],
    report: &mut dyn ReportPort,
) -> Result<(), OvernightError> {
    let runs = run_backtest(data_port, config, kinds)?;
    report.write_all(&runs)
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, OvernightError> {
    FileConfigAdapter::from_file(path).map_err(|e| OvernightError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Merge defaults, the optional INI file and command-line overrides.
pub fn resolve_config(cli: &Cli) -> Result<(BacktestConfig, PathBuf), OvernightError> {
    let (mut config, mut data_dir) = match &cli.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            let adapter = load_config(path)?;
            validate_config_file(&adapter)?;
            let config = build_backtest_config(&adapter)?;
            let data_dir = adapter.get_string("inputs", "data_dir").map(PathBuf::from);
            (config, data_dir)
        }
        None => (BacktestConfig::default(), None),
    };

    if let Some(dir) = &cli.data_dir {
        data_dir = Some(dir.clone());
    }
    apply_overrides(&mut config, cli);
    validate_backtest_config(&config)?;

    Ok((config, data_dir.unwrap_or_else(|| PathBuf::from("."))))
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, OvernightError> {
    let defaults = BacktestConfig::default();

    let anchor = read_source(adapter, "anchor", &defaults.anchor);
    let mut confirms = Vec::new();
    for n in 1.. {
        let key = format!("confirm_{n}");
        match defaults.confirms.get(n - 1) {
            Some(default) => confirms.push(read_source(adapter, &key, default)),
            None => match adapter.get_string("inputs", &key) {
                Some(path) => {
                    let fallback = InstrumentSource::new(&format!("CONFIRM{n}"), &path);
                    confirms.push(read_source(adapter, &key, &fallback));
                }
                None => break,
            },
        }
    }

    let start_date = match adapter.get_string("backtest", "start_date") {
        Some(value) => parse_date(&value, "backtest", "start_date")?,
        None => defaults.start_date,
    };

    let join = |kind: StrategyKind| -> Result<JoinPolicy, OvernightError> {
        match adapter.get_string(kind.id(), "join") {
            Some(value) => value.parse::<JoinPolicy>().map_err(|reason| OvernightError::ConfigInvalid {
                section: kind.id().to_string(),
                key: "join".to_string(),
                reason,
            }),
            None => Ok(kind.default_join_policy()),
        }
    };

    let sma_window = adapter.get_int("backtest", "sma_window", defaults.sma_window as i64);

    Ok(BacktestConfig {
        anchor,
        confirms,
        start_date,
        risk_free_rate: adapter.get_double("backtest", "risk_free_rate", defaults.risk_free_rate),
        sma_window: usize::try_from(sma_window).unwrap_or(0),
        overnight_threshold: adapter.get_double(
            "backtest",
            "overnight_threshold",
            defaults.overnight_threshold,
        ),
        trend_breadth_join: join(StrategyKind::TrendBreadth)?,
        low_vol_join: join(StrategyKind::LowVolConfirm)?,
    })
}

/// Command-line values win over everything else; positional paths replace
/// the anchor and confirming locations in order.
pub fn apply_overrides(config: &mut BacktestConfig, cli: &Cli) {
    if let Some(path) = &cli.anchor {
        config.anchor.path = path.clone();
    }
    for (i, path) in [&cli.confirm_1, &cli.confirm_2].into_iter().enumerate() {
        if let (Some(path), Some(source)) = (path, config.confirms.get_mut(i)) {
            source.path = path.clone();
        }
    }
    if let Some(rate) = cli.risk_free_rate {
        config.risk_free_rate = rate;
    }
    if let Some(window) = cli.sma_window {
        config.sma_window = window;
    }
    if let Some(threshold) = cli.threshold {
        config.overnight_threshold = threshold;
    }
    if let Some(date) = cli.start_date {
        config.start_date = date;
    }
}

fn read_source(adapter: &dyn ConfigPort, key: &str, default: &InstrumentSource) -> InstrumentSource {
    InstrumentSource {
        symbol: adapter
            .get_string("inputs", &format!("{key}_symbol"))
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| default.symbol.clone()),
        path: adapter
            .get_string("inputs", key)
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| default.path.clone()),
    }
}
