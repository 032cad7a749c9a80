//! Configuration validation.
//!
//! [`validate_config_file`] rejects INI values that are present but
//! unparseable, so a typo never silently falls back to a default.
//! [`validate_backtest_config`] checks ranges once every layer has been
//! merged.

use crate::domain::align::JoinPolicy;
use crate::domain::backtest::BacktestConfig;
use crate::domain::error::OvernightError;
use crate::domain::signal::StrategyKind;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn validate_config_file(config: &dyn ConfigPort) -> Result<(), OvernightError> {
    validate_number::<f64>(config, "backtest", "risk_free_rate")?;
    validate_number::<f64>(config, "backtest", "overnight_threshold")?;
    validate_number::<usize>(config, "backtest", "sma_window")?;
    validate_start_date(config)?;
    validate_confirm_numbering(config)?;
    for kind in StrategyKind::ALL {
        validate_join(config, kind)?;
    }
    Ok(())
}

pub fn validate_backtest_config(config: &BacktestConfig) -> Result<(), OvernightError> {
    if config.sma_window == 0 {
        return Err(invalid("backtest", "sma_window", "sma_window must be at least 1"));
    }
    if !(0.0..1.0).contains(&config.risk_free_rate) {
        return Err(invalid(
            "backtest",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }
    if !config.overnight_threshold.is_finite() {
        return Err(invalid(
            "backtest",
            "overnight_threshold",
            "overnight_threshold must be a finite number",
        ));
    }
    if config.confirms.is_empty() {
        return Err(invalid(
            "inputs",
            "confirm_1",
            "at least one confirming instrument is required",
        ));
    }
    for source in config.sources() {
        if source.path.trim().is_empty() {
            return Err(invalid(
                "inputs",
                &source.symbol,
                "input path must not be empty",
            ));
        }
    }
    Ok(())
}

/// Parse a `YYYY-MM-DD` value, attributing failures to `[section] key`.
pub fn parse_date(value: &str, section: &str, key: &str) -> Result<NaiveDate, OvernightError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| invalid(section, key, "invalid date format (expected YYYY-MM-DD)"))
}

fn validate_number<T: std::str::FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<(), OvernightError> {
    match config.get_string(section, key) {
        Some(value) if value.trim().parse::<T>().is_err() => Err(invalid(
            section,
            key,
            &format!("'{}' is not a valid number", value.trim()),
        )),
        _ => Ok(()),
    }
}

fn validate_start_date(config: &dyn ConfigPort) -> Result<(), OvernightError> {
    if let Some(value) = config.get_string("backtest", "start_date") {
        parse_date(&value, "backtest", "start_date")?;
    }
    Ok(())
}

/// `confirm_N` entries past the built-in ones must be numbered without
/// gaps, otherwise the later ones would never be read.
fn validate_confirm_numbering(config: &dyn ConfigPort) -> Result<(), OvernightError> {
    let builtin = BacktestConfig::default().confirms.len();
    let numbers: Vec<usize> = config
        .keys("inputs")
        .iter()
        .filter_map(|key| key.strip_prefix("confirm_")?.parse().ok())
        .collect();

    for &n in &numbers {
        let key = format!("confirm_{n}");
        if n == 0 {
            return Err(invalid("inputs", &key, "confirming instruments are numbered from 1"));
        }
        if n > builtin + 1 && !numbers.contains(&(n - 1)) {
            return Err(invalid(
                "inputs",
                &key,
                &format!("confirm_{} is not set; confirm_N entries must be consecutive", n - 1),
            ));
        }
    }
    Ok(())
}

fn validate_join(config: &dyn ConfigPort, kind: StrategyKind) -> Result<(), OvernightError> {
    if let Some(value) = config.get_string(kind.id(), "join") {
        value
            .parse::<JoinPolicy>()
            .map_err(|reason| invalid(kind.id(), "join", &reason))?;
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> OvernightError {
    OvernightError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
