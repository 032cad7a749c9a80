//! Console report adapter.
//!
//! Text mode mirrors the classic research printout; key-value mode emits one
//! `strategy.key=value` line per field for scripts.

use crate::domain::backtest::StrategyRun;
use crate::domain::error::OvernightError;
use crate::ports::report_port::ReportPort;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    KeyValue,
}

pub struct ConsoleReport<W: Write> {
    out: W,
    format: ReportFormat,
}

impl<W: Write> ConsoleReport<W> {
    pub fn new(out: W, format: ReportFormat) -> Self {
        Self { out, format }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

pub fn render_text(run: &StrategyRun) -> String {
    let r = &run.report;
    format!(
        "\n=== Strategy results ({label}) ===\n\
         Sharpe Ratio: {sharpe:.4}\n\
         CAGR:         {cagr:.2}%\n\
         Days:         {days}\n\
         Trades:       {trades}\n",
        label = run.label,
        sharpe = r.sharpe_ratio,
        cagr = r.cagr * 100.0,
        days = r.sample_length,
        trades = r.trade_count,
    )
}

pub fn render_key_value(run: &StrategyRun) -> String {
    let r = &run.report;
    let id = run.kind.id();
    let fields: [(&str, String); 8] = [
        ("label", run.label.clone()),
        ("join", run.table.policy.to_string()),
        ("sharpe_ratio", r.sharpe_ratio.to_string()),
        ("cagr", r.cagr.to_string()),
        ("total_return", r.total_return.to_string()),
        ("years", r.years.to_string()),
        ("sample_length", r.sample_length.to_string()),
        ("trade_count", r.trade_count.to_string()),
    ];
    fields
        .iter()
        .map(|(key, value)| format!("{id}.{key}={value}\n"))
        .collect()
}

impl<W: Write> ReportPort for ConsoleReport<W> {
    fn write(&mut self, run: &StrategyRun) -> Result<(), OvernightError> {
        let rendered = match self.format {
            ReportFormat::Text => render_text(run),
            ReportFormat::KeyValue => render_key_value(run),
        };
        self.out.write_all(rendered.as_bytes())?;
        Ok(())
    }
}
