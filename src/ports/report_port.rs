//! Report output port.

use crate::domain::backtest::StrategyRun;
use crate::domain::error::OvernightError;

/// Port for rendering strategy results.
pub trait ReportPort {
    fn write(&mut self, run: &StrategyRun) -> Result<(), OvernightError>;

    /// Default implementation: one `write` per run, in order.
    fn write_all(&mut self, runs: &[StrategyRun]) -> Result<(), OvernightError> {
        for run in runs {
            self.write(run)?;
        }
        Ok(())
    }
}
