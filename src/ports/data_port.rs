//! Price data access port.

use crate::domain::bar::Bar;
use crate::domain::error::OvernightError;

pub trait DataPort {
    /// The subset of `sources` that cannot be located, in input order.
    fn missing_sources(&self, sources: &[&str]) -> Vec<String>;

    /// Raw bars for one source, in source order and unfiltered.
    fn fetch_bars(&self, source: &str) -> Result<Vec<Bar>, OvernightError>;
}
