//! Technical indicators over plain value columns.
//!
//! Undefined points (warmup) are `None` rather than a sentinel value.

pub mod sma;
