//! Core domain types and logic.

pub mod bar;
pub mod series;
pub mod align;
pub mod indicator;
pub mod signal;
pub mod returns;
pub mod metrics;
pub mod backtest;
pub mod config_validation;
pub mod error;
