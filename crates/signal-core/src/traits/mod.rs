//! Core traits for the signal service.

mod data_source;
mod indicator;
mod rule;

pub use data_source::MarketDataSource;
pub use indicator::{Indicator, RangeIndicator};
pub use rule::{SignalRule, StrategyConfig};
