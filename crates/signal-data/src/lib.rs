//! Daily market data sources.
//!
//! Every source implements [`MarketDataSource`](signal_core::traits::MarketDataSource)
//! and returns bars ordered oldest first.

mod alpha_vantage;
mod csv_source;
mod memory;

pub use alpha_vantage::{AlphaVantageConfig, AlphaVantageSource};
pub use csv_source::CsvDataSource;
pub use memory::MemorySource;
