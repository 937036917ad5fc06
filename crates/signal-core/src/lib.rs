//! Core types and traits for the signal service.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (PriceBar, PriceHistory)
//! - Trade signals and the per-cycle signal batch
//! - Core traits for indicators, signal rules, and market data sources

pub mod types;
pub mod traits;
pub mod error;

pub use error::SignalError;
pub use types::*;
pub use traits::*;
