//! Technical indicators.
//!
//! This crate provides the indicator engine used by the signal rule:
//! - Exponential moving average (EMA), seeded with a simple average
//! - Relative Strength Index (RSI) with Wilder smoothing
//! - Average True Range (ATR) with Wilder smoothing
//!
//! All indicators are stateless and operate on chronologically ascending
//! series; they fail with `InsufficientData` rather than returning an
//! empty result.

pub mod momentum;
pub mod moving_average;
mod smoothing;
pub mod volatility;

pub use momentum::Rsi;
pub use moving_average::Ema;
pub use volatility::Atr;
