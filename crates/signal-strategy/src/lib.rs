//! Signal rule implementation.
//!
//! Combines a fast/slow EMA crossover with an RSI filter and ATR-based
//! stop-loss/take-profit levels:
//! - golden cross below the overbought threshold -> buy
//! - death cross above the oversold threshold -> sell
//! - anything else -> hold

mod crossover;
mod snapshot;

pub use crossover::{CrossoverParams, SignalEvaluator};
pub use snapshot::IndicatorSnapshot;
