//! Core data types for the signal service.

mod bar;
mod signal;
mod symbol;

pub use bar::{PriceBar, PriceHistory};
pub use signal::{Signal, SignalKind, SignalsBatch};
pub use symbol::InstrumentSymbol;
