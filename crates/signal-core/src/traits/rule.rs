//! Signal rule trait definitions.

use crate::error::{SignalError, StrategyError};
use crate::types::{PriceHistory, Signal};
use chrono::{DateTime, Utc};

/// Configuration trait for signal rules.
pub trait StrategyConfig: Send + Sync + Clone + 'static {
    /// Validate the configuration.
    fn validate(&self) -> Result<(), StrategyError>;
}

/// A deterministic rule turning one price history into one signal.
///
/// Implementations hold no state between calls, so evaluating the same
/// history twice yields the same kind and levels.
pub trait SignalRule: Send + Sync {
    /// Get the unique name of this rule.
    fn name(&self) -> &str;

    /// Minimum history length below which the instrument is skipped.
    fn min_history(&self) -> usize;

    /// Evaluate the history, stamping the result with `computed_at`.
    fn evaluate(
        &self,
        history: &PriceHistory,
        computed_at: DateTime<Utc>,
    ) -> Result<Signal, SignalError>;

    /// Check if a history is long enough to evaluate.
    fn has_enough_history(&self, bars_available: usize) -> bool {
        bars_available >= self.min_history()
    }
}
