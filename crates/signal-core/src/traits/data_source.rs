//! Market data source trait definitions.

use crate::error::DataSourceError;
use crate::types::{InstrumentSymbol, PriceHistory};
use async_trait::async_trait;

/// Trait for daily price history providers.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch the daily history for one instrument.
    ///
    /// # Returns
    /// Bars ordered from oldest to newest
    async fn fetch_daily_history(
        &self,
        symbol: &InstrumentSymbol,
    ) -> Result<PriceHistory, DataSourceError>;

    /// Get the data source name.
    fn name(&self) -> &str;
}
