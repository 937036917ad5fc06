//! In-memory data source.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use signal_core::error::DataSourceError;
use signal_core::traits::MarketDataSource;
use signal_core::types::{InstrumentSymbol, PriceBar, PriceHistory};

#[derive(Debug, Clone)]
enum Entry {
    Bars(Vec<PriceBar>),
    Failure(String),
}

/// Data source backed by a map of preloaded histories.
///
/// Histories can be swapped between fetches, and a symbol can be set to fail
/// with a connection error.
#[derive(Debug, Default)]
pub struct MemorySource {
    entries: RwLock<HashMap<InstrumentSymbol, Entry>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`MemorySource::insert`].
    pub fn with_history(self, symbol: impl Into<InstrumentSymbol>, bars: Vec<PriceBar>) -> Self {
        self.insert(symbol, bars);
        self
    }

    /// Builder-style [`MemorySource::fail`].
    pub fn with_failure(self, symbol: impl Into<InstrumentSymbol>, message: &str) -> Self {
        self.fail(symbol, message);
        self
    }

    /// Set the bars returned for `symbol`.
    pub fn insert(&self, symbol: impl Into<InstrumentSymbol>, bars: Vec<PriceBar>) {
        self.write().insert(symbol.into(), Entry::Bars(bars));
    }

    /// Make every fetch of `symbol` fail.
    pub fn fail(&self, symbol: impl Into<InstrumentSymbol>, message: &str) {
        self.write()
            .insert(symbol.into(), Entry::Failure(message.to_string()));
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<InstrumentSymbol, Entry>> {
        self.entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl MarketDataSource for MemorySource {
    async fn fetch_daily_history(
        &self,
        symbol: &InstrumentSymbol,
    ) -> Result<PriceHistory, DataSourceError> {
        let entry = self
            .entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(symbol)
            .cloned();

        match entry {
            Some(Entry::Bars(bars)) => Ok(PriceHistory::new(symbol.clone(), bars)),
            Some(Entry::Failure(message)) => Err(DataSourceError::Connection(message)),
            None => Err(DataSourceError::UnknownSymbol(symbol.to_string())),
        }
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_source() {
        let bars = vec![PriceBar::new(0, 1.0, 1.1, 0.9, 1.05)];
        let source = MemorySource::new()
            .with_history("EURUSD", bars)
            .with_failure("GBPUSD", "connection reset");

        let history = source
            .fetch_daily_history(&InstrumentSymbol::new("EURUSD"))
            .await
            .unwrap();
        assert_eq!(history.len(), 1);

        let err = source
            .fetch_daily_history(&InstrumentSymbol::new("GBPUSD"))
            .await
            .unwrap_err();
        assert!(matches!(err, DataSourceError::Connection(_)));

        let err = source
            .fetch_daily_history(&InstrumentSymbol::new("XAUUSD"))
            .await
            .unwrap_err();
        assert!(matches!(err, DataSourceError::UnknownSymbol(_)));
    }

    #[tokio::test]
    async fn test_histories_can_be_replaced() {
        let source = MemorySource::new().with_failure("EURUSD", "down");
        source.insert("EURUSD", vec![PriceBar::new(0, 1.0, 1.1, 0.9, 1.05)]);

        assert!(source
            .fetch_daily_history(&InstrumentSymbol::new("EURUSD"))
            .await
            .is_ok());
    }
}
