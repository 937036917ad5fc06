//! CSV data source.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use serde::Deserialize;
use signal_core::error::DataSourceError;
use signal_core::traits::MarketDataSource;
use signal_core::types::{InstrumentSymbol, PriceBar, PriceHistory};
use tracing::debug;

/// CSV record format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "Date", alias = "date", alias = "timestamp", alias = "Timestamp")]
    date: String,
    #[serde(alias = "Open", alias = "open")]
    open: f64,
    #[serde(alias = "High", alias = "high")]
    high: f64,
    #[serde(alias = "Low", alias = "low")]
    low: f64,
    #[serde(alias = "Close", alias = "close")]
    close: f64,
}

/// Directory of `{SYMBOL}.csv` files, one per instrument.
#[derive(Debug, Clone)]
pub struct CsvDataSource {
    dir: PathBuf,
}

impl CsvDataSource {
    /// Create a source reading from `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, DataSourceError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(DataSourceError::NoDataAvailable(format!(
                "CSV directory {} does not exist",
                dir.display()
            )));
        }
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Path of the file holding `symbol`'s history.
    pub fn path_for(&self, symbol: &InstrumentSymbol) -> PathBuf {
        self.dir.join(format!("{}.csv", symbol))
    }

    fn load_from_path(path: &Path) -> Result<Vec<PriceBar>, DataSourceError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| DataSourceError::Parse(e.to_string()))?;

        let mut bars = Vec::new();

        for result in reader.deserialize() {
            let record: CsvRecord = result.map_err(|e| DataSourceError::Parse(e.to_string()))?;
            let timestamp = parse_timestamp(&record.date)?;

            bars.push(PriceBar::new(
                timestamp,
                record.open,
                record.high,
                record.low,
                record.close,
            ));
        }

        Ok(bars)
    }
}

#[async_trait]
impl MarketDataSource for CsvDataSource {
    async fn fetch_daily_history(
        &self,
        symbol: &InstrumentSymbol,
    ) -> Result<PriceHistory, DataSourceError> {
        let path = self.path_for(symbol);
        if !path.is_file() {
            return Err(DataSourceError::UnknownSymbol(symbol.to_string()));
        }

        let bars = tokio::task::spawn_blocking(move || Self::load_from_path(&path))
            .await
            .map_err(|e| DataSourceError::Io(std::io::Error::other(e)))??;

        if bars.is_empty() {
            return Err(DataSourceError::NoDataAvailable(symbol.to_string()));
        }

        debug!(symbol = %symbol, bars = bars.len(), "Loaded CSV history");
        Ok(PriceHistory::new(symbol.clone(), bars))
    }

    fn name(&self) -> &str {
        "csv"
    }
}

/// Parse the date formats commonly found in exported price files.
fn parse_timestamp(date_str: &str) -> Result<i64, DataSourceError> {
    let datetime_formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
    let date_formats = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];

    for format in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }
    for format in date_formats {
        if let Some(dt) = NaiveDate::parse_from_str(date_str, format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    // Unix timestamp, milliseconds if more than 10 digits
    if let Ok(ts) = date_str.parse::<i64>() {
        return Ok(if ts > 10_000_000_000 { ts } else { ts * 1000 });
    }

    Err(DataSourceError::Parse(format!(
        "Could not parse date: {}",
        date_str
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("2024-01-15").unwrap(), 1_705_276_800_000);
        assert!(parse_timestamp("2024-01-15 10:30:00").is_ok());
        assert!(parse_timestamp("01/15/2024").is_ok());
        assert_eq!(parse_timestamp("1705312800000").unwrap(), 1_705_312_800_000); // Unix ms
        assert_eq!(parse_timestamp("1705312800").unwrap(), 1_705_312_800_000); // Unix sec
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_missing_directory() {
        assert!(CsvDataSource::new("/definitely/not/a/dir").is_err());
    }

    #[tokio::test]
    async fn test_fetch_sorts_bars() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("EURUSD.csv"),
            "Date,Open,High,Low,Close\n\
             2024-01-03,1.0920,1.0950,1.0900,1.0940\n\
             2024-01-02,1.1030,1.1040,1.0930,1.0940\n",
        )
        .unwrap();

        let source = CsvDataSource::new(dir.path()).unwrap();
        let history = source
            .fetch_daily_history(&InstrumentSymbol::new("eurusd"))
            .await
            .unwrap();

        assert_eq!(history.len(), 2);
        assert!((history.bars()[0].open - 1.1030).abs() < 1e-10);
        assert!((history.bars()[1].open - 1.0920).abs() < 1e-10);
    }

    #[tokio::test]
    async fn test_adjusted_close_column_is_ignored() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("GBPUSD.csv"),
            "Date,Open,High,Low,Close,Adj Close,Volume\n\
             2024-01-02,1.2730,1.2750,1.2610,1.2620,1.2600,0\n\
             2024-01-03,1.2620,1.2680,1.2600,1.2650,1.2640,0\n",
        )
        .unwrap();

        let source = CsvDataSource::new(dir.path()).unwrap();
        let history = source
            .fetch_daily_history(&InstrumentSymbol::new("GBPUSD"))
            .await
            .unwrap();

        assert_eq!(history.len(), 2);
        assert!((history.bars()[0].close - 1.2620).abs() < 1e-10);
        assert!((history.bars()[1].close - 1.2650).abs() < 1e-10);
    }

    #[tokio::test]
    async fn test_unknown_symbol() {
        let dir = tempdir().unwrap();
        let source = CsvDataSource::new(dir.path()).unwrap();

        let err = source
            .fetch_daily_history(&InstrumentSymbol::new("GBPUSD"))
            .await
            .unwrap_err();
        assert!(matches!(err, DataSourceError::UnknownSymbol(s) if s == "GBPUSD"));
    }

    #[tokio::test]
    async fn test_malformed_row() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("XAUUSD.csv"),
            "Date,Open,High,Low,Close\n2024-01-02,abc,1,1,1\n",
        )
        .unwrap();

        let source = CsvDataSource::new(dir.path()).unwrap();
        let err = source
            .fetch_daily_history(&InstrumentSymbol::new("XAUUSD"))
            .await
            .unwrap_err();
        assert!(matches!(err, DataSourceError::Parse(_)));
    }
}
