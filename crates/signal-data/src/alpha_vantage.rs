//! Alpha Vantage FX daily data source.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use signal_core::error::DataSourceError;
use signal_core::traits::MarketDataSource;
use signal_core::types::{InstrumentSymbol, PriceBar, PriceHistory};
use tracing::debug;

/// Alpha Vantage API configuration.
#[derive(Debug, Clone)]
pub struct AlphaVantageConfig {
    pub base_url: String,
    pub api_key: String,
    /// `compact` (latest 100 bars) or `full`
    pub output_size: String,
    pub request_timeout: Duration,
}

impl AlphaVantageConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://www.alphavantage.co";

    /// Create config with the default endpoint and full output size.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            output_size: "full".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FxDailyResponse {
    #[serde(rename = "Time Series FX (Daily)")]
    time_series: Option<BTreeMap<String, FxDailyBar>>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FxDailyBar {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
}

/// Daily FX history from Alpha Vantage's `FX_DAILY` endpoint.
pub struct AlphaVantageSource {
    config: AlphaVantageConfig,
    client: Client,
}

impl AlphaVantageSource {
    /// Create a new Alpha Vantage client.
    pub fn new(config: AlphaVantageConfig) -> Result<Self, DataSourceError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DataSourceError::Connection(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Split a six-letter pair such as `EURUSD` into `("EUR", "USD")`.
    fn currency_pair(symbol: &InstrumentSymbol) -> Result<(&str, &str), DataSourceError> {
        let s = symbol.as_str();
        if s.len() != 6 || !s.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DataSourceError::UnknownSymbol(s.to_string()));
        }
        Ok(s.split_at(3))
    }

    /// Parse an `FX_DAILY` response body into a chronological history.
    fn parse_fx_daily(
        symbol: &InstrumentSymbol,
        body: &str,
    ) -> Result<PriceHistory, DataSourceError> {
        let response: FxDailyResponse =
            serde_json::from_str(body).map_err(|e| DataSourceError::Parse(e.to_string()))?;

        if let Some(message) = response.error_message {
            return Err(DataSourceError::Api(message));
        }
        if let Some(message) = response.note.or(response.information) {
            return Err(DataSourceError::RateLimited(message));
        }

        let series = response
            .time_series
            .ok_or_else(|| DataSourceError::NoDataAvailable(symbol.to_string()))?;

        let bars = series
            .iter()
            .map(|(date, bar)| {
                Ok(PriceBar::new(
                    parse_date(date)?,
                    parse_price(&bar.open)?,
                    parse_price(&bar.high)?,
                    parse_price(&bar.low)?,
                    parse_price(&bar.close)?,
                ))
            })
            .collect::<Result<Vec<_>, DataSourceError>>()?;

        if bars.is_empty() {
            return Err(DataSourceError::NoDataAvailable(symbol.to_string()));
        }

        Ok(PriceHistory::new(symbol.clone(), bars))
    }
}

#[async_trait]
impl MarketDataSource for AlphaVantageSource {
    async fn fetch_daily_history(
        &self,
        symbol: &InstrumentSymbol,
    ) -> Result<PriceHistory, DataSourceError> {
        let (from, to) = Self::currency_pair(symbol)?;
        let url = format!("{}/query", self.config.base_url.trim_end_matches('/'));

        let params = [
            ("function", "FX_DAILY"),
            ("from_symbol", from),
            ("to_symbol", to),
            ("outputsize", self.config.output_size.as_str()),
            ("apikey", self.config.api_key.as_str()),
        ];

        let resp = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| DataSourceError::Connection(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| DataSourceError::Connection(e.to_string()))?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(DataSourceError::RateLimited(body));
        }
        if !status.is_success() {
            return Err(DataSourceError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let history = Self::parse_fx_daily(symbol, &body)?;
        debug!(symbol = %symbol, bars = history.len(), "Fetched Alpha Vantage history");
        Ok(history)
    }

    fn name(&self) -> &str {
        "alpha_vantage"
    }
}

fn parse_date(date: &str) -> Result<i64, DataSourceError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
        .ok_or_else(|| DataSourceError::Parse(format!("Could not parse date: {}", date)))
}

fn parse_price(value: &str) -> Result<f64, DataSourceError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| DataSourceError::Parse(format!("Could not parse price: {}", value)))
}
