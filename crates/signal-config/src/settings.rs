//! Configuration structures.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use config::ConfigError;
use serde::{Deserialize, Serialize};
use signal_core::traits::StrategyConfig;
use signal_core::types::InstrumentSymbol;
use signal_strategy::CrossoverParams;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub scheduler: SchedulerSettings,
    #[serde(default)]
    pub strategy: CrossoverParams,
    #[serde(default)]
    pub data: DataSettings,
}

impl AppConfig {
    /// Check every section, failing on the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.scheduler.validate()?;
        self.strategy
            .validate()
            .map_err(|e| ConfigError::Message(format!("strategy: {}", e)))?;
        self.data.validate()?;
        Ok(())
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "signal-service".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Console log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    /// Daily-rolling log file, in addition to the console
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file: None,
        }
    }
}

/// WebSocket server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_address: String,
    /// Batches buffered per subscriber before it is considered lagging
    pub channel_capacity: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            channel_capacity: 64,
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_address.parse().map_err(|_| {
            ConfigError::Message(format!(
                "server.bind_address is not a socket address: {}",
                self.bind_address
            ))
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;
        if self.channel_capacity == 0 {
            return Err(ConfigError::Message(
                "server.channel_capacity must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Broadcast cycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    pub instruments: Vec<String>,
    pub interval_secs: u64,
    pub run_on_start: bool,
    pub max_concurrent_fetches: usize,
    pub fetch_timeout_secs: u64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            instruments: vec![
                "EURUSD".to_string(),
                "GBPUSD".to_string(),
                "XAUUSD".to_string(),
            ],
            interval_secs: 300,
            run_on_start: true,
            max_concurrent_fetches: 1,
            fetch_timeout_secs: 30,
        }
    }
}

impl SchedulerSettings {
    pub fn symbols(&self) -> Vec<InstrumentSymbol> {
        self.instruments.iter().map(InstrumentSymbol::new).collect()
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.instruments.is_empty() {
            return Err(ConfigError::Message(
                "scheduler.instruments must not be empty".into(),
            ));
        }

        let mut seen = HashSet::new();
        for symbol in self.symbols() {
            if symbol.as_str().is_empty() {
                return Err(ConfigError::Message(
                    "scheduler.instruments contains an empty symbol".into(),
                ));
            }
            if !seen.insert(symbol.clone()) {
                return Err(ConfigError::Message(format!(
                    "scheduler.instruments lists {} more than once",
                    symbol
                )));
            }
        }

        if self.interval_secs == 0 {
            return Err(ConfigError::Message(
                "scheduler.interval_secs must be greater than 0".into(),
            ));
        }
        if self.max_concurrent_fetches == 0 {
            return Err(ConfigError::Message(
                "scheduler.max_concurrent_fetches must be greater than 0".into(),
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "scheduler.fetch_timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Where price history comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DataProvider {
    #[default]
    AlphaVantage,
    Csv,
}

/// Data source settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DataSettings {
    pub provider: DataProvider,
    pub alpha_vantage: AlphaVantageSettings,
    pub csv: CsvSettings,
}

impl DataSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        match self.provider {
            DataProvider::AlphaVantage => self.alpha_vantage.validate(),
            DataProvider::Csv => Ok(()),
        }
    }
}

/// Alpha Vantage API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlphaVantageSettings {
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// `compact` or `full`
    pub output_size: String,
}

impl Default for AlphaVantageSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.alphavantage.co".to_string(),
            api_key_env: "ALPHA_VANTAGE_API_KEY".to_string(),
            output_size: "full".to_string(),
        }
    }
}

impl AlphaVantageSettings {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ConfigError::Message(format!(
                    "Alpha Vantage API key missing: set {}",
                    self.api_key_env
                ))
            })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Message(
                "data.alpha_vantage.base_url must not be empty".into(),
            ));
        }
        if !matches!(self.output_size.as_str(), "compact" | "full") {
            return Err(ConfigError::Message(format!(
                "data.alpha_vantage.output_size must be compact or full, got {}",
                self.output_size
            )));
        }
        Ok(())
    }
}

/// CSV directory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvSettings {
    /// Directory containing one `{SYMBOL}.csv` per instrument
    pub directory: PathBuf,
}

impl Default for CsvSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("data"),
        }
    }
}
