//! CLI command implementations.

pub mod evaluate;
pub mod serve;
pub mod validate;

use anyhow::{Context, Result};
use signal_broadcast::{BroadcastScheduler, SchedulerConfig, SignalHub};
use signal_config::{AppConfig, DataProvider, DataSettings};
use signal_core::traits::MarketDataSource;
use signal_core::types::InstrumentSymbol;
use signal_data::{AlphaVantageConfig, AlphaVantageSource, CsvDataSource};
use signal_strategy::SignalEvaluator;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Load and validate the configuration file.
pub fn load(config_path: &Path) -> Result<AppConfig> {
    signal_config::load_config(config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))
}

/// Create the configured market data source.
pub fn build_source(
    settings: &DataSettings,
    request_timeout: Duration,
) -> Result<Arc<dyn MarketDataSource>> {
    match settings.provider {
        DataProvider::AlphaVantage => {
            let av = &settings.alpha_vantage;
            let config = AlphaVantageConfig {
                base_url: av.base_url.clone(),
                api_key: av.api_key()?,
                output_size: av.output_size.clone(),
                request_timeout,
            };
            let source = AlphaVantageSource::new(config)
                .context("Failed to create Alpha Vantage client")?;
            Ok(Arc::new(source))
        }
        DataProvider::Csv => {
            let source = CsvDataSource::new(&settings.csv.directory)
                .context("Failed to open CSV data directory")?;
            Ok(Arc::new(source))
        }
    }
}

/// Wire the data source, rule and hub into a scheduler.
///
/// `instruments` replaces the configured instrument set when given.
pub fn build_scheduler(
    config: &AppConfig,
    hub: Arc<SignalHub>,
    instruments: Option<Vec<InstrumentSymbol>>,
) -> Result<BroadcastScheduler> {
    let rule =
        SignalEvaluator::new(config.strategy.clone()).context("Invalid strategy parameters")?;
    let source = build_source(&config.data, config.scheduler.fetch_timeout())?;

    let scheduler_config = SchedulerConfig {
        instruments: instruments.unwrap_or_else(|| config.scheduler.symbols()),
        interval: config.scheduler.interval(),
        run_on_start: config.scheduler.run_on_start,
        max_concurrent_fetches: config.scheduler.max_concurrent_fetches,
        fetch_timeout: config.scheduler.fetch_timeout(),
    };

    info!(
        source = source.name(),
        instruments = scheduler_config.instruments.len(),
        fast = config.strategy.fast_period,
        slow = config.strategy.slow_period,
        "Scheduler configured"
    );

    BroadcastScheduler::new(scheduler_config, source, Arc::new(rule), hub)
        .context("Invalid scheduler configuration")
}
