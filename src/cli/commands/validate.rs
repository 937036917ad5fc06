//! Validate configuration command.

use anyhow::Result;
use signal_config::{load_config, DataProvider};
use std::path::Path;

use crate::cli::ValidateArgs;

pub async fn run(args: ValidateArgs, config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!("WebSocket address: {}", config.server.bind_address);
    println!("Instruments: {}", config.scheduler.instruments.join(", "));
    println!("Cycle interval: {}s", config.scheduler.interval_secs);
    println!(
        "EMA {}/{}, RSI {} ({}-{}), ATR {} (SL x{}, TP x{})",
        config.strategy.fast_period,
        config.strategy.slow_period,
        config.strategy.rsi_period,
        config.strategy.rsi_oversold,
        config.strategy.rsi_overbought,
        config.strategy.atr_period,
        config.strategy.stop_loss_atr_multiplier,
        config.strategy.take_profit_atr_multiplier,
    );

    match config.data.provider {
        DataProvider::AlphaVantage => match config.data.alpha_vantage.api_key() {
            Ok(_) => println!("Data: Alpha Vantage (API key found)"),
            Err(e) => println!("Data: Alpha Vantage, warning: {}", e),
        },
        DataProvider::Csv => println!("Data: CSV files in {}", config.data.csv.directory.display()),
    }

    if args.print {
        println!();
        println!("{}", config.to_toml()?);
    }

    Ok(())
}
