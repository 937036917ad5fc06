//! Configuration management.

mod settings;

pub use settings::{
    AlphaVantageSettings, AppConfig, AppSettings, CsvSettings, DataProvider, DataSettings,
    LogFormat, LoggingConfig, SchedulerSettings, ServerSettings,
};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Prefix of environment overrides, e.g. `SIGNALS__SCHEDULER__INTERVAL_SECS`.
pub const ENV_PREFIX: &str = "SIGNALS";

/// Load configuration from file and environment, then validate it.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    load_with_env(path, Environment::with_prefix(ENV_PREFIX))
}

fn load_with_env(path: &Path, env: Environment) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(
            env.separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("scheduler.instruments"),
        )
        .build()?;

    let app: AppConfig = config.try_deserialize()?;
    app.validate()?;
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("signals.toml");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    fn no_env() -> Environment {
        Environment::with_prefix(ENV_PREFIX).source(Some(config::Map::new()))
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let (_dir, path) = write_config("[app]\nname = \"signals-test\"\n");
        let config = load_with_env(&path, no_env()).unwrap();

        assert_eq!(config.app.name, "signals-test");
        assert_eq!(config.scheduler.instruments, vec!["EURUSD", "GBPUSD", "XAUUSD"]);
        assert_eq!(config.scheduler.interval_secs, 300);
        assert_eq!(config.strategy.slow_period, 26);
        assert_eq!(config.server.bind_address, "127.0.0.1:3000");
        assert_eq!(config.data.provider, DataProvider::AlphaVantage);
    }

    #[test]
    fn test_file_values() {
        let (_dir, path) = write_config(
            r#"
[scheduler]
instruments = ["EURUSD"]
interval_secs = 60
max_concurrent_fetches = 2

[strategy]
fast_period = 9
slow_period = 21
rsi_overbought = 75.0

[data]
provider = "csv"

[data.csv]
directory = "fixtures"

[logging]
format = "json"
"#,
        );
        let config = load_with_env(&path, no_env()).unwrap();

        assert_eq!(config.scheduler.symbols().len(), 1);
        assert_eq!(config.scheduler.interval().as_secs(), 60);
        assert_eq!(config.strategy.fast_period, 9);
        assert_eq!(config.strategy.rsi_period, 14);
        assert!((config.strategy.rsi_overbought - 75.0).abs() < 1e-10);
        assert_eq!(config.data.provider, DataProvider::Csv);
        assert_eq!(config.data.csv.directory, Path::new("fixtures"));
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_environment_overrides() {
        let (_dir, path) = write_config("[scheduler]\ninterval_secs = 60\n");
        let vars: config::Map<String, String> = [
            ("SIGNALS__SCHEDULER__INTERVAL_SECS", "120"),
            ("SIGNALS__SCHEDULER__INSTRUMENTS", "eurusd,USDJPY"),
            ("SIGNALS__STRATEGY__FAST_PERIOD", "5"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let env = Environment::with_prefix(ENV_PREFIX).source(Some(vars));
        let config = load_with_env(&path, env).unwrap();

        assert_eq!(config.scheduler.interval_secs, 120);
        assert_eq!(config.strategy.fast_period, 5);
        let symbols: Vec<String> = config
            .scheduler
            .symbols()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(symbols, vec!["EURUSD", "USDJPY"]);
    }

    #[test]
    fn test_validation_rejects_bad_settings() {
        let cases = [
            "[scheduler]\ninstruments = []\n",
            "[scheduler]\ninstruments = [\"EURUSD\", \"eurusd\"]\n",
            "[scheduler]\ninterval_secs = 0\n",
            "[strategy]\nfast_period = 30\nslow_period = 26\n",
            "[strategy]\nrsi_oversold = 80.0\n",
            "[server]\nbind_address = \"not-an-address\"\n",
            "[data.alpha_vantage]\noutput_size = \"huge\"\n",
        ];

        for contents in cases {
            let (_dir, path) = write_config(contents);
            assert!(
                load_with_env(&path, no_env()).is_err(),
                "accepted invalid config: {}",
                contents
            );
        }
    }

    #[test]
    fn test_missing_file() {
        assert!(load_config(Path::new("/no/such/signals.toml")).is_err());
    }

    #[test]
    fn test_roundtrips_through_toml() {
        let config = AppConfig::default();
        let rendered = config.to_toml().unwrap();

        assert!(rendered.contains("[scheduler]"));
        assert!(rendered.contains("slow_period = 26"));

        let (_dir, path) = write_config(&rendered);
        let reloaded = load_with_env(&path, no_env()).unwrap();
        assert_eq!(reloaded.strategy, config.strategy);
    }

    #[test]
    fn test_api_key_lookup() {
        let settings = AlphaVantageSettings {
            api_key_env: "SIGNALS_TEST_UNSET_API_KEY_VAR".to_string(),
            ..Default::default()
        };
        assert!(settings.api_key().is_err());
    }
}
