//! One-shot evaluation command.

use anyhow::Result;
use signal_broadcast::SignalHub;
use signal_core::types::InstrumentSymbol;
use std::path::Path;
use std::sync::Arc;

use super::{build_scheduler, load};
use crate::cli::EvaluateArgs;

pub async fn run(args: EvaluateArgs, config_path: &Path) -> Result<()> {
    let config = load(config_path)?;

    let instruments = (!args.symbols.is_empty())
        .then(|| args.symbols.iter().map(InstrumentSymbol::new).collect());

    let hub = Arc::new(SignalHub::new(config.server.channel_capacity));
    let scheduler = build_scheduler(&config, hub, instruments)?;
    let report = scheduler.run_cycle().await;

    for (symbol, err) in &report.failures {
        eprintln!("{}: {}", symbol, err);
    }
    println!("{}", serde_json::to_string_pretty(&*report.batch)?);

    Ok(())
}
