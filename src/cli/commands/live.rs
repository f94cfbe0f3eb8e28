//! Live trading command implementation.

use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::cli::LiveArgs;

pub async fn run(args: LiveArgs, config_path: &Path) -> Result<()> {
    let config = odte_config::load_config(config_path)?;
    config.risk.validate()?;
    config.session.to_session_config()?;

    info!("Live trading is not yet wired to a brokerage");
    info!("Underlying: {}", config.app.underlying);
    info!("Dry run: {}", args.dry_run);

    println!("Live trading requires the brokerage market-data and order endpoints.");
    println!("Connect a tick stream and an order sink, then start the engine with them;");
    println!("the `paper` command exercises the full decision core in the meantime.");

    Ok(())
}
