//! Validate configuration command.

use anyhow::Result;
use odte_config::load_config;
use std::path::Path;

pub async fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    match load_config(config_path) {
        Ok(config) => {
            config.risk.validate()?;
            let session = config.session.to_session_config()?;

            println!("Configuration is valid!");
            println!();
            println!("App: {}", config.app.name);
            println!("Environment: {}", config.app.environment);
            println!("Underlying: {}", config.app.underlying);
            println!("Log level: {}", config.logging.level);
            println!("Max contracts: {}", config.risk.max_contracts);
            println!("Stop-loss multiple: {}x", config.risk.stop_loss_multiple);
            println!("Take-profit multiple: {}x", config.risk.take_profit_multiple);
            println!("Signal cooldown: {}s", config.risk.cooldown_secs);
            println!(
                "Session: {}-{} {} (+{}m buffer)",
                config.session.open,
                config.session.close,
                session.timezone.name(),
                config.session.close_buffer_minutes
            );
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
