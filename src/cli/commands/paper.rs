//! Paper trading command implementation.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use odte_broker::{CachedQuoteSource, PaperBroker};
use odte_core::session::WallClock;
use odte_engine::{AuditEvent, EngineConfig, MonitorConfig, TradingEngine};
use odte_signal::SignalEngineConfig;
use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::cli::PaperArgs;

pub async fn run(args: PaperArgs, config_path: &Path) -> Result<()> {
    let config = odte_config::load_config(config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;
    config.risk.validate()?;
    let session = config.session.to_session_config()?;

    let ticks_path = args.ticks.to_str().context("tick file path is not UTF-8")?;
    let ticks = odte_data::load_ticks(ticks_path)?;
    info!(count = ticks.len(), path = ticks_path, "tick file loaded");

    let (updates_tx, updates_rx) = mpsc::channel(64);
    let sink = Arc::new(PaperBroker::new(updates_tx));
    let quotes = Arc::new(CachedQuoteSource::new());
    let clock = Arc::new(WallClock::new(session));

    let engine_config = EngineConfig {
        signal: SignalEngineConfig {
            cooldown_secs: config.risk.cooldown_secs,
        },
        monitor: MonitorConfig {
            poll_interval: Duration::from_secs(config.monitor.poll_interval_secs),
            retry_budget: config.monitor.retry_budget,
            backoff_base: Duration::from_millis(config.monitor.backoff_base_ms),
            backoff_cap: Duration::from_millis(config.monitor.backoff_cap_ms),
        },
        risk: config.risk,
    };
    let mut engine = TradingEngine::start(engine_config, sink, quotes.clone(), clock, updates_rx);

    // Tail the audit stream so every signal, intent and fill is visible.
    let mut audit_rx = engine.subscribe_audit();
    let audit_task = tokio::spawn(async move {
        let mut executions = 0u32;
        let mut realized = Decimal::ZERO;
        while let Ok(event) = audit_rx.recv().await {
            match event {
                AuditEvent::Signal(signal) => info!(
                    direction = %signal.direction,
                    option_symbol = %signal.option_symbol,
                    reference = %signal.reference_price,
                    "signal"
                ),
                AuditEvent::Intent(intent) => info!(
                    action = %intent.action,
                    option_symbol = %intent.option_symbol,
                    quantity = intent.quantity,
                    limit = %intent.limit_price,
                    "trade intent"
                ),
                AuditEvent::Execution(execution) => {
                    executions += 1;
                    realized += execution.pnl_contrib;
                    info!(
                        action = %execution.intent.action,
                        fill = %execution.fill_price,
                        pnl = %execution.pnl_contrib,
                        "execution"
                    );
                }
                AuditEvent::Anomaly { description, .. } => warn!(%description, "anomaly"),
            }
        }
        (executions, realized)
    });

    // No position carries across sessions; start from a clean slot.
    engine.reconcile(None).await?;

    for tick in ticks {
        if let Some(quote) = tick.option.clone() {
            quotes.publish(quote);
        }
        engine.process_tick(tick).await?;
        if args.tick_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(args.tick_delay_ms)).await;
        }
    }

    // Let in-flight paper fills drain, then flatten and stop.
    tokio::time::sleep(Duration::from_millis(250)).await;
    engine.close_all("replay-complete").await?;
    tokio::time::sleep(Duration::from_millis(250)).await;
    engine.shutdown().await?;

    let (executions, realized) = audit_task.await?;
    println!("Executions: {executions}");
    println!("Realized P/L: {realized}");
    Ok(())
}
