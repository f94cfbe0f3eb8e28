//! Engine wiring: funnels ticks, quotes, fills and the clock into the
//! manager's single event channel.

use std::sync::Arc;
use std::time::Duration;

use odte_core::error::EngineError;
use odte_core::session::SessionClock;
use odte_core::traits::{OrderSink, QuoteSource};
use odte_core::types::{
    NormalizedTick, OrderUpdate, PositionSnapshot, PositionStatusView,
};
use odte_core::TradingResult;
use odte_risk::{RiskConfig, TradeGenerator};
use odte_signal::{SignalEngine, SignalEngineConfig};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::events::{AuditEvent, EngineEvent};
use crate::manager::PositionManager;
use crate::monitor::{MonitorConfig, QuoteMonitor};

/// Assembled engine configuration.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub risk: RiskConfig,
    pub signal: SignalEngineConfig,
    pub monitor: MonitorConfig,
}

/// The running decision core.
///
/// Owns the synchronous signal/entry path (signal engine and trade
/// generator run inline on each tick) and the background tasks: the
/// manager actor, the session-clock heartbeat and the order-update
/// forwarder.
pub struct TradingEngine {
    signal_engine: SignalEngine,
    generator: TradeGenerator,
    events_tx: mpsc::Sender<EngineEvent>,
    status_rx: watch::Receiver<PositionStatusView>,
    audit_tx: broadcast::Sender<AuditEvent>,
    manager_task: JoinHandle<()>,
    clock_task: JoinHandle<()>,
    forward_task: JoinHandle<()>,
}

impl TradingEngine {
    /// Wire up and start the engine tasks.
    ///
    /// `order_updates` is the order sink's asynchronous fill/rejection
    /// stream; the engine forwards it into the manager's channel.
    pub fn start(
        config: EngineConfig,
        sink: Arc<dyn OrderSink>,
        quotes: Arc<dyn QuoteSource>,
        clock: Arc<dyn SessionClock>,
        mut order_updates: mpsc::Receiver<OrderUpdate>,
    ) -> Self {
        let (events_tx, mut events_rx) = mpsc::channel::<EngineEvent>(256);
        let (status_tx, status_rx) = watch::channel(PositionStatusView::idle());
        let (audit_tx, _) = broadcast::channel(256);

        let monitor = QuoteMonitor::new(quotes, events_tx.clone(), config.monitor.clone());
        let mut manager = PositionManager::new(
            sink,
            clock.clone(),
            config.risk.clone(),
            monitor,
            status_tx,
            audit_tx.clone(),
        );
        let manager_task = tokio::spawn(async move {
            while let Some(event) = events_rx.recv().await {
                let stop = matches!(event, EngineEvent::Shutdown);
                manager.handle_event(event).await;
                if stop {
                    break;
                }
            }
        });

        let clock_tx = events_tx.clone();
        let heartbeat_clock = clock;
        let clock_task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let now = heartbeat_clock.now();
                if clock_tx.send(EngineEvent::ClockTick(now)).await.is_err() {
                    break;
                }
            }
        });

        let order_tx = events_tx.clone();
        let forward_task = tokio::spawn(async move {
            while let Some(update) = order_updates.recv().await {
                if order_tx.send(EngineEvent::Order(update)).await.is_err() {
                    break;
                }
            }
        });

        let generator = TradeGenerator::new(config.risk, status_rx.clone());
        let signal_engine = SignalEngine::new(config.signal);

        Self {
            signal_engine,
            generator,
            events_tx,
            status_rx,
            audit_tx,
            manager_task,
            clock_task,
            forward_task,
        }
    }

    /// Feed one normalized tick through the signal and entry path.
    ///
    /// Malformed ticks are logged and skipped; the engine resumes from the
    /// last good tick.
    pub async fn process_tick(&mut self, tick: NormalizedTick) -> TradingResult<()> {
        if let Some(quote) = tick.option.clone() {
            self.send(EngineEvent::Quote(quote)).await?;
        }
        match self.signal_engine.on_tick(&tick) {
            Ok(Some(signal)) => {
                let intent = self.generator.generate(&signal);
                self.send(EngineEvent::Signal(signal)).await?;
                if let Some(intent) = intent {
                    self.send(EngineEvent::Intent(intent)).await?;
                }
            }
            Ok(None) => {}
            Err(err) => {
                warn!(%err, "malformed tick skipped");
            }
        }
        Ok(())
    }

    /// Seed position state from the broker's authoritative report. Call
    /// before resuming tick processing after a restart.
    pub async fn reconcile(&self, snapshot: Option<PositionSnapshot>) -> TradingResult<()> {
        self.send(EngineEvent::Reconcile(snapshot)).await
    }

    /// Close any open position.
    pub async fn close_all(&self, reason: &str) -> TradingResult<()> {
        self.send(EngineEvent::CloseAll {
            reason: reason.to_string(),
        })
        .await
    }

    /// Watch the manager's published position book.
    pub fn status(&self) -> watch::Receiver<PositionStatusView> {
        self.status_rx.clone()
    }

    /// Subscribe to the audit stream (signals, intents, executions,
    /// anomalies).
    pub fn subscribe_audit(&self) -> broadcast::Receiver<AuditEvent> {
        self.audit_tx.subscribe()
    }

    /// Stop the engine tasks. Does not close positions; call
    /// [`close_all`](Self::close_all) first when that is wanted.
    pub async fn shutdown(self) -> TradingResult<()> {
        self.send(EngineEvent::Shutdown).await?;
        self.clock_task.abort();
        self.forward_task.abort();
        if self.manager_task.await.is_err() {
            warn!("manager task ended abnormally");
        }
        info!("trading engine stopped");
        Ok(())
    }

    async fn send(&self, event: EngineEvent) -> TradingResult<()> {
        self.events_tx
            .send(event)
            .await
            .map_err(|_| EngineError::ChannelClosed.into())
    }
}
