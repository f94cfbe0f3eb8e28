//! The position/trade manager state machine.
//!
//! Sole owner and writer of the position slot. Entry intents, quote
//! updates, fills, signals and the session clock all pass through
//! [`PositionManager::handle_event`], which checks the current state before
//! acting; nothing else may create, mutate or retire a position.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use odte_core::session::SessionClock;
use odte_core::traits::OrderSink;
use odte_core::types::{
    FillStatus, OptionQuote, OrderUpdate, Position, PositionPhase, PositionSnapshot,
    PositionStatusView, Signal, SignalDirection, TradeExecution, TradeIntent,
};
use odte_risk::{evaluate_exit, ExitContext, ExitReason, RiskConfig};
use rust_decimal::Decimal;
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};

use crate::events::{AuditEvent, EngineEvent};
use crate::monitor::QuoteMonitor;

/// Position slot lifecycle. The closed state is represented by the return
/// to `Idle` once the exit fill's P/L has been recorded.
enum SlotState {
    Idle,
    PendingEntry {
        intent: TradeIntent,
        submitted_at: DateTime<Utc>,
    },
    Open {
        position: Position,
    },
    PendingExit {
        position: Position,
        reason: ExitReason,
        intent: TradeIntent,
    },
}

impl SlotState {
    fn name(&self) -> &'static str {
        match self {
            SlotState::Idle => "idle",
            SlotState::PendingEntry { .. } => "pending-entry",
            SlotState::Open { .. } => "open",
            SlotState::PendingExit { .. } => "pending-exit",
        }
    }

    fn phase(&self) -> PositionPhase {
        match self {
            SlotState::Idle => PositionPhase::Idle,
            SlotState::PendingEntry { .. } => PositionPhase::PendingEntry,
            SlotState::Open { .. } => PositionPhase::Open,
            SlotState::PendingExit { .. } => PositionPhase::PendingExit,
        }
    }

    fn option_symbol(&self) -> Option<&str> {
        match self {
            SlotState::Idle => None,
            SlotState::PendingEntry { intent, .. } => Some(&intent.option_symbol),
            SlotState::Open { position } | SlotState::PendingExit { position, .. } => {
                Some(&position.option_symbol)
            }
        }
    }
}

/// The single-owner actor over the position slot.
pub struct PositionManager {
    sink: Arc<dyn OrderSink>,
    clock: Arc<dyn SessionClock>,
    risk: RiskConfig,
    monitor: QuoteMonitor,
    state: SlotState,
    entries_halted: bool,
    quotes_degraded: bool,
    last_quote: Option<OptionQuote>,
    status_tx: watch::Sender<PositionStatusView>,
    audit_tx: broadcast::Sender<AuditEvent>,
}

impl PositionManager {
    /// Create a manager in the idle state.
    pub fn new(
        sink: Arc<dyn OrderSink>,
        clock: Arc<dyn SessionClock>,
        risk: RiskConfig,
        monitor: QuoteMonitor,
        status_tx: watch::Sender<PositionStatusView>,
        audit_tx: broadcast::Sender<AuditEvent>,
    ) -> Self {
        Self {
            sink,
            clock,
            risk,
            monitor,
            state: SlotState::Idle,
            entries_halted: false,
            quotes_degraded: false,
            last_quote: None,
            status_tx,
            audit_tx,
        }
    }

    /// Process one inbound event. This is the system's serialization point:
    /// the caller must never run two invocations concurrently.
    pub async fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Signal(signal) => self.on_signal(signal).await,
            EngineEvent::Intent(intent) => self.on_entry_intent(intent).await,
            EngineEvent::Quote(quote) => self.on_quote(quote).await,
            EngineEvent::QuotesDegraded { option_symbol, at } => {
                self.on_quotes_degraded(&option_symbol, at)
            }
            EngineEvent::Order(update) => self.on_order_update(update).await,
            EngineEvent::ClockTick(now) => self.on_clock_tick(now).await,
            EngineEvent::Reconcile(snapshot) => self.on_reconcile(snapshot),
            EngineEvent::CloseAll { reason } => self.on_close_all(&reason).await,
            EngineEvent::Shutdown => self.shutdown(),
        }
    }

    /// Disarm the monitor and stop. Any in-flight order is left to the
    /// restart reconciliation.
    pub fn shutdown(&mut self) {
        self.monitor.disarm();
        info!(state = self.state.name(), "position manager stopped");
    }

    /// Whether the quote monitor is polling right now.
    pub fn is_monitor_armed(&self) -> bool {
        self.monitor.is_armed()
    }

    async fn on_entry_intent(&mut self, intent: TradeIntent) {
        if !intent.is_entry() {
            warn!(intent_id = %intent.id, "non-entry intent on the entry path, dropped");
            self.audit_anomaly(format!(
                "close intent {} routed to the entry path",
                intent.id
            ));
            return;
        }
        if self.entries_halted {
            warn!(
                intent_id = %intent.id,
                "entry rejected: entries halted pending reconciliation"
            );
            self.audit_anomaly(format!("entry intent {} while entries halted", intent.id));
            return;
        }
        if !matches!(self.state, SlotState::Idle) {
            // The enforcement point of record for the single-position rule.
            warn!(
                state = self.state.name(),
                intent_id = %intent.id,
                option_symbol = %intent.option_symbol,
                "entry rejected: position slot occupied"
            );
            self.audit_anomaly(format!(
                "entry intent {} while slot {}",
                intent.id,
                self.state.name()
            ));
            return;
        }

        self.audit(AuditEvent::Intent(intent.clone()));
        match self.sink.submit(&intent).await {
            Ok(()) => {
                info!(
                    intent_id = %intent.id,
                    option_symbol = %intent.option_symbol,
                    quantity = intent.quantity,
                    limit = %intent.limit_price,
                    "entry submitted"
                );
                self.state = SlotState::PendingEntry {
                    intent,
                    submitted_at: self.clock.now(),
                };
                self.publish_status();
            }
            Err(err) => {
                error!(intent_id = %intent.id, %err, "entry submission failed");
            }
        }
    }

    async fn on_order_update(&mut self, update: OrderUpdate) {
        let state = std::mem::replace(&mut self.state, SlotState::Idle);
        match state {
            SlotState::PendingEntry { intent, .. } if intent.id == update.intent_id => {
                match update.status {
                    FillStatus::Filled { price, at } => {
                        match Position::from_entry(&intent, price, at) {
                            Some(position) => {
                                info!(
                                    option_symbol = %position.option_symbol,
                                    entry_credit = %price,
                                    "entry filled, position open"
                                );
                                self.audit(AuditEvent::Execution(TradeExecution {
                                    intent,
                                    fill_price: price,
                                    pnl_contrib: Decimal::ZERO,
                                    at,
                                }));
                                self.monitor.arm(&position.option_symbol);
                                self.state = SlotState::Open { position };
                            }
                            None => {
                                error!(
                                    intent_id = %intent.id,
                                    "entry fill for an intent without risk prices"
                                );
                                self.audit_anomaly(format!(
                                    "unusable entry fill for intent {}",
                                    intent.id
                                ));
                                self.entries_halted = true;
                            }
                        }
                    }
                    FillStatus::Rejected { reason } => {
                        warn!(intent_id = %intent.id, %reason, "entry rejected by order sink");
                        // No position was ever created; slot stays free.
                    }
                }
            }
            SlotState::PendingExit {
                position,
                reason,
                intent,
            } if intent.id == update.intent_id => match update.status {
                FillStatus::Filled { price, at } => {
                    let pnl = position.realized_pnl(price);
                    // Disarm before recording anything: no quote-triggered
                    // evaluation may happen once the position is closed.
                    self.monitor.disarm();
                    info!(
                        option_symbol = %position.option_symbol,
                        %reason,
                        fill = %price,
                        pnl = %pnl,
                        "exit filled, position closed"
                    );
                    self.audit(AuditEvent::Execution(TradeExecution {
                        intent,
                        fill_price: price,
                        pnl_contrib: pnl,
                        at,
                    }));
                    self.quotes_degraded = false;
                    self.last_quote = None;
                }
                FillStatus::Rejected { reason: why } => {
                    warn!(
                        intent_id = %intent.id,
                        %why,
                        "exit rejected, retrying on the next trigger evaluation"
                    );
                    self.state = SlotState::Open { position };
                }
            },
            other => {
                if matches!(other, SlotState::Idle)
                    && matches!(update.status, FillStatus::Filled { .. })
                {
                    error!(
                        intent_id = %update.intent_id,
                        "fill for an abandoned order: broker holds a position this manager does not track"
                    );
                    self.audit_anomaly(format!(
                        "late fill for intent {} with no pending order",
                        update.intent_id
                    ));
                    self.entries_halted = true;
                } else {
                    warn!(
                        intent_id = %update.intent_id,
                        state = other.name(),
                        "unmatched order update ignored"
                    );
                }
                self.state = other;
            }
        }
        self.publish_status();
    }

    async fn on_quote(&mut self, quote: OptionQuote) {
        let position = match &self.state {
            SlotState::Open { position } => position.clone(),
            SlotState::PendingExit { .. } => {
                // Only the latest value matters while the exit is in flight.
                self.quotes_degraded = false;
                self.last_quote = Some(quote);
                return;
            }
            _ => {
                debug!(
                    option_symbol = %quote.option_symbol,
                    "quote update with no open position, ignored"
                );
                return;
            }
        };
        if quote.option_symbol != position.option_symbol {
            warn!(
                expected = %position.option_symbol,
                got = %quote.option_symbol,
                "quote for a different contract ignored"
            );
            return;
        }

        self.quotes_degraded = false;
        self.last_quote = Some(quote.clone());
        let cx = ExitContext {
            mark: Some(quote.mid()),
            past_session_cutoff: self.clock.is_past_close_cutoff(quote.at),
            quotes_degraded: false,
            reverse_signal: false,
        };
        if let Some(reason) = evaluate_exit(&position, &cx) {
            self.begin_exit(position, reason, quote.mid(), quote.at).await;
        }
    }

    async fn on_signal(&mut self, signal: Signal) {
        self.audit(AuditEvent::Signal(signal.clone()));
        let position = match &self.state {
            SlotState::Open { position } => position.clone(),
            _ => {
                debug!(
                    direction = %signal.direction,
                    state = self.state.name(),
                    "signal observed without an open position"
                );
                return;
            }
        };
        if signal.direction == position.direction {
            debug!(direction = %signal.direction, "same-direction signal while open, ignored");
            return;
        }

        // A reverse signal re-evaluates every trigger against the latest
        // quote so that a simultaneously breached stop-loss wins.
        let mark = self.last_quote.as_ref().map(OptionQuote::mid);
        let cx = ExitContext {
            mark,
            past_session_cutoff: self.clock.is_past_close_cutoff(signal.at),
            quotes_degraded: self.quotes_degraded,
            reverse_signal: true,
        };
        if let Some(reason) = evaluate_exit(&position, &cx) {
            let limit = mark.unwrap_or(position.entry_credit);
            self.begin_exit(position, reason, limit, signal.at).await;
        }
    }

    async fn on_clock_tick(&mut self, now: DateTime<Utc>) {
        match &self.state {
            SlotState::PendingEntry { intent, submitted_at } => {
                if now - *submitted_at > self.risk.entry_timeout() {
                    warn!(
                        intent_id = %intent.id,
                        "entry unconfirmed past timeout, abandoning"
                    );
                    self.audit_anomaly(format!("entry intent {} timed out", intent.id));
                    self.state = SlotState::Idle;
                    self.publish_status();
                }
            }
            SlotState::Open { position } => {
                if self.clock.is_past_close_cutoff(now) {
                    let position = position.clone();
                    let limit = self
                        .last_quote
                        .as_ref()
                        .map(OptionQuote::mid)
                        .unwrap_or(position.entry_credit);
                    self.begin_exit(position, ExitReason::SessionClose, limit, now)
                        .await;
                }
            }
            _ => {}
        }
    }

    fn on_quotes_degraded(&mut self, option_symbol: &str, at: DateTime<Utc>) {
        if matches!(
            self.state,
            SlotState::Open { .. } | SlotState::PendingExit { .. }
        ) {
            warn!(
                option_symbol,
                %at,
                "quotes degraded; price triggers suspended until a fresh quote arrives"
            );
            self.quotes_degraded = true;
            self.audit_anomaly(format!("quotes degraded for {option_symbol}"));
        }
    }

    fn on_reconcile(&mut self, snapshot: Option<PositionSnapshot>) {
        let state = std::mem::replace(&mut self.state, SlotState::Idle);
        match (state, snapshot) {
            (SlotState::Idle, None) => {
                info!("reconciled: no position on either side");
            }
            (SlotState::PendingEntry { intent, .. }, None) => {
                info!(intent_id = %intent.id, "reconciled: in-flight entry never filled");
            }
            (SlotState::Idle, Some(snap)) | (SlotState::PendingEntry { .. }, Some(snap)) => {
                // Seed state from the broker's report.
                info!(
                    symbol = %snap.symbol,
                    quantity = snap.quantity,
                    average_price = %snap.average_price,
                    "adopting broker-reported position"
                );
                let position = self.position_from_snapshot(&snap);
                self.monitor.arm(&position.option_symbol);
                self.state = SlotState::Open { position };
            }
            (
                SlotState::Open { position } | SlotState::PendingExit { position, .. },
                Some(snap),
            ) if snap.symbol == position.option_symbol => {
                info!(
                    option_symbol = %position.option_symbol,
                    "reconciled: broker confirms the open position"
                );
                // An exit that was in flight at shutdown is unknowable now;
                // hold the position and let the triggers fire again.
                self.monitor.arm(&position.option_symbol);
                self.state = SlotState::Open { position };
            }
            (SlotState::Open { position } | SlotState::PendingExit { position, .. }, None) => {
                warn!(
                    option_symbol = %position.option_symbol,
                    "broker reports no position; clearing internal state without emitting an exit"
                );
                self.audit_anomaly(format!(
                    "internal position {} absent at broker, cleared",
                    position.option_symbol
                ));
                self.monitor.disarm();
            }
            (state, Some(snap)) => {
                error!(
                    symbol = %snap.symbol,
                    state = state.name(),
                    "broker position does not match internal state; halting entries"
                );
                self.audit_anomaly(format!(
                    "unreconciled broker position {} against internal {}",
                    snap.symbol,
                    state.name()
                ));
                self.entries_halted = true;
                self.monitor.disarm();
            }
        }
        self.publish_status();
    }

    async fn on_close_all(&mut self, reason: &str) {
        let position = match &self.state {
            SlotState::Open { position } => position.clone(),
            other => {
                debug!(reason, state = other.name(), "close-all with nothing to close");
                return;
            }
        };
        info!(reason, option_symbol = %position.option_symbol, "close-all requested");
        let limit = self
            .last_quote
            .as_ref()
            .map(OptionQuote::mid)
            .unwrap_or(position.entry_credit);
        let at = self.clock.now();
        self.begin_exit(position, ExitReason::Shutdown, limit, at).await;
    }

    async fn begin_exit(
        &mut self,
        position: Position,
        reason: ExitReason,
        limit: Decimal,
        at: DateTime<Utc>,
    ) {
        let intent = TradeIntent::close(
            at,
            position.direction,
            position.option_symbol.clone(),
            position.quantity,
            limit,
        );
        self.audit(AuditEvent::Intent(intent.clone()));
        info!(
            option_symbol = %position.option_symbol,
            %reason,
            limit = %limit,
            quantity = position.quantity,
            "exit submitted"
        );
        match self.sink.submit(&intent).await {
            Ok(()) => {
                self.state = SlotState::PendingExit {
                    position,
                    reason,
                    intent,
                };
            }
            Err(err) => {
                // An unresolved exit attempt is retried, not abandoned: the
                // monitor stays armed and the next quote re-evaluates.
                error!(%err, %reason, "exit submission failed, holding position");
                self.state = SlotState::Open { position };
            }
        }
        self.publish_status();
    }

    fn position_from_snapshot(&self, snap: &PositionSnapshot) -> Position {
        let entry = snap.average_price;
        Position {
            option_symbol: snap.symbol.clone(),
            direction: direction_from_occ(&snap.symbol).unwrap_or_else(|| {
                warn!(symbol = %snap.symbol, "cannot infer contract right, assuming call");
                SignalDirection::BullishCrossover
            }),
            quantity: snap.quantity.unsigned_abs() as u32,
            entry_credit: entry,
            stop_loss: self.risk.stop_loss_price(entry),
            take_profit: self.risk.take_profit_price(entry),
            opened_at: snap.at,
        }
    }

    fn publish_status(&self) {
        self.status_tx.send_replace(PositionStatusView {
            phase: self.state.phase(),
            option_symbol: self.state.option_symbol().map(str::to_string),
            entries_halted: self.entries_halted,
        });
    }

    fn audit(&self, event: AuditEvent) {
        // Nobody listening is fine: decisions never depend on the audit
        // stream being consumed.
        let _ = self.audit_tx.send(event);
    }

    fn audit_anomaly(&self, description: String) {
        self.audit(AuditEvent::Anomaly {
            description,
            at: self.clock.now(),
        });
    }
}

/// Contract right from an OCC symbol: a short call is opened on a bullish
/// crossover, a short put on a bearish one.
fn direction_from_occ(symbol: &str) -> Option<SignalDirection> {
    let bytes = symbol.as_bytes();
    if bytes.len() < 9 {
        return None;
    }
    match bytes[bytes.len() - 9] {
        b'C' => Some(SignalDirection::BullishCrossover),
        b'P' => Some(SignalDirection::BearishCrossover),
        _ => None,
    }
}
