//! Events funneled into and out of the position/trade manager.

use chrono::{DateTime, Utc};
use odte_core::types::{
    OptionQuote, OrderUpdate, PositionSnapshot, Signal, TradeExecution, TradeIntent,
};
use serde::Serialize;

/// Inbound events, delivered to the manager over its single channel.
///
/// Serializing all inputs through one queue is what makes the
/// single-position invariant cheap to enforce: every transition sees a
/// settled state.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Signal from the signal engine (reverse-exit evaluation and audit)
    Signal(Signal),
    /// Entry intent from the trade generator
    Intent(TradeIntent),
    /// Quote update from the option quote monitor or a tick sample
    Quote(OptionQuote),
    /// The monitor exhausted its retry budget; quotes are stale
    QuotesDegraded {
        option_symbol: String,
        at: DateTime<Utc>,
    },
    /// Fill/rejection notification from the order sink
    Order(OrderUpdate),
    /// Session clock heartbeat
    ClockTick(DateTime<Utc>),
    /// Externally supplied broker position to reconcile against
    Reconcile(Option<PositionSnapshot>),
    /// Close any open position, e.g. on operator request or shutdown
    CloseAll { reason: String },
    /// Stop processing; the manager disarms the monitor and exits
    Shutdown,
}

/// Outbound observability events for the append-only audit collaborator.
///
/// Decisions never depend on anyone consuming these.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditEvent {
    Signal(Signal),
    Intent(TradeIntent),
    Execution(TradeExecution),
    Anomaly {
        description: String,
        at: DateTime<Utc>,
    },
}
