//! Position types and the published position-book view.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{SignalDirection, TradeAction, TradeIntent};

/// Shares controlled by one option contract.
pub const CONTRACT_MULTIPLIER: u32 = 100;

/// The single open short option position.
///
/// Created on a confirmed entry fill and owned exclusively by the
/// position/trade manager; at most one instance is ever live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    /// Contract held short
    pub option_symbol: String,
    /// Crossover regime the position was opened on
    pub direction: SignalDirection,
    /// Number of contracts
    pub quantity: u32,
    /// Premium received per contract at open
    pub entry_credit: Decimal,
    /// Buy-back price at which the position is stopped out
    pub stop_loss: Decimal,
    /// Buy-back price at which profit is taken
    pub take_profit: Decimal,
    /// Entry fill timestamp
    pub opened_at: DateTime<Utc>,
}

impl Position {
    /// Build a position from a filled entry intent.
    ///
    /// Returns `None` if the intent is not an entry or is missing its risk
    /// prices; the caller treats that as an ordering anomaly.
    pub fn from_entry(
        intent: &TradeIntent,
        fill_price: Decimal,
        filled_at: DateTime<Utc>,
    ) -> Option<Self> {
        if intent.action != TradeAction::OpenShort {
            return None;
        }
        let (stop_loss, take_profit) = match (intent.stop_loss, intent.take_profit) {
            (Some(stop), Some(take)) => (stop, take),
            _ => return None,
        };
        Some(Self {
            option_symbol: intent.option_symbol.clone(),
            direction: intent.direction,
            quantity: intent.quantity,
            entry_credit: fill_price,
            stop_loss,
            take_profit,
            opened_at: filled_at,
        })
    }

    /// Realized P/L for buying the short back at `exit_price`.
    pub fn realized_pnl(&self, exit_price: Decimal) -> Decimal {
        (self.entry_credit - exit_price)
            * Decimal::from(self.quantity)
            * Decimal::from(CONTRACT_MULTIPLIER)
    }
}

/// Broker-reported position used to seed state on restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSnapshot {
    /// Contract symbol
    pub symbol: String,
    /// Signed contract count (negative for short)
    pub quantity: i64,
    /// Average entry price
    pub average_price: Decimal,
    /// Current market value
    pub market_value: Decimal,
    /// Snapshot timestamp
    pub at: DateTime<Utc>,
}

/// Lifecycle phase of the position slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionPhase {
    Idle,
    PendingEntry,
    Open,
    PendingExit,
}

impl std::fmt::Display for PositionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionPhase::Idle => write!(f, "idle"),
            PositionPhase::PendingEntry => write!(f, "pending-entry"),
            PositionPhase::Open => write!(f, "open"),
            PositionPhase::PendingExit => write!(f, "pending-exit"),
        }
    }
}

/// Read-only position-book view published by the manager.
///
/// The trade generator consults this before producing an entry intent; the
/// manager's own transition gate remains the enforcement point of record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionStatusView {
    /// Current lifecycle phase
    pub phase: PositionPhase,
    /// Contract occupying the slot, if any
    pub option_symbol: Option<String>,
    /// True when a state desync has halted new entries
    pub entries_halted: bool,
}

impl PositionStatusView {
    /// View for an empty, healthy position slot.
    pub fn idle() -> Self {
        Self {
            phase: PositionPhase::Idle,
            option_symbol: None,
            entries_halted: false,
        }
    }

    /// Whether a new entry intent would currently be accepted.
    pub fn accepts_entries(&self) -> bool {
        self.phase == PositionPhase::Idle && !self.entries_halted
    }
}

impl Default for PositionStatusView {
    fn default() -> Self {
        Self::idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry_intent() -> TradeIntent {
        TradeIntent::open_short(
            Utc::now(),
            SignalDirection::BullishCrossover,
            "QQQ250808C00480000",
            25,
            dec!(2.00),
            dec!(6.00),
            dec!(1.00),
        )
    }

    #[test]
    fn test_from_entry() {
        let intent = entry_intent();
        let position = Position::from_entry(&intent, dec!(2.05), Utc::now()).unwrap();
        assert_eq!(position.entry_credit, dec!(2.05));
        assert_eq!(position.stop_loss, dec!(6.00));
        assert_eq!(position.quantity, 25);
    }

    #[test]
    fn test_from_entry_rejects_close_intents() {
        let intent = TradeIntent::close(
            Utc::now(),
            SignalDirection::BullishCrossover,
            "QQQ250808C00480000",
            25,
            dec!(1.50),
        );
        assert!(Position::from_entry(&intent, dec!(1.50), Utc::now()).is_none());
    }

    #[test]
    fn test_realized_pnl_short() {
        let intent = entry_intent();
        let position = Position::from_entry(&intent, dec!(2.00), Utc::now()).unwrap();
        // Bought back cheaper: profit.
        assert_eq!(position.realized_pnl(dec!(1.00)), dec!(2500.00));
        // Bought back at the stop: loss.
        assert_eq!(position.realized_pnl(dec!(6.00)), dec!(-10000.00));
    }

    #[test]
    fn test_status_view_gate() {
        let mut view = PositionStatusView::idle();
        assert!(view.accepts_entries());

        view.phase = PositionPhase::Open;
        assert!(!view.accepts_entries());

        view.phase = PositionPhase::Idle;
        view.entries_halted = true;
        assert!(!view.accepts_entries());
    }
}
