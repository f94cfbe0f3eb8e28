//! Entry intent generation from signals.

use odte_core::types::{PositionStatusView, Signal, TradeIntent};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::RiskConfig;

/// Pure transformer from a trade signal into a risk-bounded entry intent.
///
/// Always produces an `open-short` intent sized at the configured contract
/// count, with a limit at the signal's reference price (the option bid) and
/// stop/take-profit buy-back prices derived from the risk multiples.
pub struct TradeGenerator {
    risk: RiskConfig,
    position_book: watch::Receiver<PositionStatusView>,
}

impl TradeGenerator {
    /// Create a generator reading the manager's published position book.
    pub fn new(risk: RiskConfig, position_book: watch::Receiver<PositionStatusView>) -> Self {
        Self {
            risk,
            position_book,
        }
    }

    /// Turn a signal into an entry intent.
    ///
    /// Returns `None` and logs a rejection when the position book already
    /// reports an occupied slot. The manager's transition gate re-checks
    /// this; the generator has no authority to override it.
    pub fn generate(&self, signal: &Signal) -> Option<TradeIntent> {
        let book = self.position_book.borrow().clone();
        if !book.accepts_entries() {
            warn!(
                phase = %book.phase,
                halted = book.entries_halted,
                option_symbol = %signal.option_symbol,
                "entry generation rejected by position book"
            );
            return None;
        }

        let limit = signal.reference_price;
        let intent = TradeIntent::open_short(
            signal.at,
            signal.direction,
            signal.option_symbol.clone(),
            self.risk.max_contracts,
            limit,
            self.risk.stop_loss_price(limit),
            self.risk.take_profit_price(limit),
        );
        debug!(
            intent_id = %intent.id,
            option_symbol = %intent.option_symbol,
            limit = %limit,
            "entry intent generated"
        );
        Some(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use odte_core::types::{PositionPhase, SignalDirection};
    use rust_decimal_macros::dec;

    fn signal() -> Signal {
        Signal {
            at: Utc::now(),
            direction: SignalDirection::BullishCrossover,
            option_symbol: "QQQ250808C00480000".to_string(),
            reference_price: dec!(2.00),
            rationale: "VWAP/MA9 crossover detected".to_string(),
        }
    }

    #[test]
    fn test_generate_entry_intent() {
        let (_tx, rx) = watch::channel(PositionStatusView::idle());
        let generator = TradeGenerator::new(RiskConfig::default(), rx);

        let intent = generator.generate(&signal()).expect("idle book accepts");
        assert_eq!(intent.quantity, 25);
        assert_eq!(intent.limit_price, dec!(2.00));
        assert_eq!(intent.stop_loss, Some(dec!(6.00)));
        assert_eq!(intent.take_profit, Some(dec!(1.00)));
    }

    #[test]
    fn test_generate_rejected_while_position_open() {
        let (tx, rx) = watch::channel(PositionStatusView::idle());
        let generator = TradeGenerator::new(RiskConfig::default(), rx);

        tx.send_replace(PositionStatusView {
            phase: PositionPhase::Open,
            option_symbol: Some("QQQ250808C00480000".to_string()),
            entries_halted: false,
        });
        assert!(generator.generate(&signal()).is_none());
    }

    #[test]
    fn test_generate_rejected_while_halted() {
        let (tx, rx) = watch::channel(PositionStatusView::idle());
        let generator = TradeGenerator::new(RiskConfig::default(), rx);

        tx.send_replace(PositionStatusView {
            phase: PositionPhase::Idle,
            option_symbol: None,
            entries_halted: true,
        });
        assert!(generator.generate(&signal()).is_none());
    }
}
