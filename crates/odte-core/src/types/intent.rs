//! Trade intent types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SignalDirection;

/// What a trade intent does to the position slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TradeAction {
    /// Sell to open a short option position
    OpenShort,
    /// Buy to close the open position
    Close,
}

impl std::fmt::Display for TradeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeAction::OpenShort => write!(f, "open-short"),
            TradeAction::Close => write!(f, "close"),
        }
    }
}

/// A risk-bounded order instruction, consumed exactly once by the order
/// sink. Immutable after creation.
///
/// Stop-loss and take-profit prices are present only on `OpenShort`
/// intents; both are expressed as buy-back prices (a short position's stop
/// is a higher buy-back price, its take-profit a lower one).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeIntent {
    /// Unique intent ID, echoed back in fill notifications
    pub id: Uuid,
    /// Creation timestamp
    pub at: DateTime<Utc>,
    /// Open or close
    pub action: TradeAction,
    /// Crossover regime that motivated the order
    pub direction: SignalDirection,
    /// Contract to trade
    pub option_symbol: String,
    /// Number of contracts
    pub quantity: u32,
    /// Limit price
    pub limit_price: Decimal,
    /// Buy-back price at which the position is stopped out
    pub stop_loss: Option<Decimal>,
    /// Buy-back price at which profit is taken
    pub take_profit: Option<Decimal>,
}

impl TradeIntent {
    /// Create an entry intent for a short option position.
    pub fn open_short(
        at: DateTime<Utc>,
        direction: SignalDirection,
        option_symbol: impl Into<String>,
        quantity: u32,
        limit_price: Decimal,
        stop_loss: Decimal,
        take_profit: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            at,
            action: TradeAction::OpenShort,
            direction,
            option_symbol: option_symbol.into(),
            quantity,
            limit_price,
            stop_loss: Some(stop_loss),
            take_profit: Some(take_profit),
        }
    }

    /// Create an exit intent fully offsetting an open position.
    pub fn close(
        at: DateTime<Utc>,
        direction: SignalDirection,
        option_symbol: impl Into<String>,
        quantity: u32,
        limit_price: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            at,
            action: TradeAction::Close,
            direction,
            option_symbol: option_symbol.into(),
            quantity,
            limit_price,
            stop_loss: None,
            take_profit: None,
        }
    }

    /// Check if this is an entry intent.
    pub fn is_entry(&self) -> bool {
        self.action == TradeAction::OpenShort
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_open_short_carries_risk_prices() {
        let intent = TradeIntent::open_short(
            Utc::now(),
            SignalDirection::BullishCrossover,
            "QQQ250808C00480000",
            25,
            dec!(2.00),
            dec!(6.00),
            dec!(1.00),
        );
        assert!(intent.is_entry());
        assert_eq!(intent.stop_loss, Some(dec!(6.00)));
        assert_eq!(intent.take_profit, Some(dec!(1.00)));
    }

    #[test]
    fn test_close_has_no_risk_prices() {
        let intent = TradeIntent::close(
            Utc::now(),
            SignalDirection::BullishCrossover,
            "QQQ250808C00480000",
            25,
            dec!(1.50),
        );
        assert!(!intent.is_entry());
        assert_eq!(intent.stop_loss, None);
        assert_eq!(intent.take_profit, None);
    }
}
