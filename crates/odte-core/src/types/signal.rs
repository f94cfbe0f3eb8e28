//! Trade signal types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a VWAP/MA9 crossover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalDirection {
    /// VWAP crossed above MA9
    BullishCrossover,
    /// VWAP crossed below MA9
    BearishCrossover,
}

impl SignalDirection {
    /// Get the opposite direction.
    pub fn opposite(&self) -> Self {
        match self {
            SignalDirection::BullishCrossover => SignalDirection::BearishCrossover,
            SignalDirection::BearishCrossover => SignalDirection::BullishCrossover,
        }
    }
}

impl std::fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalDirection::BullishCrossover => write!(f, "bullish-crossover"),
            SignalDirection::BearishCrossover => write!(f, "bearish-crossover"),
        }
    }
}

/// A directional trade signal emitted on a crossover, outside the cooldown
/// window. Consumed once by the trade generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    /// Detection timestamp
    pub at: DateTime<Utc>,
    /// Crossover direction
    pub direction: SignalDirection,
    /// Contract to act on
    pub option_symbol: String,
    /// Price the entry limit is derived from (option bid; a short entry
    /// fills at the bid or better)
    pub reference_price: Decimal,
    /// Human-readable trigger description
    pub rationale: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_opposite() {
        assert_eq!(
            SignalDirection::BullishCrossover.opposite(),
            SignalDirection::BearishCrossover
        );
        assert_eq!(
            SignalDirection::BearishCrossover.opposite(),
            SignalDirection::BullishCrossover
        );
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(
            SignalDirection::BullishCrossover.to_string(),
            "bullish-crossover"
        );
    }
}
