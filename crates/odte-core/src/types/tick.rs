//! Normalized market data samples.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Live quote for a single option contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionQuote {
    /// OCC option symbol
    pub option_symbol: String,
    /// Strike price
    pub strike: Decimal,
    /// Best bid
    pub bid: Decimal,
    /// Best ask
    pub ask: Decimal,
    /// Last traded price
    pub last: Decimal,
    /// Contract expiry
    pub expiry: DateTime<Utc>,
    /// Quote timestamp
    pub at: DateTime<Utc>,
}

impl OptionQuote {
    /// Midpoint of bid and ask.
    pub fn mid(&self) -> Decimal {
        (self.bid + self.ask) / Decimal::TWO
    }

    /// Bid/ask spread.
    pub fn spread(&self) -> Decimal {
        self.ask - self.bid
    }
}

/// One normalized period sample: underlying price, session VWAP, MA9, and
/// the nearest-expiry option quote when one is quotable.
///
/// Ticks are immutable once emitted and arrive in timestamp order; the
/// engine never buffers beyond the current and previous sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedTick {
    /// Sample timestamp
    pub at: DateTime<Utc>,
    /// Underlying symbol
    pub symbol: String,
    /// Underlying last price
    pub price: Decimal,
    /// Session volume-weighted average price
    pub session_vwap: Decimal,
    /// 9-period moving average of the underlying
    pub ma9: Decimal,
    /// Nearest 0DTE option quote, if available this period
    pub option: Option<OptionQuote>,
}

impl NormalizedTick {
    /// VWAP minus MA9, the crossover reference delta.
    pub fn vwap_ma9_delta(&self) -> Decimal {
        self.session_vwap - self.ma9
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quote_mid_and_spread() {
        let quote = OptionQuote {
            option_symbol: "QQQ250808C00480000".to_string(),
            strike: dec!(480),
            bid: dec!(1.90),
            ask: dec!(2.10),
            last: dec!(2.00),
            expiry: Utc::now(),
            at: Utc::now(),
        };
        assert_eq!(quote.mid(), dec!(2.00));
        assert_eq!(quote.spread(), dec!(0.20));
    }
}
