//! Session risk configuration.

use chrono::Duration;
use odte_core::error::RiskError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Risk parameters, read-only for the lifetime of a trading session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Stop-loss as a multiple added to the entry credit
    pub stop_loss_multiple: Decimal,
    /// Take-profit as a multiple subtracted from the entry credit
    pub take_profit_multiple: Decimal,
    /// Contracts per trade
    pub max_contracts: u32,
    /// Minimum seconds between two consecutive signals
    pub cooldown_secs: u64,
    /// Seconds before an unconfirmed entry order is abandoned
    pub entry_timeout_secs: u64,
    /// Lowest representable buy-back price
    pub min_contract_price: Decimal,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            stop_loss_multiple: dec!(2.0),
            take_profit_multiple: dec!(0.5),
            max_contracts: 25,
            cooldown_secs: 30,
            entry_timeout_secs: 30,
            min_contract_price: dec!(0.01),
        }
    }
}

impl RiskConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), RiskError> {
        if self.max_contracts == 0 {
            return Err(RiskError::InvalidConfig(
                "max_contracts must be at least 1".into(),
            ));
        }
        if self.stop_loss_multiple <= Decimal::ZERO {
            return Err(RiskError::InvalidConfig(
                "stop_loss_multiple must be positive".into(),
            ));
        }
        if self.take_profit_multiple <= Decimal::ZERO
            || self.take_profit_multiple >= Decimal::ONE
        {
            return Err(RiskError::InvalidConfig(
                "take_profit_multiple must be between 0 and 1".into(),
            ));
        }
        Ok(())
    }

    /// Buy-back price at which a short entered at `entry_limit` is stopped
    /// out.
    pub fn stop_loss_price(&self, entry_limit: Decimal) -> Decimal {
        entry_limit * (Decimal::ONE + self.stop_loss_multiple)
    }

    /// Buy-back price at which profit is taken, floored at the minimum
    /// contract price.
    pub fn take_profit_price(&self, entry_limit: Decimal) -> Decimal {
        (entry_limit * (Decimal::ONE - self.take_profit_multiple)).max(self.min_contract_price)
    }

    /// How long an entry order may stay unconfirmed.
    pub fn entry_timeout(&self) -> Duration {
        Duration::seconds(self.entry_timeout_secs as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_bounds() {
        let config = RiskConfig::default();
        assert_eq!(config.stop_loss_price(dec!(2.00)), dec!(6.00));
        assert_eq!(config.take_profit_price(dec!(2.00)), dec!(1.00));
    }

    #[test]
    fn test_take_profit_floors_at_one_cent() {
        let config = RiskConfig {
            take_profit_multiple: dec!(0.99),
            ..Default::default()
        };
        assert_eq!(config.take_profit_price(dec!(0.05)), dec!(0.01));
    }

    #[test]
    fn test_validation() {
        assert!(RiskConfig::default().validate().is_ok());

        let bad = RiskConfig {
            max_contracts: 0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let bad = RiskConfig {
            take_profit_multiple: dec!(1.5),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
