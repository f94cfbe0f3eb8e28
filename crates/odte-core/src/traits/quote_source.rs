//! Quote source trait definition.

use crate::error::BrokerError;
use crate::types::OptionQuote;
use async_trait::async_trait;

/// Trait for the option quote endpoint polled while a position is open.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the current quote for an option contract.
    async fn fetch_option_quote(&self, option_symbol: &str)
        -> Result<OptionQuote, BrokerError>;
}
