//! Replay-fed quote source.

use std::sync::RwLock;

use async_trait::async_trait;
use odte_core::error::BrokerError;
use odte_core::traits::QuoteSource;
use odte_core::types::OptionQuote;

/// Quote source backed by the most recently published quote.
///
/// The paper command publishes each tick's embedded option quote here so
/// the quote monitor has something to poll, the same way a live source
/// would serve its latest book.
#[derive(Default)]
pub struct CachedQuoteSource {
    latest: RwLock<Option<OptionQuote>>,
}

impl CachedQuoteSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the latest quote.
    pub fn publish(&self, quote: OptionQuote) {
        if let Ok(mut latest) = self.latest.write() {
            *latest = Some(quote);
        }
    }
}

#[async_trait]
impl QuoteSource for CachedQuoteSource {
    async fn fetch_option_quote(
        &self,
        option_symbol: &str,
    ) -> Result<OptionQuote, BrokerError> {
        let latest = self
            .latest
            .read()
            .map_err(|_| BrokerError::Api("quote cache poisoned".into()))?;
        match latest.as_ref() {
            Some(quote) if quote.option_symbol == option_symbol => Ok(quote.clone()),
            _ => Err(BrokerError::QuoteUnavailable(option_symbol.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn quote(symbol: &str) -> OptionQuote {
        let now = Utc::now();
        OptionQuote {
            option_symbol: symbol.to_string(),
            strike: dec!(480),
            bid: dec!(1.90),
            ask: dec!(2.10),
            last: dec!(2.00),
            expiry: now,
            at: now,
        }
    }

    #[tokio::test]
    async fn test_serves_latest_matching_quote() {
        let source = CachedQuoteSource::new();
        assert!(source.fetch_option_quote("QQQ250808C00480000").await.is_err());

        source.publish(quote("QQQ250808C00480000"));
        let fetched = source.fetch_option_quote("QQQ250808C00480000").await.unwrap();
        assert_eq!(fetched.bid, dec!(1.90));

        // A different contract is not served stale data.
        assert!(source.fetch_option_quote("SPY250808P00540000").await.is_err());
    }
}
