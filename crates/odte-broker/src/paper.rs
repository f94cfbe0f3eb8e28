//! Paper order sink with simulated asynchronous fills.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use odte_core::error::BrokerError;
use odte_core::traits::OrderSink;
use odte_core::types::{OrderUpdate, TradeIntent};
use tokio::sync::mpsc;
use tracing::debug;

/// Simulated broker endpoint.
///
/// Accepts every intent and reports a fill at the limit price after a
/// short delay, over the same asynchronous notification channel a live
/// sink would use. Keeps the manager's fire-then-await-callback contract
/// honest in paper runs and tests.
pub struct PaperBroker {
    updates: mpsc::Sender<OrderUpdate>,
    fill_delay: Duration,
}

impl PaperBroker {
    /// Create a paper broker reporting fills on `updates`.
    pub fn new(updates: mpsc::Sender<OrderUpdate>) -> Self {
        Self {
            updates,
            fill_delay: Duration::from_millis(50),
        }
    }

    /// Set the simulated time-to-fill.
    pub fn with_fill_delay(mut self, delay: Duration) -> Self {
        self.fill_delay = delay;
        self
    }
}

#[async_trait]
impl OrderSink for PaperBroker {
    async fn submit(&self, intent: &TradeIntent) -> Result<(), BrokerError> {
        debug!(
            intent_id = %intent.id,
            action = %intent.action,
            option_symbol = %intent.option_symbol,
            limit = %intent.limit_price,
            "paper order accepted"
        );
        let updates = self.updates.clone();
        let intent_id = intent.id;
        let price = intent.limit_price;
        let delay = self.fill_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let update = OrderUpdate::filled(intent_id, price, Utc::now());
            if updates.send(update).await.is_err() {
                debug!(%intent_id, "engine gone before the paper fill landed");
            }
        });
        Ok(())
    }

    fn name(&self) -> &str {
        "paper"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odte_core::types::{FillStatus, SignalDirection};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_paper_fill_at_limit() {
        let (tx, mut rx) = mpsc::channel(4);
        let broker = PaperBroker::new(tx).with_fill_delay(Duration::from_millis(1));

        let intent = TradeIntent::open_short(
            Utc::now(),
            SignalDirection::BullishCrossover,
            "QQQ250808C00480000",
            25,
            dec!(2.00),
            dec!(6.00),
            dec!(1.00),
        );
        broker.submit(&intent).await.unwrap();

        let update = rx.recv().await.expect("fill notification");
        assert_eq!(update.intent_id, intent.id);
        match update.status {
            FillStatus::Filled { price, .. } => assert_eq!(price, dec!(2.00)),
            other => panic!("expected a fill, got {other:?}"),
        }
    }
}
