//! Order sink trait definition.

use crate::error::BrokerError;
use crate::types::TradeIntent;
use async_trait::async_trait;

/// Trait for the broker trading endpoint.
///
/// Submission is fire-then-callback: `submit` returns once the order has
/// been accepted for handling, and fills or rejections arrive later as
/// [`OrderUpdate`](crate::types::OrderUpdate) notifications on the channel
/// the implementation was constructed with. The manager therefore moves to
/// a pending state on submission instead of blocking on the fill.
#[async_trait]
pub trait OrderSink: Send + Sync {
    /// Submit a trade intent for execution.
    async fn submit(&self, intent: &TradeIntent) -> Result<(), BrokerError>;

    /// Sink name for logging.
    fn name(&self) -> &str;
}
