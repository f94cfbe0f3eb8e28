//! Traits at the external seams of the trading core.

mod order_sink;
mod quote_source;

pub use order_sink::OrderSink;
pub use quote_source::QuoteSource;
