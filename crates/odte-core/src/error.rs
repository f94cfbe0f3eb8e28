//! Error types for the trading engine.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Top-level trading engine error.
#[derive(Error, Debug)]
pub enum TradingError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),

    #[error("Risk error: {0}")]
    Risk(#[from] RiskError),

    #[error("Broker error: {0}")]
    Broker(#[from] BrokerError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Signal engine errors.
#[derive(Error, Debug)]
pub enum SignalError {
    #[error("non-monotonic tick: {at} is not after previous tick {prev}")]
    NonMonotonicTick {
        prev: DateTime<Utc>,
        at: DateTime<Utc>,
    },
}

/// Trade generation / risk errors.
#[derive(Error, Debug)]
pub enum RiskError {
    #[error("position book reports an open position in {symbol}")]
    PositionOpen { symbol: String },

    #[error("entries are halted pending reconciliation")]
    EntriesHalted,

    #[error("invalid risk configuration: {0}")]
    InvalidConfig(String),
}

/// Broker endpoint errors.
#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("order rejected: {0}")]
    OrderRejected(String),

    #[error("quote unavailable for {0}")]
    QuoteUnavailable(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("rate limited: retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("market closed")]
    MarketClosed,

    #[error("API error: {0}")]
    Api(String),
}

/// Position/trade manager errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid transition from {state} on {event}")]
    InvalidTransition { state: &'static str, event: String },

    #[error("position state desync: {0}")]
    Desync(String),

    #[error("engine event channel closed")]
    ChannelClosed,
}

/// Tick data errors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("no tick data available")]
    NoDataAvailable,
}

/// Result type alias for trading operations.
pub type TradingResult<T> = Result<T, TradingError>;
