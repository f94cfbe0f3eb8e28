//! Core data types for the trading engine.

mod intent;
mod order;
mod position;
mod signal;
mod tick;

pub use intent::{TradeAction, TradeIntent};
pub use order::{FillStatus, OrderUpdate, TradeExecution};
pub use position::{
    Position, PositionPhase, PositionSnapshot, PositionStatusView, CONTRACT_MULTIPLIER,
};
pub use signal::{Signal, SignalDirection};
pub use tick::{NormalizedTick, OptionQuote};
