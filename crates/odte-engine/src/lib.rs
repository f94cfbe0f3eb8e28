//! Decision-and-lifecycle engine for the single-position 0DTE strategy.
//!
//! The position/trade manager is a single owning task: ticks, quote
//! updates, broker fills and the session clock all funnel into it over one
//! event channel, so position-state reads and writes are never interleaved
//! inconsistently. The option quote monitor is a cancellable background
//! task armed and disarmed only by the manager.

mod events;
mod manager;
mod monitor;
mod runtime;

pub use events::{AuditEvent, EngineEvent};
pub use manager::PositionManager;
pub use monitor::{MonitorConfig, QuoteMonitor};
pub use runtime::{EngineConfig, TradingEngine};
