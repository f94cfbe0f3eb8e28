//! Signal detection for the 0DTE trading engine.
//!
//! Watches the session VWAP against the 9-period moving average on
//! normalized ticks and emits a directional trade signal when the two
//! invert their relative order, subject to a cooldown.

mod engine;

pub use engine::{SignalEngine, SignalEngineConfig};
