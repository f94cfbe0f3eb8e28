//! Risk management for the 0DTE trading engine.
//!
//! Provides the session risk configuration, entry-intent generation from
//! signals, and priority-ordered exit trigger evaluation.

mod config;
mod exit;
mod generator;

pub use config::RiskConfig;
pub use exit::{evaluate_exit, ExitContext, ExitReason};
pub use generator::TradeGenerator;
