//! Observability for the trading engine.

mod logging;

pub use logging::setup_logging;
