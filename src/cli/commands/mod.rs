//! CLI command implementations.

pub mod live;
pub mod paper;
pub mod validate;
