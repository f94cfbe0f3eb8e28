//! Tick data loading.
//!
//! The decision core never reads files; this crate exists so the paper
//! command can drive it from a recorded tick file.

mod tick_file;

pub use tick_file::TickFileSource;

use odte_core::error::DataError;
use odte_core::types::NormalizedTick;

/// Load normalized ticks from a CSV file, ordered by timestamp.
pub fn load_ticks(path: &str) -> Result<Vec<NormalizedTick>, DataError> {
    let source = TickFileSource::new(path)?;
    source.load_all()
}
