//! Failure taxonomy for the terrain pipeline.
//!
//! Every error here is locally recoverable: callers clear the affected mesh
//! or fall back to regeneration and log the condition. Nothing escalates to
//! a panic in non-test code.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TerrainError {
  /// A density buffer's length does not match its declared grid size.
  /// Raised both at mesh time and when validating a loaded record.
  #[error("density buffer holds {actual} samples but size {size} requires {expected}")]
  InconsistentDensity {
    size: usize,
    actual: usize,
    expected: usize,
  },

  /// Backing storage failure in a file-based chunk store.
  #[error("chunk store io failure: {0}")]
  Io(#[from] std::io::Error),

  /// A chunk record could not be encoded or decoded.
  #[error("chunk record encoding failure: {0}")]
  Encoding(#[from] serde_json::Error),
}
