//! Engine error kinds.
//!
//! Both are raised before any state is touched, so a rejected call
//! leaves the engine exactly as it was.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Construction rejected: `sets_to_win < 1` or an initial server
    /// outside the two sides.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// A point addressed to something other than one of the two sides.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
