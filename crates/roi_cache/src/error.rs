//! Cache error types.

use thiserror::Error;

/// Cache-layer failure.
///
/// Never returned from a lookup: callers see a forced miss and the error
/// is logged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// The input could not be serialised into a canonical key.
    #[error("Failed to serialise cache key: {0}")]
    KeySerialisation(String),
}
