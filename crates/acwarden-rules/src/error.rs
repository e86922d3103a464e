//! Error types for policy manipulation.

use crate::policy::{PolicyKey, ValueKind};
use thiserror::Error;

/// Errors raised when writing policy values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// The key is not part of the policy schema.
    #[error("Unknown config key: {0}")]
    UnknownKey(String),

    /// The value cannot be coerced to the key's type.
    #[error("Invalid value for {key}: expected {expected}")]
    InvalidValue {
        /// Key being written.
        key: PolicyKey,
        /// Type the schema requires for that key.
        expected: ValueKind,
    },
}
