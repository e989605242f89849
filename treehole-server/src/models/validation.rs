//! Validation error types

use std::fmt;

/// Validation error for request input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty (after trimming) when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length in characters
    TooLong { field: &'static str, max: usize },

    /// Value doesn't parse into the required shape
    InvalidFormat { field: &'static str, reason: &'static str },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} cannot exceed {} characters", field, max)
            }
            Self::InvalidFormat { field, reason } => {
                write!(f, "invalid {}: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}
