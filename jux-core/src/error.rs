//! Error Types
//!
//! Two error families exist in the engine:
//!
//! - [`BindingError`] is returned by compute functions. The binding core
//!   never propagates it to readers; it logs it and caches the fallback
//!   value of the binding's domain instead.
//! - [`CollectionError`] is returned by collection mutators when an index
//!   is out of range or the collection does not support mutation.

use thiserror::Error;

/// A failure raised while computing a binding's value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindingError {
    /// Integer or long division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// A format pattern did not match its arguments.
    #[error("invalid format pattern {pattern:?}: {reason}")]
    Format { pattern: String, reason: String },

    /// Any other failure reported by a user compute function.
    #[error("{0}")]
    Custom(String),
}

impl BindingError {
    /// Build a [`BindingError::Custom`] from anything displayable.
    pub fn custom(message: impl std::fmt::Display) -> Self {
        Self::Custom(message.to_string())
    }
}

/// Result type of every compute function.
pub type ComputeResult<T> = Result<T, BindingError>;

/// A failure raised by an observable collection operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("invalid range {from}..{to} for length {len}")]
    InvalidRange { from: usize, to: usize, len: usize },

    /// The collection is read-only (unmodifiable wrapper, empty or
    /// singleton instance).
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}

pub(crate) fn check_index(index: usize, len: usize) -> Result<(), CollectionError> {
    if index < len {
        Ok(())
    } else {
        Err(CollectionError::IndexOutOfBounds { index, len })
    }
}

pub(crate) fn check_range(from: usize, to: usize, len: usize) -> Result<(), CollectionError> {
    if from <= to && to <= len {
        Ok(())
    } else {
        Err(CollectionError::InvalidRange { from, to, len })
    }
}
