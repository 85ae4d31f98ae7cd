//! Error types for genericbuilder
//!
//! This module defines all error types raised by builder lifecycle operations.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Errors are raised synchronously at the point of violation. Nothing is
//! retried internally; a failed `preprocess()` or `build()` leaves the
//! builder's status flags as they were so the caller can fix the parameters
//! and try again.

use thiserror::Error;

/// Result type alias for builder operations
pub type BuilderResult<T> = std::result::Result<T, BuilderError>;

/// Invalid parameter combination reported by a blueprint's validation step
///
/// Blueprints construct this directly from `validate()`; it is converted into
/// [`BuilderError::Validation`] when it crosses into the lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {field}: {reason}")]
pub struct ValidationError {
    /// Name of the offending parameter (or parameter group)
    pub field: String,
    /// Human readable explanation
    pub reason: String,
}

impl ValidationError {
    /// Create a validation error for a field
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Error types for builder objects
#[derive(Debug, Error)]
pub enum BuilderError {
    /// Mutation, preprocessing or building attempted on an immutable builder
    #[error("Immutable {kind} builder cannot {operation}")]
    Immutable {
        /// Builder kind
        kind: &'static str,
        /// What was attempted
        operation: String,
    },

    /// Non-exempt mutation attempted on a frozen builder (or through a view)
    #[error("Frozen {kind} builder cannot modify '{target}'")]
    Frozen {
        /// Builder kind
        kind: &'static str,
        /// Attribute or operation that was refused
        target: String,
    },

    /// Built output requested before `build()` ran for the current parameters
    #[error("{kind} builder has not been built for the current parameters; run build() before {operation}")]
    NotBuilt {
        /// Builder kind
        kind: &'static str,
        /// What needed the built state
        operation: String,
    },

    /// Blueprint reported an invalid parameter state during preprocessing
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A view was read after the builder it aliases was dropped
    #[error("View of {kind} builder outlived its target")]
    DetachedView {
        /// Builder kind
        kind: &'static str,
    },

    /// Builder storage is already borrowed by an enclosing call
    #[error("Reentrant access to {kind} builder during '{operation}'")]
    Reentrant {
        /// Builder kind
        kind: &'static str,
        /// The call that found the storage busy
        operation: String,
    },

    /// Attempted to assign an attribute that has no setter
    #[error("Attribute '{attribute}' of {kind} builder is read-only")]
    ReadOnly {
        /// Builder kind
        kind: &'static str,
        /// Attribute name
        attribute: String,
    },

    /// A bulk property value could not be converted to or from its attribute type
    #[error("Property '{name}' rejected: {reason}")]
    Property {
        /// Property name
        name: String,
        /// Conversion failure
        reason: String,
    },

    /// A configuration source could not be parsed into a property map
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BuilderError {
    /// Create an immutable-state error
    pub fn immutable(kind: &'static str, operation: impl Into<String>) -> Self {
        BuilderError::Immutable {
            kind,
            operation: operation.into(),
        }
    }

    /// Create a frozen-state error
    pub fn frozen(kind: &'static str, target: impl Into<String>) -> Self {
        BuilderError::Frozen {
            kind,
            target: target.into(),
        }
    }

    /// Create a not-built error
    pub fn not_built(kind: &'static str, operation: impl Into<String>) -> Self {
        BuilderError::NotBuilt {
            kind,
            operation: operation.into(),
        }
    }

    /// Create a property conversion error
    pub fn property(name: impl Into<String>, reason: impl ToString) -> Self {
        BuilderError::Property {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Check if this error was caused by the builder's lifecycle state
    /// (immutable, frozen, or a view that can no longer be resolved)
    pub fn is_state_error(&self) -> bool {
        matches!(
            self,
            BuilderError::Immutable { .. }
                | BuilderError::Frozen { .. }
                | BuilderError::DetachedView { .. }
        )
    }

    /// Check if this error indicates a missing `build()`
    pub fn is_not_built(&self) -> bool {
        matches!(self, BuilderError::NotBuilt { .. })
    }

    /// Check if this error is a validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(self, BuilderError::Validation(_))
    }
}
