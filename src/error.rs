//! Error types for the catalog data layer.
//!
//! All errors are strongly typed using thiserror so callers can match on the
//! specific failure and report it. Nothing in this crate panics on bad input
//! or a failing storage area; every failure comes back as a value.

use thiserror::Error;

use crate::storage::StorageError;

/// Validation errors raised while checking caller input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Current password is incorrect")]
    IncorrectPassword,

    #[error("New password must be at least {min_length} characters")]
    PasswordTooShort {
        min_length: usize,
    },

    #[error("New password and confirmation do not match")]
    PasswordMismatch,

    #[error("Configuration field '{field}' is invalid: {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },
}

/// Top-level error type for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The operation targeted an id that does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        kind: &'static str,
        id: String,
    },

    /// A delete was refused because other records still reference the target.
    #[error("{kind} {id} is still referenced by {references} {referenced_by} record(s)")]
    ValidationConflict {
        kind: &'static str,
        id: String,
        referenced_by: &'static str,
        references: usize,
    },

    /// The storage area rejected a write or could not be used.
    #[error("Persistence failure: {0}")]
    Persistence(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CatalogError {
    /// Creates a not-found error for the given entity kind.
    #[must_use]
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Returns true if this is a not-found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if a delete was blocked by existing references.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::ValidationConflict { .. })
    }

    /// Returns true if the storage area failed.
    #[must_use]
    pub const fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }

    /// Returns true if caller input was rejected.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if retrying the same call could succeed.
    ///
    /// Only quota failures qualify, and only after the caller frees space.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(StorageError::QuotaExceeded { .. }))
    }
}

/// Result type alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
