//! Error types for the issuable engine.
//!
//! Callers see three kinds of failure: validation errors (rejected before
//! anything is persisted), lookups that do not resolve, and infrastructure
//! errors coming up from the store unchanged. Label creation races are a
//! store-level condition that the label path resolves internally.

use crate::domain::ProjectId;
use thiserror::Error;

/// Errors surfaced by [`crate::commands::CommandExecutor`].
#[derive(Debug, Error)]
pub enum IssuableError {
    /// Input rejected before persistence
    #[error("Invalid {field}: {reason}")]
    Validation {
        /// Field that failed validation (e.g. "title", "author")
        field: &'static str,
        /// Human-readable reason
        reason: String,
    },

    /// A referenced entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind (e.g. "issuable", "milestone")
        entity: &'static str,
        /// Identifier that failed to resolve
        id: u64,
    },

    /// Store failure propagated unchanged
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl IssuableError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        IssuableError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: u64) -> Self {
        IssuableError::NotFound { entity, id }
    }

    /// The violated field for validation errors.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            IssuableError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Result alias used by the command layer.
pub type Result<T> = std::result::Result<T, IssuableError>;

/// Conditions reported by store backends through `anyhow::Error`.
///
/// The command layer downcasts to this type to tell a lost unique-constraint
/// race apart from a real infrastructure failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Label '{title}' already exists in project {project_id}")]
    DuplicateLabel { project_id: ProjectId, title: String },
}
