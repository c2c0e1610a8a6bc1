//! Service Layer Error Types
//!
//! This module defines error types for service-layer operations. Every
//! operation returns its result as a value; no exceptions cross component
//! boundaries for expected conditions. The orchestrator forwards the first
//! failure encountered and performs no further steps.

use crate::db::StoreError;
use thiserror::Error;

/// Service operation errors
///
/// Ownership failures on reads are reported as `NotFound` (identical to a
/// missing id) to avoid leaking existence; `Unauthorized` is reserved for
/// mutations against a project the caller can see but does not own.
#[derive(Error, Debug)]
pub enum NodeServiceError {
    /// Name empty after trimming, or exceeds the configured maximum length
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Search query empty after trimming
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Referenced node does not exist, or is not owned by the caller
    #[error("Node not found: {id}")]
    NotFound { id: String },

    /// Supplied parent id does not resolve to an existing, owned,
    /// container-kind node in the same project
    #[error("Parent not found: {parent_id}")]
    ParentNotFound { parent_id: String },

    /// A node cannot be moved into itself
    #[error("Cannot move node {id} into itself")]
    SelfMove { id: String },

    /// A node cannot be moved into one of its own descendants
    #[error("Cannot move node {id} under its descendant {target_id}")]
    DescendantMove { id: String, target_id: String },

    /// Caller is not the owner of the resource being mutated
    #[error("Unauthorized access to {resource}")]
    Unauthorized { resource: String },

    /// Constraint or concurrent-write conflict reported by the store
    #[error("Conflict: {context}")]
    Conflict { context: String },

    /// Update not applicable to this node kind (e.g. content on a folder)
    #[error("Invalid update: {0}")]
    InvalidUpdate(String),

    /// The persistence port failed for a reason opaque to this core
    #[error("Storage error: {0}")]
    Storage(String),
}

impl NodeServiceError {
    /// Create an invalid name error
    pub fn invalid_name(msg: impl Into<String>) -> Self {
        Self::InvalidName(msg.into())
    }

    /// Create an invalid query error
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    /// Create a not found error
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create a parent not found error
    pub fn parent_not_found(parent_id: impl Into<String>) -> Self {
        Self::ParentNotFound {
            parent_id: parent_id.into(),
        }
    }

    /// Create a self move error
    pub fn self_move(id: impl Into<String>) -> Self {
        Self::SelfMove { id: id.into() }
    }

    /// Create a descendant move error
    pub fn descendant_move(id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self::DescendantMove {
            id: id.into(),
            target_id: target_id.into(),
        }
    }

    /// Create an unauthorized error
    pub fn unauthorized(resource: impl Into<String>) -> Self {
        Self::Unauthorized {
            resource: resource.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(context: impl Into<String>) -> Self {
        Self::Conflict {
            context: context.into(),
        }
    }

    /// Create an invalid update error
    pub fn invalid_update(msg: impl Into<String>) -> Self {
        Self::InvalidUpdate(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

/// `NotFound` and conflicts stay typed across the port boundary; everything
/// else the backend reports is opaque storage failure.
impl From<StoreError> for NodeServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { id } => Self::NotFound { id },
            StoreError::Conflict { context } => Self::Conflict { context },
            StoreError::VersionConflict { .. } => Self::Conflict {
                context: e.to_string(),
            },
            other => Self::Storage(other.to_string()),
        }
    }
}
