//! Persistence Error Types
//!
//! This module defines error types for the persistence port, covering
//! connection, initialization, and per-operation failures. The service layer
//! maps these to its own error kinds; `NotFound`, `Conflict`, and
//! `VersionConflict` stay typed across the boundary, everything else is
//! opaque storage failure.

use std::path::PathBuf;
use thiserror::Error;

/// Persistence operation errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Referenced row does not exist (or is not visible to the caller)
    #[error("Not found: {id}")]
    NotFound { id: String },

    /// Constraint violation (duplicate id, advisory sibling-name uniqueness)
    #[error("Conflict: {context}")]
    Conflict { context: String },

    /// Optimistic concurrency check failed
    #[error("Version conflict for {id}: expected version {expected}, found {actual}")]
    VersionConflict {
        id: String,
        expected: i64,
        actual: i64,
    },

    /// Failed to establish database connection
    #[error("Failed to connect to database at {path}: {source}")]
    ConnectionFailed {
        path: PathBuf,
        source: libsql::Error,
    },

    /// Failed to initialize database schema
    #[error("Failed to initialize database schema: {0}")]
    InitializationFailed(String),

    /// Failed to create parent directory for the database file
    #[error("Failed to create parent directory for database: {0}")]
    DirectoryCreationFailed(#[from] std::io::Error),

    /// libsql operation error
    #[error("Database operation failed: {0}")]
    LibsqlError(#[from] libsql::Error),

    /// SQL execution error with context
    #[error("SQL execution failed: {context}")]
    SqlExecutionError { context: String },
}

impl StoreError {
    /// Create a not found error
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create a conflict error
    pub fn conflict(context: impl Into<String>) -> Self {
        Self::Conflict {
            context: context.into(),
        }
    }

    /// Create a version conflict error
    pub fn version_conflict(id: impl Into<String>, expected: i64, actual: i64) -> Self {
        Self::VersionConflict {
            id: id.into(),
            expected,
            actual,
        }
    }

    /// Create a connection failed error
    pub fn connection_failed(path: PathBuf, source: libsql::Error) -> Self {
        Self::ConnectionFailed { path, source }
    }

    /// Create an initialization failed error
    pub fn initialization_failed(msg: impl Into<String>) -> Self {
        Self::InitializationFailed(msg.into())
    }

    /// Create a SQL execution error with context
    pub fn sql_execution(context: impl Into<String>) -> Self {
        Self::SqlExecutionError {
            context: context.into(),
        }
    }
}
