// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for schema management

use thiserror::Error;

use crate::storage::StorageDriverError;

/// Result type alias for schema management operations
pub type SchemaResult<T> = std::result::Result<T, SchemaError>;

/// Fieldless classification of a [`SchemaError`], convenient for matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DuplicateName,
    UnknownType,
    InvalidIndexDefinition,
    SchemaViolation,
    IndexState,
    ConcurrentModification,
    ClosedTransaction,
    Storage,
    Config,
}

/// Main error type for schema and index management
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A name is already bound to another schema element or graph index
    #[error("Name '{0}' is already in use")]
    DuplicateName(String),

    /// Lookup of an element that does not exist
    #[error("Unknown schema element: {0}")]
    UnknownType(String),

    /// Empty or duplicate keys, conflicting builder restrictions, unique mixed index
    #[error("Invalid index definition: {0}")]
    InvalidIndexDefinition(String),

    /// Operation not permitted on this kind of element
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    /// Illegal index lifecycle transition
    #[error("Index state error: {0}")]
    IndexState(String),

    /// Commit-time conflict with state committed after this transaction opened
    #[error("Concurrent modification: {0}")]
    ConcurrentModification(String),

    /// Any use of a management transaction after commit or rollback
    #[error("Management transaction {0} has already been closed")]
    ClosedTransaction(String),

    /// Persistence failures
    #[error("Storage error: {0}")]
    Storage(#[from] StorageDriverError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SchemaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SchemaError::DuplicateName(_) => ErrorKind::DuplicateName,
            SchemaError::UnknownType(_) => ErrorKind::UnknownType,
            SchemaError::InvalidIndexDefinition(_) => ErrorKind::InvalidIndexDefinition,
            SchemaError::SchemaViolation(_) => ErrorKind::SchemaViolation,
            SchemaError::IndexState(_) => ErrorKind::IndexState,
            SchemaError::ConcurrentModification(_) => ErrorKind::ConcurrentModification,
            SchemaError::ClosedTransaction(_) => ErrorKind::ClosedTransaction,
            SchemaError::Storage(_) => ErrorKind::Storage,
            SchemaError::Config(_) => ErrorKind::Config,
        }
    }

    pub(crate) fn invalid_index(msg: impl Into<String>) -> Self {
        SchemaError::InvalidIndexDefinition(msg.into())
    }

    pub(crate) fn violation(msg: impl Into<String>) -> Self {
        SchemaError::SchemaViolation(msg.into())
    }

    pub(crate) fn unknown(what: impl std::fmt::Display) -> Self {
        SchemaError::UnknownType(what.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(
            SchemaError::DuplicateName("name".to_string()).kind(),
            ErrorKind::DuplicateName
        );
        assert_eq!(
            SchemaError::invalid_index("no keys").kind(),
            ErrorKind::InvalidIndexDefinition
        );
        assert_eq!(
            SchemaError::violation("not a relation type").kind(),
            ErrorKind::SchemaViolation
        );
    }

    #[test]
    fn test_error_messages() {
        let err = SchemaError::DuplicateName("person".to_string());
        assert_eq!(err.to_string(), "Name 'person' is already in use");

        let err = SchemaError::unknown("property key 'age'");
        assert_eq!(err.to_string(), "Unknown schema element: property key 'age'");
    }
}
