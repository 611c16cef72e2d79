// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Managed options: graph-wide settings stored with the schema and changed
//! through management transactions

use log::debug;

use super::ManagementTransaction;
use crate::error::SchemaResult;
use crate::names::validate_option_path;

impl ManagementTransaction {
    /// Current value of a managed option, including this transaction's own writes
    pub fn get_option(&self, path: &str) -> SchemaResult<Option<String>> {
        self.ensure_open()?;
        validate_option_path(path)?;
        self.read(|view| Ok(view.option(path)))
    }

    /// Set a managed option; other transactions see the value after commit.
    /// Concurrent writers of the same path: the last commit wins.
    pub fn set_option(&mut self, path: &str, value: impl Into<String>) -> SchemaResult<()> {
        self.ensure_open()?;
        validate_option_path(path)?;
        let value = value.into();
        debug!("Setting option '{}' to '{}'", path, value);
        self.overlay.set_option(path, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::registry::SchemaRegistry;

    #[test]
    fn test_option_visible_after_commit() {
        let registry = SchemaRegistry::in_memory().unwrap();
        let mut tx = registry.open_management();
        let other = registry.open_management();

        assert_eq!(tx.get_option("index.search.backend").unwrap(), None);
        tx.set_option("index.search.backend", "lucene").unwrap();
        assert_eq!(
            tx.get_option("index.search.backend").unwrap().as_deref(),
            Some("lucene")
        );
        assert_eq!(other.get_option("index.search.backend").unwrap(), None);

        tx.commit().unwrap();
        assert_eq!(
            other.get_option("index.search.backend").unwrap().as_deref(),
            Some("lucene")
        );
        assert_eq!(registry.snapshot().option("index.search.backend"), Some("lucene"));
    }

    #[test]
    fn test_last_commit_wins() {
        let registry = SchemaRegistry::in_memory().unwrap();
        let mut first = registry.open_management();
        let mut second = registry.open_management();
        first.set_option("cache.size", "100").unwrap();
        second.set_option("cache.size", "200").unwrap();

        first.commit().unwrap();
        second.commit().unwrap();
        assert_eq!(registry.snapshot().option("cache.size"), Some("200"));
    }

    #[test]
    fn test_option_path_and_state_checks() {
        let registry = SchemaRegistry::in_memory().unwrap();
        let mut tx = registry.open_management();
        let err = tx.set_option("index..backend", "x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);

        tx.rollback();
        assert_eq!(
            tx.get_option("cache.size").unwrap_err().kind(),
            ErrorKind::ClosedTransaction
        );
        assert_eq!(
            tx.set_option("cache.size", "1").unwrap_err().kind(),
            ErrorKind::ClosedTransaction
        );
    }
}
