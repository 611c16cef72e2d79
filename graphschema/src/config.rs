// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Configuration for a schema registry

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{SchemaError, SchemaResult};
use crate::storage::StorageType;

/// Registry configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagementConfig {
    /// Where committed snapshots are kept
    pub storage: StorageType,

    /// Database directory, required for `StorageType::Sled`
    pub path: Option<PathBuf>,

    /// Names of the configured mixed-index backends; empty accepts any name
    pub mixed_backends: Vec<String>,

    /// Whether the storage backend supports per-cell time-to-live
    pub ttl_supported: bool,

    /// Worker threads of the backfill runtime
    pub backfill_workers: usize,

    /// Enforce the name grammar beyond non-emptiness
    pub validate_names: bool,
}

impl Default for ManagementConfig {
    fn default() -> Self {
        Self {
            storage: StorageType::Memory,
            path: None,
            mixed_backends: Vec::new(),
            ttl_supported: true,
            backfill_workers: 2,
            validate_names: true,
        }
    }
}

impl ManagementConfig {
    /// Process-local registry, nothing persisted
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Registry persisted in a sled database at `path`
    pub fn sled(path: impl Into<PathBuf>) -> Self {
        Self {
            storage: StorageType::Sled,
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> SchemaResult<Self> {
        let config: ManagementConfig = serde_json::from_str(json)
            .map_err(|e| SchemaError::Config(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_mixed_backend(mut self, name: impl Into<String>) -> Self {
        self.mixed_backends.push(name.into());
        self
    }

    pub fn with_ttl_supported(mut self, supported: bool) -> Self {
        self.ttl_supported = supported;
        self
    }

    pub fn validate(&self) -> SchemaResult<()> {
        if self.backfill_workers == 0 {
            return Err(SchemaError::Config(
                "backfill_workers must be at least 1".to_string(),
            ));
        }
        if self.storage == StorageType::Sled && self.path.is_none() {
            return Err(SchemaError::Config(
                "sled storage requires a database path".to_string(),
            ));
        }
        if self.mixed_backends.iter().any(|name| name.is_empty()) {
            return Err(SchemaError::Config(
                "mixed backend names cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether `backend` names a configured mixed-index backend
    pub fn accepts_backend(&self, backend: &str) -> bool {
        !backend.is_empty()
            && (self.mixed_backends.is_empty() || self.mixed_backends.iter().any(|b| b == backend))
    }
}
