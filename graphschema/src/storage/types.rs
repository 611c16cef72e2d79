// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Store selection and the error type raised by schema stores

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Where committed schema snapshots live
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// Process-local; the schema is gone when the registry is dropped
    #[default]
    Memory,
    /// One sled tree holding the latest snapshot
    Sled,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Memory => "memory",
            StorageType::Sled => "sled",
        }
    }
}

impl FromStr for StorageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageType::Memory),
            "sled" => Ok(StorageType::Sled),
            other => Err(format!("no schema store named '{}' (memory, sled)", other)),
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reading or swapping a persisted schema snapshot
#[derive(Error, Debug)]
pub enum StorageDriverError {
    #[error("schema store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("schema snapshot could not be encoded: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("persisted schema snapshot is corrupted: {0}")]
    Corrupted(String),

    #[error("schema store backend failed: {0}")]
    Backend(String),
}

#[cfg(feature = "sled-backend")]
impl From<sled::Error> for StorageDriverError {
    fn from(e: sled::Error) -> Self {
        match e {
            sled::Error::Io(io) => StorageDriverError::Io(io),
            corruption @ sled::Error::Corruption { .. } => {
                StorageDriverError::Corrupted(corruption.to_string())
            }
            other => StorageDriverError::Backend(other.to_string()),
        }
    }
}

pub type StorageResult<T> = Result<T, StorageDriverError>;
