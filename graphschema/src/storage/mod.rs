// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Durable storage for committed schema snapshots
//!
//! This module provides:
//! - The `SchemaStore` trait: latest-snapshot read plus atomic compare-and-swap
//! - An in-memory store for tests and embedded hosts
//! - A sled-backed store with checksummed snapshots
//!
//! Only the registry's commit step writes through a store.

mod memory;
#[cfg(feature = "sled-backend")]
mod sled_store;
pub mod types;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::ManagementConfig;
use crate::error::{SchemaError, SchemaResult};
use crate::types::{ConsistencyModifier, GraphIndex, RelationTypeIndex, SchemaElement, SchemaId};

pub use memory::MemorySchemaStore;
#[cfg(feature = "sled-backend")]
pub use sled_store::SledSchemaStore;
pub use types::{StorageDriverError, StorageResult, StorageType};

/// Serialized form of a committed schema snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedSchema {
    pub version: u64,
    pub next_id: u64,
    pub types: Vec<SchemaElement>,
    pub graph_indexes: Vec<GraphIndex>,
    pub relation_indexes: Vec<RelationTypeIndex>,
    pub consistency: Vec<(SchemaId, ConsistencyModifier)>,
    pub ttl: Vec<(SchemaId, u64)>,
    pub options: Vec<(String, String)>,
    pub committed_at: Option<DateTime<Utc>>,
}

/// Backing store of the schema registry
pub trait SchemaStore: Send + Sync {
    /// Latest committed snapshot, `None` for a fresh store
    fn load(&self) -> StorageResult<Option<PersistedSchema>>;

    /// Atomically replaces the stored snapshot if its version still equals
    /// `expected_version` (0 for a fresh store). Returns false on mismatch.
    fn compare_and_swap(&self, expected_version: u64, schema: &PersistedSchema)
        -> StorageResult<bool>;

    /// Short driver name for logging
    fn name(&self) -> &'static str;
}

/// Opens the store selected by the configuration
pub fn open_store(config: &ManagementConfig) -> SchemaResult<Arc<dyn SchemaStore>> {
    match config.storage {
        StorageType::Memory => Ok(Arc::new(MemorySchemaStore::new())),
        #[cfg(feature = "sled-backend")]
        StorageType::Sled => {
            let path = config.path.as_ref().ok_or_else(|| {
                SchemaError::Config("sled storage requires a database path".to_string())
            })?;
            Ok(Arc::new(SledSchemaStore::open(path)?))
        }
        #[cfg(not(feature = "sled-backend"))]
        StorageType::Sled => Err(SchemaError::Config(
            "sled storage is not compiled in; enable the 'sled-backend' feature".to_string(),
        )),
    }
}

/// Encodes a snapshot as a CRC32 checksum followed by its bincode payload
pub(crate) fn encode_snapshot(schema: &PersistedSchema) -> StorageResult<Vec<u8>> {
    let payload = bincode::serialize(schema)?;
    let checksum = crc32fast::hash(&payload);
    let mut bytes = Vec::with_capacity(payload.len() + 4);
    bytes.extend_from_slice(&checksum.to_le_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

pub(crate) fn decode_snapshot(bytes: &[u8]) -> StorageResult<PersistedSchema> {
    if bytes.len() < 4 {
        return Err(StorageDriverError::Corrupted(format!(
            "snapshot is {} bytes, shorter than its checksum",
            bytes.len()
        )));
    }
    let (header, payload) = bytes.split_at(4);
    let mut checksum = [0u8; 4];
    checksum.copy_from_slice(header);
    let expected = u32::from_le_bytes(checksum);
    let actual = crc32fast::hash(payload);
    if expected != actual {
        return Err(StorageDriverError::Corrupted(format!(
            "checksum mismatch: stored {:08x}, computed {:08x}",
            expected, actual
        )));
    }
    Ok(bincode::deserialize(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_codec_detects_corruption() {
        let schema = PersistedSchema {
            version: 3,
            next_id: 10,
            ttl: vec![(SchemaId::new(4), 60)],
            ..PersistedSchema::default()
        };
        let mut bytes = encode_snapshot(&schema).unwrap();
        assert_eq!(decode_snapshot(&bytes).unwrap(), schema);

        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        assert!(matches!(
            decode_snapshot(&bytes),
            Err(StorageDriverError::Corrupted(_))
        ));
        assert!(decode_snapshot(&[1, 2]).is_err());
    }

    #[test]
    fn test_open_memory_store() {
        let store = open_store(&ManagementConfig::in_memory()).unwrap();
        assert_eq!(store.name(), "memory");
        assert!(store.load().unwrap().is_none());
    }
}
