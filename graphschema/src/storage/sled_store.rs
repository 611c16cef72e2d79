// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Sled schema store
//!
//! The snapshot and its version live in one tree and are always written
//! together inside a sled transaction.

use sled::transaction::{ConflictableTransactionResult, TransactionError};
use std::path::Path;

use super::{
    decode_snapshot, encode_snapshot, PersistedSchema, SchemaStore, StorageDriverError,
    StorageResult,
};

const TREE_NAME: &str = "schema";
const VERSION_KEY: &[u8] = b"version";
const SNAPSHOT_KEY: &[u8] = b"snapshot";

/// Sled-backed schema store
pub struct SledSchemaStore {
    db: sled::Db,
    tree: sled::Tree,
}

impl SledSchemaStore {
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = sled::open(path.as_ref())?;
        let tree = db.open_tree(TREE_NAME)?;
        log::debug!("Opened sled schema store at {}", path.as_ref().display());
        Ok(Self { db, tree })
    }

    fn decode_version(raw: &[u8]) -> Option<u64> {
        let bytes: [u8; 8] = raw.try_into().ok()?;
        Some(u64::from_be_bytes(bytes))
    }
}

impl SchemaStore for SledSchemaStore {
    fn load(&self) -> StorageResult<Option<PersistedSchema>> {
        match self.tree.get(SNAPSHOT_KEY)? {
            Some(raw) => Ok(Some(decode_snapshot(&raw)?)),
            None => Ok(None),
        }
    }

    fn compare_and_swap(
        &self,
        expected_version: u64,
        schema: &PersistedSchema,
    ) -> StorageResult<bool> {
        let payload = encode_snapshot(schema)?;
        let next_version = schema.version.to_be_bytes();

        let result: Result<bool, TransactionError<()>> =
            self.tree
                .transaction(|tx| -> ConflictableTransactionResult<bool, ()> {
                    let stored = tx
                        .get(VERSION_KEY)?
                        .and_then(|raw| Self::decode_version(&raw))
                        .unwrap_or(0);
                    if stored != expected_version {
                        return Ok(false);
                    }
                    tx.insert(VERSION_KEY, &next_version[..])?;
                    tx.insert(SNAPSHOT_KEY, payload.as_slice())?;
                    Ok(true)
                });

        let swapped = result.map_err(|e| {
            StorageDriverError::Backend(format!("schema transaction failed: {:?}", e))
        })?;
        if swapped {
            self.db.flush()?;
        }
        Ok(swapped)
    }

    fn name(&self) -> &'static str {
        "sled"
    }
}
