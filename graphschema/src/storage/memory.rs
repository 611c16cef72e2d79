// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory schema store

use parking_lot::Mutex;

use super::{PersistedSchema, SchemaStore, StorageResult};

/// Keeps the latest snapshot in process memory
#[derive(Debug, Default)]
pub struct MemorySchemaStore {
    current: Mutex<Option<PersistedSchema>>,
}

impl MemorySchemaStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SchemaStore for MemorySchemaStore {
    fn load(&self) -> StorageResult<Option<PersistedSchema>> {
        Ok(self.current.lock().clone())
    }

    fn compare_and_swap(
        &self,
        expected_version: u64,
        schema: &PersistedSchema,
    ) -> StorageResult<bool> {
        let mut current = self.current.lock();
        let stored_version = current.as_ref().map(|s| s.version).unwrap_or(0);
        if stored_version != expected_version {
            return Ok(false);
        }
        *current = Some(schema.clone());
        Ok(true)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
