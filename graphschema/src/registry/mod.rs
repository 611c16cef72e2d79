// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Schema registry: the committed, versioned schema shared by all transactions
//!
//! This module provides:
//! - `SchemaRegistry`, the owner of the committed snapshot and its store
//! - `SchemaSnapshot`, an immutable version readers hold without locking
//! - Transaction overlays and the merge that publishes them
//!
//! Readers clone an `Arc` of the current snapshot. Commits are serialized
//! by a single lock: each one replays its overlay on the latest snapshot,
//! writes it through the store with a compare-and-swap, then swaps the
//! pointer.

pub(crate) mod overlay;
pub mod snapshot;
pub(crate) mod view;

use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::ManagementConfig;
use crate::error::{SchemaError, SchemaResult};
use crate::jobs::{
    BackfillCoordinator, IndexDescriptor, IndexMaintainer, JobRecord, NoopIndexMaintainer,
};
use crate::management::ManagementTransaction;
use crate::storage::{open_store, SchemaStore};
use crate::types::{IndexStatus, SchemaElement, SchemaId, SchemaKind};

use overlay::Overlay;
use snapshot::PendingEffect;
pub use snapshot::SchemaSnapshot;

/// Result of a successful commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitSummary {
    /// Schema version published by the commit
    pub version: u64,
    /// Number of recorded changes that were merged
    pub changes: usize,
    /// Number of background jobs scheduled
    pub jobs: usize,
}

/// Lazily materialized schema types of one committed snapshot
pub struct SchemaTypes {
    snapshot: Arc<SchemaSnapshot>,
    ids: std::vec::IntoIter<SchemaId>,
}

impl Iterator for SchemaTypes {
    type Item = SchemaElement;

    fn next(&mut self) -> Option<SchemaElement> {
        loop {
            let id = self.ids.next()?;
            if let Some(element) = self.snapshot.type_by_id(id) {
                return Some(element.clone());
            }
        }
    }
}

pub struct SchemaRegistry {
    config: ManagementConfig,
    current: RwLock<Arc<SchemaSnapshot>>,
    commit_lock: Mutex<()>,
    ids: AtomicU64,
    store: Arc<dyn SchemaStore>,
    backfill: BackfillCoordinator,
}

impl SchemaRegistry {
    /// Open a registry on the store selected by `config`
    pub fn open(config: ManagementConfig) -> SchemaResult<Arc<Self>> {
        config.validate()?;
        let store = open_store(&config)?;
        Self::open_with(config, store, Arc::new(NoopIndexMaintainer))
    }

    /// Open an in-memory registry with default settings
    pub fn in_memory() -> SchemaResult<Arc<Self>> {
        Self::open(ManagementConfig::in_memory())
    }

    /// Open a registry on an explicit store and index maintainer
    pub fn open_with(
        config: ManagementConfig,
        store: Arc<dyn SchemaStore>,
        maintainer: Arc<dyn IndexMaintainer>,
    ) -> SchemaResult<Arc<Self>> {
        config.validate()?;
        let snapshot = match store.load()? {
            Some(persisted) => SchemaSnapshot::from_persisted(persisted),
            None => SchemaSnapshot::default(),
        };
        let backfill = BackfillCoordinator::new(config.backfill_workers, maintainer)?;

        info!(
            "Opened schema registry on {} store (version {}, {} types)",
            store.name(),
            snapshot.version(),
            snapshot.len()
        );

        let registry = Arc::new(Self {
            ids: AtomicU64::new(snapshot.next_id().max(1)),
            current: RwLock::new(Arc::new(snapshot)),
            commit_lock: Mutex::new(()),
            config,
            store,
            backfill,
        });
        registry.redrive_registered_indexes();
        Ok(registry)
    }

    /// Indexes left REGISTERED by a previous process never finished their backfill
    fn redrive_registered_indexes(&self) {
        let snapshot = self.snapshot();
        for index in snapshot.graph_indexes() {
            if index.status() == IndexStatus::Registered {
                debug!("Re-driving backfill of REGISTERED index '{}'", index.name());
                self.backfill
                    .schedule_backfill(IndexDescriptor::Graph(index.clone()), index.generation());
            }
        }
    }

    /// Begin a management transaction reading the current snapshot
    pub fn open_management(self: &Arc<Self>) -> ManagementTransaction {
        ManagementTransaction::open(Arc::clone(self))
    }

    pub fn config(&self) -> &ManagementConfig {
        &self.config
    }

    /// The latest committed snapshot
    pub fn snapshot(&self) -> Arc<SchemaSnapshot> {
        Arc::clone(&self.current.read())
    }

    pub fn version(&self) -> u64 {
        self.current.read().version()
    }

    /// Committed type bound to `name`
    pub fn resolve(&self, name: &str) -> Option<SchemaElement> {
        self.snapshot().resolve(name).cloned()
    }

    /// Committed types of one kind in id order
    pub fn enumerate(&self, kind: SchemaKind) -> SchemaTypes {
        let snapshot = self.snapshot();
        let mut ids: Vec<SchemaId> = snapshot.enumerate(kind).map(|e| e.id()).collect();
        ids.sort();
        SchemaTypes {
            snapshot,
            ids: ids.into_iter(),
        }
    }

    /// Latest backfill job of a committed graph index
    pub fn backfill_status(&self, index_name: &str) -> Option<JobRecord> {
        let id = self.snapshot().graph_index_by_name(index_name)?.id();
        self.backfill.tracker().get(id)
    }

    /// Wait for the backfill of a committed graph index to finish
    pub fn await_backfill(&self, index_name: &str, timeout: Duration) -> Option<JobRecord> {
        let id = self.snapshot().graph_index_by_name(index_name)?.id();
        self.backfill.tracker().wait_for(id, timeout)
    }

    pub(crate) fn allocate_id(&self) -> SchemaId {
        SchemaId::new(self.ids.fetch_add(1, Ordering::SeqCst))
    }

    pub(crate) fn backfill_completed(&self, index: SchemaId, generation: u64) -> bool {
        self.backfill.tracker().is_completed(index, generation)
    }

    /// Publish an overlay as the next schema version
    pub(crate) fn merge(&self, overlay: &Overlay) -> SchemaResult<CommitSummary> {
        let _guard = self.commit_lock.lock();
        let base = self.snapshot();

        let mut next = SchemaSnapshot::clone(&base);
        let mut effects = Vec::new();
        for change in overlay.changes() {
            match next.merge_change(change) {
                Ok(Some(effect)) => effects.push(effect),
                Ok(None) => {}
                Err(conflict) => {
                    warn!("Rejecting commit on schema version {}: {}", base.version(), conflict);
                    return Err(SchemaError::ConcurrentModification(conflict));
                }
            }
        }
        next.seal(base.version() + 1, self.ids.load(Ordering::SeqCst));

        if !self
            .store
            .compare_and_swap(base.version(), &next.to_persisted())?
        {
            return Err(SchemaError::ConcurrentModification(format!(
                "{} store no longer holds schema version {}",
                self.store.name(),
                base.version()
            )));
        }

        let next = Arc::new(next);
        *self.current.write() = Arc::clone(&next);
        let jobs = self.dispatch(&next, effects);

        Ok(CommitSummary {
            version: next.version(),
            changes: overlay.changes().len(),
            jobs,
        })
    }

    fn dispatch(&self, published: &SchemaSnapshot, effects: Vec<PendingEffect>) -> usize {
        let mut scheduled = HashSet::new();
        let mut jobs = 0;
        for effect in effects {
            match effect {
                PendingEffect::Backfill(id) => {
                    if self.schedule_graph_backfill(published, id, true, &mut scheduled) {
                        jobs += 1;
                    }
                }
                PendingEffect::Redrive(id) => {
                    if self.schedule_graph_backfill(published, id, false, &mut scheduled) {
                        jobs += 1;
                    }
                }
                PendingEffect::Rebuild(id) => {
                    let Some(index) = published.relation_index(id) else {
                        continue;
                    };
                    if !scheduled.insert(id) {
                        continue;
                    }
                    let generation = self
                        .backfill
                        .tracker()
                        .get(id)
                        .map_or(1, |record| record.generation + 1);
                    self.backfill
                        .schedule_backfill(IndexDescriptor::Relation(index.clone()), generation);
                    jobs += 1;
                }
                PendingEffect::Release(descriptor) => {
                    scheduled.insert(descriptor.id());
                    self.backfill.schedule_release(descriptor);
                    jobs += 1;
                }
            }
        }
        jobs
    }

    /// Backfills a graph index that is REGISTERED in the published snapshot.
    /// A re-driven action only schedules when no job covers the current generation.
    fn schedule_graph_backfill(
        &self,
        published: &SchemaSnapshot,
        id: SchemaId,
        fresh: bool,
        scheduled: &mut HashSet<SchemaId>,
    ) -> bool {
        let Some(index) = published.graph_index(id) else {
            return false;
        };
        if index.status() != IndexStatus::Registered || scheduled.contains(&id) {
            return false;
        }
        if !fresh && !self.backfill.tracker().needs_redrive(id, index.generation()) {
            return false;
        }
        scheduled.insert(id);
        self.backfill
            .schedule_backfill(IndexDescriptor::Graph(index.clone()), index.generation());
        true
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("store", &self.store.name())
            .field("version", &self.version())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cardinality, DataType, TypeDefinition};

    fn property_key() -> TypeDefinition {
        TypeDefinition::PropertyKey {
            data_type: DataType::String,
            cardinality: Cardinality::Single,
        }
    }

    #[test]
    fn test_empty_commit_keeps_version() {
        let registry = SchemaRegistry::in_memory().unwrap();
        let mut tx = registry.open_management();
        let summary = tx.commit().unwrap();
        assert_eq!(summary.version, 0);
        assert_eq!(registry.version(), 0);
    }

    #[test]
    fn test_commit_publishes_new_version() {
        let registry = SchemaRegistry::in_memory().unwrap();
        let mut tx = registry.open_management();
        tx.define("name", property_key()).unwrap();
        let summary = tx.commit().unwrap();

        assert_eq!(summary.version, 1);
        assert_eq!(summary.changes, 1);
        assert_eq!(registry.version(), 1);
        assert!(registry.resolve("name").is_some());
        assert!(registry.snapshot().committed_at().is_some());
    }

    #[test]
    fn test_enumerate_is_ordered_by_id() {
        let registry = SchemaRegistry::in_memory().unwrap();
        let mut tx = registry.open_management();
        for name in ["c", "a", "b"] {
            tx.define(name, property_key()).unwrap();
        }
        tx.commit().unwrap();

        let names: Vec<String> = registry
            .enumerate(SchemaKind::PropertyKey)
            .map(|e| e.name().to_string())
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        assert_eq!(registry.enumerate(SchemaKind::EdgeLabel).count(), 0);
    }

    #[test]
    fn test_held_snapshot_is_stable() {
        let registry = SchemaRegistry::in_memory().unwrap();
        let before = registry.snapshot();

        let mut tx = registry.open_management();
        tx.define("name", property_key()).unwrap();
        tx.commit().unwrap();

        assert!(before.resolve("name").is_none());
        assert!(registry.snapshot().resolve("name").is_some());
    }
}
