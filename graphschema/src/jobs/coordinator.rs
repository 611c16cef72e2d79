// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Background runtime for index backfills and releases

use log::{debug, info, warn};
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};

use super::tracker::{JobState, JobTracker};
use super::{IndexDescriptor, IndexMaintainer};
use crate::error::{SchemaError, SchemaResult};

/// Runs maintainer calls on a dedicated multi-threaded runtime
pub struct BackfillCoordinator {
    runtime: Option<Runtime>,
    maintainer: Arc<dyn IndexMaintainer>,
    tracker: Arc<JobTracker>,
}

impl BackfillCoordinator {
    /// Start the backfill runtime with `workers` threads
    pub fn new(workers: usize, maintainer: Arc<dyn IndexMaintainer>) -> SchemaResult<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(workers)
            .thread_name("graphschema-backfill")
            .enable_all()
            .build()
            .map_err(|e| SchemaError::Config(format!("Failed to start backfill runtime: {}", e)))?;

        debug!("Started backfill runtime with {} workers", workers);
        Ok(Self {
            runtime: Some(runtime),
            maintainer,
            tracker: Arc::new(JobTracker::new()),
        })
    }

    pub fn tracker(&self) -> &Arc<JobTracker> {
        &self.tracker
    }

    /// Queue a backfill of `index` for the given generation
    pub fn schedule_backfill(&self, index: IndexDescriptor, generation: u64) {
        let id = index.id();
        self.tracker.record(id, generation, JobState::Pending);

        let Some(runtime) = self.runtime.as_ref() else {
            return;
        };
        info!(
            "Scheduling backfill of index '{}' (generation {})",
            index.name(),
            generation
        );

        let maintainer = Arc::clone(&self.maintainer);
        let tracker = Arc::clone(&self.tracker);
        runtime.spawn(async move {
            tracker.record(id, generation, JobState::Running);
            match maintainer.backfill(&index).await {
                Ok(elements) => {
                    info!(
                        "Backfill of index '{}' completed ({} elements)",
                        index.name(),
                        elements
                    );
                    tracker.record(id, generation, JobState::Completed { elements });
                }
                Err(reason) => {
                    warn!("Backfill of index '{}' failed: {}", index.name(), reason);
                    tracker.record(id, generation, JobState::Failed { reason });
                }
            }
        });
    }

    /// Queue the release of a removed index's storage
    pub fn schedule_release(&self, index: IndexDescriptor) {
        self.tracker.forget(index.id());

        let Some(runtime) = self.runtime.as_ref() else {
            return;
        };
        let maintainer = Arc::clone(&self.maintainer);
        runtime.spawn(async move {
            match maintainer.release(&index).await {
                Ok(()) => info!("Released storage of index '{}'", index.name()),
                Err(reason) => warn!(
                    "Failed to release storage of index '{}': {}",
                    index.name(),
                    reason
                ),
            }
        });
    }
}

impl Drop for BackfillCoordinator {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::NoopIndexMaintainer;
    use crate::types::{Direction, Order, RelationTypeIndex, SchemaId, SchemaKind};
    use async_trait::async_trait;
    use std::time::Duration;

    struct FailingMaintainer;

    #[async_trait]
    impl IndexMaintainer for FailingMaintainer {
        async fn backfill(&self, _index: &IndexDescriptor) -> Result<u64, String> {
            Err("backend unavailable".to_string())
        }

        async fn release(&self, _index: &IndexDescriptor) -> Result<(), String> {
            Ok(())
        }
    }

    fn relation_index(id: u64) -> IndexDescriptor {
        IndexDescriptor::Relation(RelationTypeIndex {
            id: SchemaId::new(id),
            name: "by_time".to_string(),
            owner: SchemaId::new(1),
            owner_kind: SchemaKind::EdgeLabel,
            direction: Direction::Both,
            sort_order: Order::Desc,
            sort_keys: vec![SchemaId::new(2)],
        })
    }

    #[test]
    fn test_backfill_completes() {
        let coordinator = BackfillCoordinator::new(1, Arc::new(NoopIndexMaintainer)).unwrap();
        coordinator.schedule_backfill(relation_index(5), 1);

        let record = coordinator
            .tracker()
            .wait_for(SchemaId::new(5), Duration::from_secs(5))
            .unwrap();
        assert_eq!(record.state, JobState::Completed { elements: 0 });
        assert!(coordinator.tracker().is_completed(SchemaId::new(5), 1));
    }

    #[test]
    fn test_backfill_failure_is_recorded() {
        let coordinator = BackfillCoordinator::new(1, Arc::new(FailingMaintainer)).unwrap();
        coordinator.schedule_backfill(relation_index(5), 1);

        let record = coordinator
            .tracker()
            .wait_for(SchemaId::new(5), Duration::from_secs(5))
            .unwrap();
        assert!(matches!(record.state, JobState::Failed { .. }));
        assert!(coordinator.tracker().needs_redrive(SchemaId::new(5), 1));
    }
}
