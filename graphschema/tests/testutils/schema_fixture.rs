// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Registry fixture with a small social-network schema

use graphschema::{
    DataType, ElementCategory, GraphIndex, IndexMaintainer, IndexStatus, JobState,
    ManagementConfig, MemorySchemaStore, NoopIndexMaintainer, SchemaAction, SchemaRegistry,
};
use std::sync::Arc;
use std::time::Duration;

pub const BACKFILL_TIMEOUT: Duration = Duration::from_secs(10);

pub struct SchemaFixture {
    pub registry: Arc<SchemaRegistry>,
}

impl SchemaFixture {
    /// In-memory registry whose backfills complete immediately
    pub fn new() -> Self {
        Self::with_maintainer(Arc::new(NoopIndexMaintainer))
    }

    pub fn with_maintainer(maintainer: Arc<dyn IndexMaintainer>) -> Self {
        super::init_logging();
        let mut config = ManagementConfig::in_memory();
        config.backfill_workers = 1;
        let registry =
            SchemaRegistry::open_with(config, Arc::new(MemorySchemaStore::new()), maintainer)
                .expect("Failed to open schema registry");
        Self { registry }
    }

    /// Commits property keys `name`, `age`, vertex label `person`, edge label `knows`
    pub fn with_social_schema(self) -> Self {
        let mut tx = self.registry.open_management();
        tx.make_property_key("name")
            .unwrap()
            .data_type(DataType::String)
            .make()
            .unwrap();
        tx.make_property_key("age")
            .unwrap()
            .data_type(DataType::Integer)
            .make()
            .unwrap();
        tx.make_vertex_label("person").unwrap().make().unwrap();
        tx.make_edge_label("knows").unwrap().make().unwrap();
        tx.commit().expect("Failed to commit social schema");
        self
    }

    /// Commits a mixed vertex index over `name` and returns it
    pub fn install_mixed_index(&self, index_name: &str) -> GraphIndex {
        let mut tx = self.registry.open_management();
        let name = tx.get_property_key("name").unwrap().expect("name key");
        let index = tx
            .build_index(index_name, ElementCategory::Vertex)
            .unwrap()
            .index_key(&name)
            .unwrap()
            .build_mixed_index("search")
            .unwrap();
        tx.commit().expect("Failed to commit index");
        index
    }

    pub fn graph_index(&self, index_name: &str) -> Option<GraphIndex> {
        let tx = self.registry.open_management();
        tx.get_graph_index(index_name).unwrap()
    }

    pub fn status(&self, index_name: &str) -> Option<IndexStatus> {
        self.graph_index(index_name).map(|index| index.status())
    }

    /// Applies `action` in its own transaction and commits it
    pub fn apply(&self, index_name: &str, action: SchemaAction) -> graphschema::SchemaResult<()> {
        let mut tx = self.registry.open_management();
        let index = tx.get_graph_index(index_name)?.expect("index exists");
        tx.update_index(&index, action)?;
        tx.commit().map(|_| ())
    }

    /// Blocks until the current backfill of `index_name` finished successfully
    pub fn await_backfill(&self, index_name: &str) {
        let record = self
            .registry
            .await_backfill(index_name, BACKFILL_TIMEOUT)
            .expect("backfill was scheduled");
        assert!(
            matches!(record.state, JobState::Completed { .. }),
            "backfill of '{}' ended in {:?}",
            index_name,
            record.state
        );
    }

    /// Installs `index_name` and walks it to `status`
    pub fn index_in(&self, index_name: &str, status: IndexStatus) {
        self.install_mixed_index(index_name);
        if status == IndexStatus::Installed {
            return;
        }
        self.apply(index_name, SchemaAction::RegisterIndex).unwrap();
        self.await_backfill(index_name);
        if status == IndexStatus::Registered {
            return;
        }
        self.apply(index_name, SchemaAction::EnableIndex).unwrap();
        if status == IndexStatus::Enabled {
            return;
        }
        self.apply(index_name, SchemaAction::DisableIndex).unwrap();
        assert_eq!(self.status(index_name), Some(IndexStatus::Disabled));
    }
}
