// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Management transaction: the single entry point for schema changes
//!
//! A transaction reads the latest committed snapshot plus its own pending
//! changes. Nothing it does is visible to others until `commit` succeeds.

use log::{debug, info, warn};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use super::makers::{EdgeLabelMaker, PropertyKeyMaker, VertexLabelMaker};
use crate::config::ManagementConfig;
use crate::error::{SchemaError, SchemaResult};
use crate::names::validate_name;
use crate::registry::overlay::Overlay;
use crate::registry::view::SchemaView;
use crate::registry::{CommitSummary, SchemaRegistry};
use crate::types::{
    EdgeLabel, GraphIndex, IndexBacking, PropertyKey, RelationType, RelationTypeFilter,
    SchemaElement, SchemaId, SchemaKind, SchemaRef, TypeDefinition, VertexLabel,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Open,
    Committed,
    RolledBack,
}

pub struct ManagementTransaction {
    id: Uuid,
    registry: Arc<SchemaRegistry>,
    pub(crate) overlay: Overlay,
    state: TransactionState,
    opened_at_version: u64,
}

impl ManagementTransaction {
    pub(crate) fn open(registry: Arc<SchemaRegistry>) -> Self {
        let id = Uuid::new_v4();
        let opened_at_version = registry.version();
        debug!(
            "Opened management transaction {} at schema version {}",
            id, opened_at_version
        );
        Self {
            id,
            registry,
            overlay: Overlay::default(),
            state: TransactionState::Open,
            opened_at_version,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == TransactionState::Open
    }

    /// Committed schema version when the transaction was opened
    pub fn opened_at_version(&self) -> u64 {
        self.opened_at_version
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    pub(crate) fn config(&self) -> &ManagementConfig {
        self.registry.config()
    }

    pub(crate) fn ensure_open(&self) -> SchemaResult<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(SchemaError::ClosedTransaction(self.id.to_string()))
        }
    }

    /// Runs `f` against the latest committed snapshot overlaid with this
    /// transaction's pending changes
    pub(crate) fn read<R>(
        &self,
        f: impl FnOnce(&SchemaView<'_>) -> SchemaResult<R>,
    ) -> SchemaResult<R> {
        self.ensure_open()?;
        let snapshot = self.registry.snapshot();
        let view = SchemaView::new(&snapshot, &self.overlay);
        f(&view)
    }

    pub(crate) fn check_name(&self, name: &str) -> SchemaResult<()> {
        validate_name(name, self.config().validate_names)
    }

    /// Binds a new schema type to `name`
    pub fn define(&mut self, name: &str, definition: TypeDefinition) -> SchemaResult<SchemaElement> {
        self.ensure_open()?;
        self.check_name(name)?;
        if self.read(|view| Ok(view.name_taken(name)))? {
            return Err(SchemaError::DuplicateName(name.to_string()));
        }

        let element = SchemaElement::new(self.registry.allocate_id(), name.to_string(), definition);
        debug!("Defined {} in transaction {}", element, self.id);
        self.overlay.define_type(element.clone());
        Ok(element)
    }

    /// The type bound to `name`, if any
    pub fn resolve(&self, name: &str) -> SchemaResult<Option<SchemaElement>> {
        self.read(|view| Ok(view.resolve(name)))
    }

    /// All types of one kind in id order
    pub fn enumerate(&self, kind: SchemaKind) -> SchemaResult<impl Iterator<Item = SchemaElement>> {
        self.read(|view| Ok(view.enumerate(kind).into_iter()))
    }

    pub fn contains_relation_type(&self, name: &str) -> SchemaResult<bool> {
        Ok(self.get_relation_type(name)?.is_some())
    }

    pub fn get_relation_type(&self, name: &str) -> SchemaResult<Option<RelationType>> {
        Ok(self.resolve(name)?.and_then(RelationType::from_element))
    }

    pub fn get_property_key(&self, name: &str) -> SchemaResult<Option<PropertyKey>> {
        Ok(self.resolve(name)?.and_then(PropertyKey::from_element))
    }

    pub fn get_edge_label(&self, name: &str) -> SchemaResult<Option<EdgeLabel>> {
        Ok(self.resolve(name)?.and_then(EdgeLabel::from_element))
    }

    pub fn contains_vertex_label(&self, name: &str) -> SchemaResult<bool> {
        Ok(self.get_vertex_label(name)?.is_some())
    }

    pub fn get_vertex_label(&self, name: &str) -> SchemaResult<Option<VertexLabel>> {
        Ok(self.resolve(name)?.and_then(VertexLabel::from_element))
    }

    /// Relation types selected by `filter` in id order
    pub fn get_relation_types(
        &self,
        filter: RelationTypeFilter,
    ) -> SchemaResult<impl Iterator<Item = RelationType>> {
        self.read(|view| {
            Ok(view
                .types()
                .into_iter()
                .filter(move |element| filter.matches(element.kind()))
                .filter_map(RelationType::from_element))
        })
    }

    pub fn get_vertex_labels(&self) -> SchemaResult<impl Iterator<Item = VertexLabel>> {
        Ok(self
            .enumerate(SchemaKind::VertexLabel)?
            .filter_map(VertexLabel::from_element))
    }

    pub fn make_property_key(&mut self, name: &str) -> SchemaResult<PropertyKeyMaker<'_>> {
        self.ensure_open()?;
        Ok(PropertyKeyMaker::new(self, name))
    }

    pub fn make_edge_label(&mut self, name: &str) -> SchemaResult<EdgeLabelMaker<'_>> {
        self.ensure_open()?;
        Ok(EdgeLabelMaker::new(self, name))
    }

    pub fn make_vertex_label(&mut self, name: &str) -> SchemaResult<VertexLabelMaker<'_>> {
        self.ensure_open()?;
        Ok(VertexLabelMaker::new(self, name))
    }

    /// Renames a type, graph index or vertex-centric index; the id is kept
    pub fn change_name(&mut self, target: impl Into<SchemaRef>, new_name: &str) -> SchemaResult<()> {
        let target = target.into();
        self.ensure_open()?;
        self.check_name(new_name)?;

        match target {
            SchemaRef::Type(id) => {
                let (element, taken) = self.read(|view| {
                    let element = view.type_by_id(id).ok_or_else(|| SchemaError::unknown(id))?;
                    Ok((element, view.name_taken(new_name)))
                })?;
                if element.name() == new_name {
                    return Ok(());
                }
                if taken {
                    return Err(SchemaError::DuplicateName(new_name.to_string()));
                }
                debug!("Renaming {} to '{}'", element, new_name);
                self.overlay.rename_type(&element, new_name);
            }
            SchemaRef::GraphIndex(id) => {
                let (index, taken) = self.read(|view| {
                    let index = view
                        .graph_index(id)
                        .ok_or_else(|| SchemaError::unknown(format!("graph index {}", id)))?;
                    Ok((index, view.name_taken(new_name)))
                })?;
                if index.name() == new_name {
                    return Ok(());
                }
                if taken {
                    return Err(SchemaError::DuplicateName(new_name.to_string()));
                }
                debug!("Renaming graph index '{}' to '{}'", index.name(), new_name);
                self.overlay.rename_graph_index(&index, new_name);
            }
            SchemaRef::RelationIndex(id) => {
                let (index, taken) = self.read(|view| {
                    let index = view.relation_index(id).ok_or_else(|| {
                        SchemaError::unknown(format!("vertex-centric index {}", id))
                    })?;
                    let taken = view.relation_index_by_name(index.owner(), new_name).is_some();
                    Ok((index, taken))
                })?;
                if index.name() == new_name {
                    return Ok(());
                }
                if taken {
                    return Err(SchemaError::DuplicateName(new_name.to_string()));
                }
                debug!(
                    "Renaming vertex-centric index '{}' to '{}'",
                    index.name(),
                    new_name
                );
                self.overlay.rename_relation_index(&index, new_name);
            }
        }
        Ok(())
    }

    /// JSON description of the schema as this transaction sees it
    pub fn describe_schema(&self) -> SchemaResult<Value> {
        self.read(|view| {
            let key_name = |id: SchemaId| {
                view.type_by_id(id)
                    .map(|element| element.name().to_string())
                    .unwrap_or_else(|| id.to_string())
            };

            let types: Vec<Value> = view
                .types()
                .iter()
                .map(|element| {
                    json!({
                        "id": element.id().as_u64(),
                        "name": element.name(),
                        "kind": element.kind().to_string(),
                        "consistency": format!("{:?}", view.consistency(element.id())).to_uppercase(),
                        "ttl_seconds": view.ttl_seconds(element.id()),
                    })
                })
                .collect();

            let graph_indexes: Vec<Value> = view
                .all_graph_indexes()
                .iter()
                .map(|index| describe_graph_index(index, &key_name))
                .collect();

            let relation_indexes: Vec<Value> = view
                .relation_indexes(None)
                .iter()
                .map(|index| {
                    json!({
                        "id": index.id().as_u64(),
                        "name": index.name(),
                        "owner": key_name(index.owner()),
                        "direction": format!("{:?}", index.direction()).to_uppercase(),
                        "order": format!("{:?}", index.sort_order()).to_uppercase(),
                        "sort_keys": index.sort_keys().iter().map(|k| key_name(*k)).collect::<Vec<_>>(),
                        "status": index.status().to_string(),
                    })
                })
                .collect();

            Ok(json!({
                "transaction": self.id.to_string(),
                "version": view.version(),
                "types": types,
                "graph_indexes": graph_indexes,
                "relation_indexes": relation_indexes,
                "options": view.options(),
            }))
        })
    }

    /// Atomically publishes every pending change as a new schema version
    pub fn commit(&mut self) -> SchemaResult<CommitSummary> {
        self.ensure_open()?;
        let overlay = std::mem::take(&mut self.overlay);

        if overlay.is_empty() {
            self.state = TransactionState::Committed;
            debug!("Committed empty management transaction {}", self.id);
            return Ok(CommitSummary {
                version: self.registry.version(),
                changes: 0,
                jobs: 0,
            });
        }

        match self.registry.merge(&overlay) {
            Ok(summary) => {
                self.state = TransactionState::Committed;
                info!(
                    "Committed management transaction {} as schema version {} ({} changes, {} jobs)",
                    self.id, summary.version, summary.changes, summary.jobs
                );
                Ok(summary)
            }
            Err(e) => {
                self.state = TransactionState::RolledBack;
                warn!("Management transaction {} failed to commit: {}", self.id, e);
                Err(e)
            }
        }
    }

    /// Discards every pending change; a no-op once the transaction is closed
    pub fn rollback(&mut self) {
        if !self.is_open() {
            return;
        }
        let discarded = self.overlay.changes().len();
        self.overlay = Overlay::default();
        self.state = TransactionState::RolledBack;
        debug!(
            "Rolled back management transaction {} ({} changes discarded)",
            self.id, discarded
        );
    }
}

fn describe_graph_index(index: &GraphIndex, key_name: &impl Fn(SchemaId) -> String) -> Value {
    let backing = match index.backing() {
        IndexBacking::Composite => "composite".to_string(),
        IndexBacking::Mixed { backend } => format!("mixed:{}", backend),
    };
    json!({
        "id": index.id().as_u64(),
        "name": index.name(),
        "category": index.element_category().to_string(),
        "backing": backing,
        "keys": index.keys().into_iter().map(key_name).collect::<Vec<_>>(),
        "restricted_to": index.restricted_to().map(key_name),
        "unique": index.is_unique(),
        "status": index.status().to_string(),
        "generation": index.generation(),
    })
}

impl Drop for ManagementTransaction {
    fn drop(&mut self) {
        if self.is_open() && !self.overlay.is_empty() {
            warn!(
                "Management transaction {} dropped while open, rolling back",
                self.id
            );
        }
        self.rollback();
    }
}

impl std::fmt::Debug for ManagementTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagementTransaction")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("pending_changes", &self.overlay.changes().len())
            .finish()
    }
}
