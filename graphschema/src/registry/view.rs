// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Read path shared by every lookup: a transaction's overlay on top of the
//! committed snapshot it is reading

use std::collections::{BTreeMap, HashMap};

use super::overlay::Overlay;
use super::snapshot::SchemaSnapshot;
use crate::types::{
    ConsistencyModifier, ElementCategory, GraphIndex, RelationTypeIndex, SchemaElement, SchemaId,
    SchemaKind,
};

pub(crate) struct SchemaView<'a> {
    committed: &'a SchemaSnapshot,
    overlay: &'a Overlay,
}

impl<'a> SchemaView<'a> {
    pub(crate) fn new(committed: &'a SchemaSnapshot, overlay: &'a Overlay) -> Self {
        Self { committed, overlay }
    }

    pub(crate) fn version(&self) -> u64 {
        self.committed.version()
    }

    fn binding(&self, name: &str) -> Option<SchemaId> {
        if let Some(id) = self.overlay.names.get(name) {
            return Some(*id);
        }
        match self.committed.name_owner(name) {
            Some(id) if self.overlay.released.get(name) == Some(&id) => None,
            other => other,
        }
    }

    /// True when a type or graph index already owns `name`
    pub(crate) fn name_taken(&self, name: &str) -> bool {
        self.binding(name).is_some()
    }

    pub(crate) fn type_by_id(&self, id: SchemaId) -> Option<SchemaElement> {
        self.overlay
            .types
            .get(&id)
            .or_else(|| self.committed.type_by_id(id))
            .cloned()
    }

    pub(crate) fn resolve(&self, name: &str) -> Option<SchemaElement> {
        self.binding(name).and_then(|id| self.type_by_id(id))
    }

    /// All visible types in id order
    pub(crate) fn types(&self) -> Vec<SchemaElement> {
        let mut merged: HashMap<SchemaId, &SchemaElement> =
            self.committed.types().map(|e| (e.id(), e)).collect();
        merged.extend(self.overlay.types.iter().map(|(id, e)| (*id, e)));
        let mut types: Vec<SchemaElement> = merged.into_values().cloned().collect();
        types.sort_by_key(|element| element.id());
        types
    }

    pub(crate) fn enumerate(&self, kind: SchemaKind) -> Vec<SchemaElement> {
        self.types()
            .into_iter()
            .filter(|element| element.kind() == kind)
            .collect()
    }

    pub(crate) fn graph_index(&self, id: SchemaId) -> Option<GraphIndex> {
        if self.overlay.removed_indexes.contains(&id) {
            return None;
        }
        if let Some(created) = self.overlay.graph_indexes.get(&id) {
            return Some(created.clone());
        }
        let committed = self.committed.graph_index(id)?.clone();
        Some(match self.overlay.index_deltas.get(&id) {
            Some(delta) => delta.apply(committed),
            None => committed,
        })
    }

    pub(crate) fn graph_index_by_name(&self, name: &str) -> Option<GraphIndex> {
        self.binding(name).and_then(|id| self.graph_index(id))
    }

    /// Visible graph indexes of one category in id order
    pub(crate) fn graph_indexes(&self, category: ElementCategory) -> Vec<GraphIndex> {
        let mut indexes: Vec<GraphIndex> = self
            .committed
            .graph_indexes()
            .map(|index| index.id)
            .chain(self.overlay.graph_indexes.keys().copied())
            .filter_map(|id| self.graph_index(id))
            .filter(|index| index.category == category)
            .collect();
        indexes.sort_by_key(|index| index.id);
        indexes
    }

    pub(crate) fn all_graph_indexes(&self) -> Vec<GraphIndex> {
        let mut indexes: Vec<GraphIndex> = [
            ElementCategory::Vertex,
            ElementCategory::Edge,
            ElementCategory::Property,
        ]
        .into_iter()
        .flat_map(|category| self.graph_indexes(category))
        .collect();
        indexes.sort_by_key(|index| index.id);
        indexes
    }

    pub(crate) fn relation_index(&self, id: SchemaId) -> Option<RelationTypeIndex> {
        self.overlay
            .relation_indexes
            .get(&id)
            .or_else(|| self.committed.relation_index(id))
            .cloned()
    }

    /// Vertex-centric indexes in id order, optionally limited to one owner
    pub(crate) fn relation_indexes(&self, owner: Option<SchemaId>) -> Vec<RelationTypeIndex> {
        let mut merged: HashMap<SchemaId, &RelationTypeIndex> =
            self.committed.relation_indexes().map(|i| (i.id, i)).collect();
        merged.extend(self.overlay.relation_indexes.iter().map(|(id, i)| (*id, i)));
        let mut indexes: Vec<RelationTypeIndex> = merged
            .into_values()
            .filter(|index| owner.map_or(true, |owner| index.owner == owner))
            .cloned()
            .collect();
        indexes.sort_by_key(|index| index.id);
        indexes
    }

    pub(crate) fn relation_index_by_name(
        &self,
        owner: SchemaId,
        name: &str,
    ) -> Option<RelationTypeIndex> {
        self.relation_indexes(Some(owner))
            .into_iter()
            .find(|index| index.name == name)
    }

    pub(crate) fn consistency(&self, id: SchemaId) -> ConsistencyModifier {
        self.overlay
            .consistency
            .get(&id)
            .copied()
            .or_else(|| self.committed.consistency(id))
            .unwrap_or_default()
    }

    pub(crate) fn option(&self, path: &str) -> Option<String> {
        self.overlay
            .options
            .get(path)
            .cloned()
            .or_else(|| self.committed.option(path).map(str::to_string))
    }

    /// Committed options with this transaction's writes applied
    pub(crate) fn options(&self) -> BTreeMap<String, String> {
        let mut merged: BTreeMap<String, String> = self
            .committed
            .options()
            .map(|(path, value)| (path.to_string(), value.to_string()))
            .collect();
        merged.extend(
            self.overlay
                .options
                .iter()
                .map(|(path, value)| (path.clone(), value.clone())),
        );
        merged
    }

    /// Configured TTL in whole seconds, 0 when unset
    pub(crate) fn ttl_seconds(&self, id: SchemaId) -> u64 {
        self.overlay
            .ttl
            .get(&id)
            .copied()
            .or_else(|| self.committed.ttl_seconds(id))
            .unwrap_or(0)
    }
}
