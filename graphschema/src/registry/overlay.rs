// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Transaction-private schema changes
//!
//! An overlay keeps two views of the same edits: lookup maps that let the
//! owning transaction read its own writes, and an ordered change log that is
//! replayed against the latest committed snapshot at commit time.

use std::collections::{HashMap, HashSet};

use crate::types::{
    ConsistencyModifier, GraphIndex, IndexField, IndexStatus, RelationTypeIndex, SchemaAction,
    SchemaElement, SchemaId, SchemaRef,
};

/// One recorded schema change
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SchemaChange {
    DefineType(SchemaElement),
    CreateGraphIndex(GraphIndex),
    CreateRelationIndex(RelationTypeIndex),
    AddIndexKey {
        index: SchemaId,
        field: IndexField,
    },
    Rename {
        target: SchemaRef,
        from: String,
        to: String,
    },
    SetConsistency {
        target: SchemaId,
        modifier: ConsistencyModifier,
    },
    SetTtl {
        target: SchemaId,
        seconds: u64,
    },
    SetOption {
        path: String,
        value: String,
    },
    UpdateGraphIndex {
        index: SchemaId,
        action: SchemaAction,
        /// Generation the transaction observed when issuing the action
        generation: u64,
    },
    /// An action that was a no-op when issued; holds only while the index
    /// is still in `status` at `generation`
    KeepGraphIndex {
        index: SchemaId,
        action: SchemaAction,
        status: IndexStatus,
        generation: u64,
    },
    RebuildRelationIndex {
        index: SchemaId,
    },
}

/// Pending edits to a committed graph index, laid over whatever record is
/// committed at read time
#[derive(Debug, Clone, Default)]
pub(crate) struct GraphIndexDelta {
    name: Option<String>,
    fields: Vec<IndexField>,
    lifecycle: Option<(IndexStatus, u64)>,
}

impl GraphIndexDelta {
    pub(crate) fn apply(&self, mut index: GraphIndex) -> GraphIndex {
        if let Some(name) = &self.name {
            index.name = name.clone();
        }
        for field in &self.fields {
            if !index.fields.iter().any(|f| f.key == field.key) {
                index.fields.push(field.clone());
            }
        }
        if let Some((status, generation)) = self.lifecycle {
            index.status = status;
            index.generation = generation;
        }
        index
    }
}

#[derive(Debug, Default)]
pub(crate) struct Overlay {
    /// Names bound inside this transaction
    pub(crate) names: HashMap<String, SchemaId>,
    /// Committed names given up by renames or removals, with the id that held them
    pub(crate) released: HashMap<String, SchemaId>,
    pub(crate) types: HashMap<SchemaId, SchemaElement>,
    /// Graph indexes created in this transaction
    pub(crate) graph_indexes: HashMap<SchemaId, GraphIndex>,
    pub(crate) index_deltas: HashMap<SchemaId, GraphIndexDelta>,
    pub(crate) removed_indexes: HashSet<SchemaId>,
    pub(crate) relation_indexes: HashMap<SchemaId, RelationTypeIndex>,
    pub(crate) consistency: HashMap<SchemaId, ConsistencyModifier>,
    pub(crate) ttl: HashMap<SchemaId, u64>,
    pub(crate) options: HashMap<String, String>,
    changes: Vec<SchemaChange>,
}

impl Overlay {
    pub(crate) fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub(crate) fn changes(&self) -> &[SchemaChange] {
        &self.changes
    }

    fn bind(&mut self, name: &str, id: SchemaId) {
        self.released.remove(name);
        self.names.insert(name.to_string(), id);
    }

    fn unbind(&mut self, name: &str, id: SchemaId) {
        if self.names.get(name) == Some(&id) {
            self.names.remove(name);
        }
        self.released.insert(name.to_string(), id);
    }

    pub(crate) fn define_type(&mut self, element: SchemaElement) {
        self.bind(element.name(), element.id());
        self.types.insert(element.id(), element.clone());
        self.changes.push(SchemaChange::DefineType(element));
    }

    pub(crate) fn create_graph_index(&mut self, index: GraphIndex) {
        self.bind(&index.name, index.id);
        self.graph_indexes.insert(index.id, index.clone());
        self.changes.push(SchemaChange::CreateGraphIndex(index));
    }

    pub(crate) fn create_relation_index(&mut self, index: RelationTypeIndex) {
        self.relation_indexes.insert(index.id, index.clone());
        self.changes.push(SchemaChange::CreateRelationIndex(index));
    }

    /// Routes an edit to the index created here, or to the delta of a committed one
    fn edit_graph_index(
        &mut self,
        id: SchemaId,
        created: impl FnOnce(&mut GraphIndex),
        committed: impl FnOnce(&mut GraphIndexDelta),
    ) {
        match self.graph_indexes.get_mut(&id) {
            Some(index) => created(index),
            None => committed(self.index_deltas.entry(id).or_default()),
        }
    }

    pub(crate) fn add_index_key(&mut self, index: SchemaId, field: IndexField) {
        self.edit_graph_index(
            index,
            |created| created.fields.push(field.clone()),
            |delta| delta.fields.push(field.clone()),
        );
        self.changes.push(SchemaChange::AddIndexKey { index, field });
    }

    pub(crate) fn rename_type(&mut self, element: &SchemaElement, to: &str) {
        let id = element.id();
        self.unbind(element.name(), id);
        self.bind(to, id);
        self.types.insert(id, element.renamed(to));
        self.changes.push(SchemaChange::Rename {
            target: SchemaRef::Type(id),
            from: element.name().to_string(),
            to: to.to_string(),
        });
    }

    pub(crate) fn rename_graph_index(&mut self, index: &GraphIndex, to: &str) {
        let id = index.id;
        self.unbind(&index.name, id);
        self.bind(to, id);
        self.edit_graph_index(
            id,
            |created| created.name = to.to_string(),
            |delta| delta.name = Some(to.to_string()),
        );
        self.changes.push(SchemaChange::Rename {
            target: SchemaRef::GraphIndex(id),
            from: index.name.clone(),
            to: to.to_string(),
        });
    }

    pub(crate) fn rename_relation_index(&mut self, index: &RelationTypeIndex, to: &str) {
        let mut renamed = index.clone();
        renamed.name = to.to_string();
        self.relation_indexes.insert(index.id, renamed);
        self.changes.push(SchemaChange::Rename {
            target: SchemaRef::RelationIndex(index.id),
            from: index.name.clone(),
            to: to.to_string(),
        });
    }

    pub(crate) fn set_consistency(&mut self, target: SchemaId, modifier: ConsistencyModifier) {
        self.consistency.insert(target, modifier);
        self.changes
            .push(SchemaChange::SetConsistency { target, modifier });
    }

    pub(crate) fn set_ttl(&mut self, target: SchemaId, seconds: u64) {
        self.ttl.insert(target, seconds);
        self.changes.push(SchemaChange::SetTtl { target, seconds });
    }

    pub(crate) fn set_option(&mut self, path: &str, value: String) {
        self.options.insert(path.to_string(), value.clone());
        self.changes.push(SchemaChange::SetOption {
            path: path.to_string(),
            value,
        });
    }

    /// Records a lifecycle action validated against `current` that moves the
    /// index to `status` at `generation`
    pub(crate) fn update_graph_index(
        &mut self,
        current: &GraphIndex,
        action: SchemaAction,
        status: IndexStatus,
        generation: u64,
    ) {
        self.edit_graph_index(
            current.id,
            |created| {
                created.status = status;
                created.generation = generation;
            },
            |delta| delta.lifecycle = Some((status, generation)),
        );
        self.changes.push(SchemaChange::UpdateGraphIndex {
            index: current.id,
            action,
            generation: current.generation,
        });
    }

    /// Records an action that leaves `current` unchanged
    pub(crate) fn keep_graph_index(&mut self, current: &GraphIndex, action: SchemaAction) {
        self.changes.push(SchemaChange::KeepGraphIndex {
            index: current.id,
            action,
            status: current.status,
            generation: current.generation,
        });
    }

    pub(crate) fn remove_graph_index(&mut self, index: &GraphIndex) {
        self.unbind(&index.name, index.id);
        self.graph_indexes.remove(&index.id);
        self.index_deltas.remove(&index.id);
        self.consistency.remove(&index.id);
        self.removed_indexes.insert(index.id);
        self.changes.push(SchemaChange::UpdateGraphIndex {
            index: index.id,
            action: SchemaAction::RemoveIndex,
            generation: index.generation,
        });
    }

    pub(crate) fn rebuild_relation_index(&mut self, index: SchemaId) {
        self.changes
            .push(SchemaChange::RebuildRelationIndex { index });
    }
}
