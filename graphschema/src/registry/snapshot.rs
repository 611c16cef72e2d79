// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Immutable committed schema snapshot and the commit-time merge of overlay changes

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

use super::overlay::SchemaChange;
use crate::index::lifecycle::{transition, Transition};
use crate::jobs::IndexDescriptor;
use crate::storage::PersistedSchema;
use crate::types::{
    ConsistencyModifier, GraphIndex, IndexStatus, RelationTypeIndex, SchemaAction, SchemaElement,
    SchemaId, SchemaKind, SchemaRef,
};

/// Work to hand to the backfill executor once a merge is published
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PendingEffect {
    /// A graph index entered REGISTERED
    Backfill(SchemaId),
    /// REGISTER_INDEX or REINDEX re-issued on a REGISTERED index
    Redrive(SchemaId),
    /// REINDEX of a vertex-centric index
    Rebuild(SchemaId),
    /// A graph index was removed
    Release(IndexDescriptor),
}

/// A committed, immutable version of the schema
///
/// Names of schema types and graph indexes share one namespace.
#[derive(Debug, Clone, Default)]
pub struct SchemaSnapshot {
    version: u64,
    next_id: u64,
    names: HashMap<String, SchemaId>,
    types: HashMap<SchemaId, SchemaElement>,
    graph_indexes: HashMap<SchemaId, GraphIndex>,
    relation_indexes: HashMap<SchemaId, RelationTypeIndex>,
    consistency: HashMap<SchemaId, ConsistencyModifier>,
    ttl: HashMap<SchemaId, u64>,
    options: BTreeMap<String, String>,
    committed_at: Option<DateTime<Utc>>,
}

impl SchemaSnapshot {
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn committed_at(&self) -> Option<DateTime<Utc>> {
        self.committed_at
    }

    /// Number of schema types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The type or graph index currently bound to `name`
    pub fn name_owner(&self, name: &str) -> Option<SchemaId> {
        self.names.get(name).copied()
    }

    pub fn resolve(&self, name: &str) -> Option<&SchemaElement> {
        self.names.get(name).and_then(|id| self.types.get(id))
    }

    pub fn type_by_id(&self, id: SchemaId) -> Option<&SchemaElement> {
        self.types.get(&id)
    }

    pub fn types(&self) -> impl Iterator<Item = &SchemaElement> + '_ {
        self.types.values()
    }

    pub fn enumerate(&self, kind: SchemaKind) -> impl Iterator<Item = &SchemaElement> + '_ {
        self.types.values().filter(move |element| element.kind() == kind)
    }

    pub fn graph_index(&self, id: SchemaId) -> Option<&GraphIndex> {
        self.graph_indexes.get(&id)
    }

    pub fn graph_index_by_name(&self, name: &str) -> Option<&GraphIndex> {
        self.names.get(name).and_then(|id| self.graph_indexes.get(id))
    }

    pub fn graph_indexes(&self) -> impl Iterator<Item = &GraphIndex> + '_ {
        self.graph_indexes.values()
    }

    pub fn relation_index(&self, id: SchemaId) -> Option<&RelationTypeIndex> {
        self.relation_indexes.get(&id)
    }

    pub fn relation_indexes(&self) -> impl Iterator<Item = &RelationTypeIndex> + '_ {
        self.relation_indexes.values()
    }

    pub fn consistency(&self, id: SchemaId) -> Option<ConsistencyModifier> {
        self.consistency.get(&id).copied()
    }

    pub fn ttl_seconds(&self, id: SchemaId) -> Option<u64> {
        self.ttl.get(&id).copied()
    }

    /// Value of a managed option
    pub fn option(&self, path: &str) -> Option<&str> {
        self.options.get(path).map(String::as_str)
    }

    pub fn options(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.options.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Stamps a merged snapshot before it is published
    pub(crate) fn seal(&mut self, version: u64, next_id: u64) {
        self.version = version;
        self.next_id = self.next_id.max(next_id);
        self.committed_at = Some(Utc::now());
    }

    pub(crate) fn from_persisted(persisted: PersistedSchema) -> Self {
        let mut snapshot = SchemaSnapshot {
            version: persisted.version,
            next_id: persisted.next_id,
            committed_at: persisted.committed_at,
            consistency: persisted.consistency.into_iter().collect(),
            ttl: persisted.ttl.into_iter().collect(),
            options: persisted.options.into_iter().collect(),
            ..SchemaSnapshot::default()
        };
        for element in persisted.types {
            snapshot.names.insert(element.name().to_string(), element.id());
            snapshot.types.insert(element.id(), element);
        }
        for index in persisted.graph_indexes {
            snapshot.names.insert(index.name.clone(), index.id);
            snapshot.graph_indexes.insert(index.id, index);
        }
        for index in persisted.relation_indexes {
            snapshot.relation_indexes.insert(index.id, index);
        }
        snapshot
    }

    pub(crate) fn to_persisted(&self) -> PersistedSchema {
        let mut types: Vec<SchemaElement> = self.types.values().cloned().collect();
        types.sort_by_key(|element| element.id());
        let mut graph_indexes: Vec<GraphIndex> = self.graph_indexes.values().cloned().collect();
        graph_indexes.sort_by_key(|index| index.id);
        let mut relation_indexes: Vec<RelationTypeIndex> =
            self.relation_indexes.values().cloned().collect();
        relation_indexes.sort_by_key(|index| index.id);
        let mut consistency: Vec<_> = self.consistency.iter().map(|(k, v)| (*k, *v)).collect();
        consistency.sort_by_key(|(id, _)| *id);
        let mut ttl: Vec<_> = self.ttl.iter().map(|(k, v)| (*k, *v)).collect();
        ttl.sort_by_key(|(id, _)| *id);

        PersistedSchema {
            version: self.version,
            next_id: self.next_id,
            types,
            graph_indexes,
            relation_indexes,
            consistency,
            ttl,
            options: self
                .options
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            committed_at: self.committed_at,
        }
    }

    /// Replays one overlay change on top of this snapshot.
    ///
    /// Errors describe a conflict with state committed after the overlay was
    /// built; the caller aborts the whole merge.
    pub(crate) fn merge_change(
        &mut self,
        change: &SchemaChange,
    ) -> Result<Option<PendingEffect>, String> {
        match change {
            SchemaChange::DefineType(element) => {
                self.claim_name(element.name(), element.id())?;
                self.types.insert(element.id(), element.clone());
                Ok(None)
            }
            SchemaChange::CreateGraphIndex(index) => {
                for field in &index.fields {
                    self.require_type(field.key)?;
                }
                if let Some(restriction) = index.restricted_to {
                    self.require_type(restriction)?;
                }
                self.claim_name(&index.name, index.id)?;
                self.graph_indexes.insert(index.id, index.clone());
                Ok(None)
            }
            SchemaChange::CreateRelationIndex(index) => {
                self.require_type(index.owner)?;
                for key in &index.sort_keys {
                    self.require_type(*key)?;
                }
                if self.relation_index_named(index.owner, &index.name).is_some() {
                    return Err(format!(
                        "vertex-centric index '{}' was created on {} by a concurrent commit",
                        index.name, index.owner
                    ));
                }
                self.relation_indexes.insert(index.id, index.clone());
                Ok(None)
            }
            SchemaChange::AddIndexKey { index, field } => {
                self.require_type(field.key)?;
                let target = self
                    .graph_indexes
                    .get_mut(index)
                    .ok_or_else(|| format!("graph index {} no longer exists", index))?;
                if !target.backing.is_mixed() {
                    return Err(format!("graph index '{}' is not a mixed index", target.name));
                }
                if target.fields.iter().any(|f| f.key == field.key) {
                    return Err(format!(
                        "key {} was added to '{}' by a concurrent commit",
                        field.key, target.name
                    ));
                }
                target.fields.push(field.clone());
                Ok(None)
            }
            SchemaChange::Rename { target, from, to } => {
                self.merge_rename(*target, from, to)?;
                Ok(None)
            }
            SchemaChange::SetConsistency { target, modifier } => {
                if !self.types.contains_key(target) && !self.graph_indexes.contains_key(target) {
                    return Err(format!("schema element {} no longer exists", target));
                }
                self.consistency.insert(*target, *modifier);
                Ok(None)
            }
            SchemaChange::SetTtl { target, seconds } => {
                self.require_type(*target)?;
                self.ttl.insert(*target, *seconds);
                Ok(None)
            }
            SchemaChange::SetOption { path, value } => {
                self.options.insert(path.clone(), value.clone());
                Ok(None)
            }
            SchemaChange::UpdateGraphIndex {
                index,
                action,
                generation,
            } => self.merge_index_update(*index, *action, *generation),
            SchemaChange::KeepGraphIndex {
                index,
                action,
                status,
                generation,
            } => {
                let current = self
                    .graph_indexes
                    .get(index)
                    .ok_or_else(|| format!("graph index {} no longer exists", index))?;
                if current.status != *status || current.generation != *generation {
                    return Err(format!(
                        "graph index '{}' moved to {} concurrently; {} no longer applies",
                        current.name, current.status, action
                    ));
                }
                if action.triggers_backfill() {
                    return Ok(Some(PendingEffect::Redrive(*index)));
                }
                Ok(None)
            }
            SchemaChange::RebuildRelationIndex { index } => {
                if !self.relation_indexes.contains_key(index) {
                    return Err(format!("vertex-centric index {} no longer exists", index));
                }
                Ok(Some(PendingEffect::Rebuild(*index)))
            }
        }
    }

    fn claim_name(&mut self, name: &str, id: SchemaId) -> Result<(), String> {
        match self.names.get(name) {
            Some(owner) if *owner != id => Err(format!(
                "name '{}' was claimed by a concurrent commit",
                name
            )),
            _ => {
                self.names.insert(name.to_string(), id);
                Ok(())
            }
        }
    }

    fn require_type(&self, id: SchemaId) -> Result<&SchemaElement, String> {
        self.types
            .get(&id)
            .ok_or_else(|| format!("schema type {} no longer exists", id))
    }

    fn relation_index_named(&self, owner: SchemaId, name: &str) -> Option<&RelationTypeIndex> {
        self.relation_indexes
            .values()
            .find(|index| index.owner == owner && index.name == name)
    }

    fn merge_rename(&mut self, target: SchemaRef, from: &str, to: &str) -> Result<(), String> {
        let current = match target {
            SchemaRef::Type(id) => self.require_type(id)?.name().to_string(),
            SchemaRef::GraphIndex(id) => self
                .graph_indexes
                .get(&id)
                .map(|index| index.name.clone())
                .ok_or_else(|| format!("graph index {} no longer exists", id))?,
            SchemaRef::RelationIndex(id) => self
                .relation_indexes
                .get(&id)
                .map(|index| index.name.clone())
                .ok_or_else(|| format!("vertex-centric index {} no longer exists", id))?,
        };
        if current != from {
            return Err(format!(
                "'{}' was renamed to '{}' by a concurrent commit",
                from, current
            ));
        }

        match target {
            SchemaRef::Type(id) => {
                self.names.remove(from);
                self.claim_name(to, id)?;
                if let Some(element) = self.types.get_mut(&id) {
                    *element = element.renamed(to);
                }
            }
            SchemaRef::GraphIndex(id) => {
                self.names.remove(from);
                self.claim_name(to, id)?;
                if let Some(index) = self.graph_indexes.get_mut(&id) {
                    index.name = to.to_string();
                }
            }
            SchemaRef::RelationIndex(id) => {
                let owner = self
                    .relation_indexes
                    .get(&id)
                    .map(|index| index.owner)
                    .ok_or_else(|| format!("vertex-centric index {} no longer exists", id))?;
                if self.relation_index_named(owner, to).is_some() {
                    return Err(format!(
                        "vertex-centric index name '{}' was claimed by a concurrent commit",
                        to
                    ));
                }
                if let Some(index) = self.relation_indexes.get_mut(&id) {
                    index.name = to.to_string();
                }
            }
        }
        Ok(())
    }

    fn merge_index_update(
        &mut self,
        id: SchemaId,
        action: SchemaAction,
        generation: u64,
    ) -> Result<Option<PendingEffect>, String> {
        let Some(current) = self.graph_indexes.get(&id) else {
            if action == SchemaAction::RemoveIndex {
                return Ok(None);
            }
            return Err(format!("graph index {} no longer exists", id));
        };

        match transition(current.status, action) {
            None => Err(format!(
                "graph index '{}' moved to {} concurrently and cannot apply {}",
                current.name, current.status, action
            )),
            Some(Transition::NoOp) if action.triggers_backfill() => {
                Ok(Some(PendingEffect::Redrive(id)))
            }
            Some(Transition::NoOp) => Ok(None),
            Some(Transition::Apply(status)) => {
                if action == SchemaAction::EnableIndex && current.generation != generation {
                    return Err(format!(
                        "graph index '{}' was re-registered concurrently",
                        current.name
                    ));
                }
                let Some(index) = self.graph_indexes.get_mut(&id) else {
                    return Err(format!("graph index {} no longer exists", id));
                };
                index.status = status;
                if status == IndexStatus::Registered {
                    index.generation += 1;
                    return Ok(Some(PendingEffect::Backfill(id)));
                }
                Ok(None)
            }
            Some(Transition::Remove) => {
                let Some(removed) = self.graph_indexes.remove(&id) else {
                    return Ok(None);
                };
                self.names.remove(&removed.name);
                self.consistency.remove(&id);
                Ok(Some(PendingEffect::Release(IndexDescriptor::Graph(removed))))
            }
        }
    }
}
