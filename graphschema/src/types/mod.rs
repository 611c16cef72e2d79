// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Schema data model
//!
//! This module provides:
//! - Schema types (vertex labels, edge labels, property keys) and their ids
//! - Vertex-centric and graph-wide index definitions
//! - Index lifecycle states and actions
//! - Consistency modifiers and TTL units

pub mod element;
pub mod index;

pub use element::{
    Cardinality, DataType, EdgeLabel, Multiplicity, PropertyKey, RelationType,
    RelationTypeFilter, SchemaElement, SchemaId, SchemaKind, TypeDefinition, VertexLabel,
};
pub use index::{
    ConsistencyModifier, Direction, ElementCategory, GraphIndex, IndexBacking, IndexField,
    IndexRef, IndexStatus, Order, Parameter, ParameterValue, RelationTypeIndex, SchemaAction,
    TimeUnit,
};

/// Handle to anything that carries a name or a consistency setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaRef {
    Type(SchemaId),
    GraphIndex(SchemaId),
    RelationIndex(SchemaId),
}

impl SchemaRef {
    pub fn id(&self) -> SchemaId {
        match self {
            SchemaRef::Type(id) | SchemaRef::GraphIndex(id) | SchemaRef::RelationIndex(id) => *id,
        }
    }
}

impl From<&SchemaElement> for SchemaRef {
    fn from(element: &SchemaElement) -> Self {
        SchemaRef::Type(element.id())
    }
}

impl From<&VertexLabel> for SchemaRef {
    fn from(label: &VertexLabel) -> Self {
        SchemaRef::Type(label.id())
    }
}

impl From<&EdgeLabel> for SchemaRef {
    fn from(label: &EdgeLabel) -> Self {
        SchemaRef::Type(label.id())
    }
}

impl From<&PropertyKey> for SchemaRef {
    fn from(key: &PropertyKey) -> Self {
        SchemaRef::Type(key.id())
    }
}

impl From<&RelationType> for SchemaRef {
    fn from(relation_type: &RelationType) -> Self {
        SchemaRef::Type(relation_type.id())
    }
}

impl From<&GraphIndex> for SchemaRef {
    fn from(index: &GraphIndex) -> Self {
        SchemaRef::GraphIndex(index.id())
    }
}

impl From<&RelationTypeIndex> for SchemaRef {
    fn from(index: &RelationTypeIndex) -> Self {
        SchemaRef::RelationIndex(index.id())
    }
}
