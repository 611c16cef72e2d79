// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Schema element definitions: vertex labels, edge labels and property keys

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Opaque, stable identifier of a schema element or index
///
/// Ids are allocated once and survive renames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaId(u64);

impl SchemaId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of a schema type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaKind {
    VertexLabel,
    EdgeLabel,
    PropertyKey,
}

impl SchemaKind {
    /// Edge labels and property keys are relation types
    pub fn is_relation_type(&self) -> bool {
        matches!(self, SchemaKind::EdgeLabel | SchemaKind::PropertyKey)
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchemaKind::VertexLabel => "vertex label",
            SchemaKind::EdgeLabel => "edge label",
            SchemaKind::PropertyKey => "property key",
        };
        write!(f, "{}", name)
    }
}

/// Data type of the values a property key holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DataType {
    String,
    Character,
    Boolean,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    Date,
    Uuid,
    Geoshape,
    #[default]
    Object,
}

/// How many values of a property key a single vertex may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Cardinality {
    #[default]
    Single,
    List,
    Set,
}

/// Multiplicity constraint of an edge label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Multiplicity {
    /// Any number of parallel edges
    #[default]
    Multi,
    /// At most one edge of this label between a pair of vertices
    Simple,
    /// At most one outgoing edge per vertex
    Many2One,
    /// At most one incoming edge per vertex
    One2Many,
    /// At most one outgoing and one incoming edge per vertex
    One2One,
}

/// Kind-specific attributes of a schema type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeDefinition {
    VertexLabel {
        partitioned: bool,
        is_static: bool,
    },
    EdgeLabel {
        multiplicity: Multiplicity,
        unidirected: bool,
    },
    PropertyKey {
        data_type: DataType,
        cardinality: Cardinality,
    },
}

impl TypeDefinition {
    pub fn kind(&self) -> SchemaKind {
        match self {
            TypeDefinition::VertexLabel { .. } => SchemaKind::VertexLabel,
            TypeDefinition::EdgeLabel { .. } => SchemaKind::EdgeLabel,
            TypeDefinition::PropertyKey { .. } => SchemaKind::PropertyKey,
        }
    }
}

/// A named schema type as stored in the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaElement {
    id: SchemaId,
    name: String,
    definition: TypeDefinition,
}

impl SchemaElement {
    pub(crate) fn new(id: SchemaId, name: String, definition: TypeDefinition) -> Self {
        Self {
            id,
            name,
            definition,
        }
    }

    pub fn id(&self) -> SchemaId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SchemaKind {
        self.definition.kind()
    }

    pub fn definition(&self) -> &TypeDefinition {
        &self.definition
    }

    pub fn is_relation_type(&self) -> bool {
        self.kind().is_relation_type()
    }

    /// Whether a time-to-live may be attached to this type.
    ///
    /// Relation types always qualify; vertex labels only when static.
    pub fn supports_ttl(&self) -> bool {
        match &self.definition {
            TypeDefinition::VertexLabel { is_static, .. } => *is_static,
            TypeDefinition::EdgeLabel { .. } | TypeDefinition::PropertyKey { .. } => true,
        }
    }

    pub(crate) fn renamed(&self, name: &str) -> Self {
        Self {
            id: self.id,
            name: name.to_string(),
            definition: self.definition.clone(),
        }
    }
}

impl fmt::Display for SchemaElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind(), self.name)
    }
}

/// Typed handles over [`SchemaElement`] for a single kind
macro_rules! typed_element {
    ($(#[$meta:meta])* $name:ident, $kind:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name(pub(crate) SchemaElement);

        impl $name {
            /// Wraps the element if it has the matching kind
            pub fn from_element(element: SchemaElement) -> Option<Self> {
                if element.kind() == $kind {
                    Some(Self(element))
                } else {
                    None
                }
            }

            pub fn element(&self) -> &SchemaElement {
                &self.0
            }

            pub fn into_element(self) -> SchemaElement {
                self.0
            }
        }

        impl Deref for $name {
            type Target = SchemaElement;

            fn deref(&self) -> &SchemaElement {
                &self.0
            }
        }

        impl From<$name> for SchemaElement {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

typed_element!(
    /// A vertex label
    VertexLabel,
    SchemaKind::VertexLabel
);
typed_element!(
    /// An edge label
    EdgeLabel,
    SchemaKind::EdgeLabel
);
typed_element!(
    /// A property key
    PropertyKey,
    SchemaKind::PropertyKey
);

impl VertexLabel {
    pub fn is_partitioned(&self) -> bool {
        matches!(
            self.definition(),
            TypeDefinition::VertexLabel {
                partitioned: true,
                ..
            }
        )
    }

    pub fn is_static(&self) -> bool {
        matches!(
            self.definition(),
            TypeDefinition::VertexLabel {
                is_static: true,
                ..
            }
        )
    }
}

impl EdgeLabel {
    pub fn multiplicity(&self) -> Multiplicity {
        match self.definition() {
            TypeDefinition::EdgeLabel { multiplicity, .. } => *multiplicity,
            _ => Multiplicity::default(),
        }
    }

    pub fn is_unidirected(&self) -> bool {
        matches!(
            self.definition(),
            TypeDefinition::EdgeLabel {
                unidirected: true,
                ..
            }
        )
    }

    pub fn is_directed(&self) -> bool {
        !self.is_unidirected()
    }
}

impl PropertyKey {
    pub fn data_type(&self) -> DataType {
        match self.definition() {
            TypeDefinition::PropertyKey { data_type, .. } => *data_type,
            _ => DataType::default(),
        }
    }

    pub fn cardinality(&self) -> Cardinality {
        match self.definition() {
            TypeDefinition::PropertyKey { cardinality, .. } => *cardinality,
            _ => Cardinality::default(),
        }
    }
}

/// An edge label or a property key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationType {
    Edge(EdgeLabel),
    Property(PropertyKey),
}

impl RelationType {
    pub fn from_element(element: SchemaElement) -> Option<Self> {
        match element.kind() {
            SchemaKind::EdgeLabel => EdgeLabel::from_element(element).map(RelationType::Edge),
            SchemaKind::PropertyKey => {
                PropertyKey::from_element(element).map(RelationType::Property)
            }
            SchemaKind::VertexLabel => None,
        }
    }

    pub fn element(&self) -> &SchemaElement {
        match self {
            RelationType::Edge(label) => label.element(),
            RelationType::Property(key) => key.element(),
        }
    }

    pub fn is_edge_label(&self) -> bool {
        matches!(self, RelationType::Edge(_))
    }

    pub fn is_property_key(&self) -> bool {
        matches!(self, RelationType::Property(_))
    }

    pub fn as_edge_label(&self) -> Option<&EdgeLabel> {
        match self {
            RelationType::Edge(label) => Some(label),
            RelationType::Property(_) => None,
        }
    }

    pub fn as_property_key(&self) -> Option<&PropertyKey> {
        match self {
            RelationType::Property(key) => Some(key),
            RelationType::Edge(_) => None,
        }
    }
}

impl Deref for RelationType {
    type Target = SchemaElement;

    fn deref(&self) -> &SchemaElement {
        self.element()
    }
}

impl From<EdgeLabel> for RelationType {
    fn from(label: EdgeLabel) -> Self {
        RelationType::Edge(label)
    }
}

impl From<PropertyKey> for RelationType {
    fn from(key: PropertyKey) -> Self {
        RelationType::Property(key)
    }
}

impl From<&EdgeLabel> for RelationType {
    fn from(label: &EdgeLabel) -> Self {
        RelationType::Edge(label.clone())
    }
}

impl From<&PropertyKey> for RelationType {
    fn from(key: &PropertyKey) -> Self {
        RelationType::Property(key.clone())
    }
}

impl From<&RelationType> for RelationType {
    fn from(relation_type: &RelationType) -> Self {
        relation_type.clone()
    }
}

/// Filter for [`crate::ManagementTransaction::get_relation_types`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationTypeFilter {
    All,
    EdgeLabels,
    PropertyKeys,
}

impl RelationTypeFilter {
    pub fn matches(&self, kind: SchemaKind) -> bool {
        match self {
            RelationTypeFilter::All => kind.is_relation_type(),
            RelationTypeFilter::EdgeLabels => kind == SchemaKind::EdgeLabel,
            RelationTypeFilter::PropertyKeys => kind == SchemaKind::PropertyKey,
        }
    }
}
