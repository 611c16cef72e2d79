// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Index definitions, lifecycle states and the small enums around them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::element::{SchemaId, SchemaKind};
use crate::error::SchemaError;

/// Direction of the edges covered by a vertex-centric index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Out,
    In,
    Both,
}

/// Sort order of a vertex-centric index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

/// The element category a graph index covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementCategory {
    Vertex,
    Edge,
    Property,
}

impl ElementCategory {
    /// Kind of schema type an `index_only` restriction must have
    pub fn restriction_kind(&self) -> SchemaKind {
        match self {
            ElementCategory::Vertex => SchemaKind::VertexLabel,
            ElementCategory::Edge => SchemaKind::EdgeLabel,
            ElementCategory::Property => SchemaKind::PropertyKey,
        }
    }
}

impl std::str::FromStr for ElementCategory {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vertex" => Ok(ElementCategory::Vertex),
            "edge" => Ok(ElementCategory::Edge),
            "property" => Ok(ElementCategory::Property),
            _ => Err(SchemaError::UnknownType(format!(
                "element category '{}'. Valid options: vertex, edge, property",
                s
            ))),
        }
    }
}

impl fmt::Display for ElementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementCategory::Vertex => "vertex",
            ElementCategory::Edge => "edge",
            ElementCategory::Property => "property",
        };
        write!(f, "{}", name)
    }
}

/// How a graph index is stored
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexBacking {
    /// Stored by the graph itself, fixed key set
    Composite,
    /// Delegated to an external search backend configured under this name
    Mixed { backend: String },
}

impl IndexBacking {
    pub fn is_composite(&self) -> bool {
        matches!(self, IndexBacking::Composite)
    }

    pub fn is_mixed(&self) -> bool {
        matches!(self, IndexBacking::Mixed { .. })
    }

    pub fn backend(&self) -> Option<&str> {
        match self {
            IndexBacking::Composite => None,
            IndexBacking::Mixed { backend } => Some(backend),
        }
    }
}

/// Lifecycle state of a graph index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexStatus {
    /// Defined and durable, not populated, invisible to queries and writers
    Installed,
    /// Writers maintain it, backfill pending or running, not used by queries
    Registered,
    /// Used by query planning
    Enabled,
    /// Neither queried nor maintained, data kept until removal
    Disabled,
}

impl IndexStatus {
    pub const ALL: [IndexStatus; 4] = [
        IndexStatus::Installed,
        IndexStatus::Registered,
        IndexStatus::Enabled,
        IndexStatus::Disabled,
    ];

    /// Whether writers must keep the index up to date
    pub fn is_maintained(&self) -> bool {
        matches!(self, IndexStatus::Registered | IndexStatus::Enabled)
    }

    /// Whether query planning may use the index
    pub fn is_queryable(&self) -> bool {
        matches!(self, IndexStatus::Enabled)
    }
}

impl fmt::Display for IndexStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndexStatus::Installed => "INSTALLED",
            IndexStatus::Registered => "REGISTERED",
            IndexStatus::Enabled => "ENABLED",
            IndexStatus::Disabled => "DISABLED",
        };
        write!(f, "{}", name)
    }
}

/// Actions that drive the index lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaAction {
    RegisterIndex,
    Reindex,
    EnableIndex,
    DisableIndex,
    RemoveIndex,
}

impl SchemaAction {
    pub const ALL: [SchemaAction; 5] = [
        SchemaAction::RegisterIndex,
        SchemaAction::Reindex,
        SchemaAction::EnableIndex,
        SchemaAction::DisableIndex,
        SchemaAction::RemoveIndex,
    ];

    /// Actions whose commit hands a backfill job to the executor
    pub fn triggers_backfill(&self) -> bool {
        matches!(self, SchemaAction::RegisterIndex | SchemaAction::Reindex)
    }
}

impl fmt::Display for SchemaAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchemaAction::RegisterIndex => "REGISTER_INDEX",
            SchemaAction::Reindex => "REINDEX",
            SchemaAction::EnableIndex => "ENABLE_INDEX",
            SchemaAction::DisableIndex => "DISABLE_INDEX",
            SchemaAction::RemoveIndex => "REMOVE_INDEX",
        };
        write!(f, "{}", name)
    }
}

/// Conflict-resolution policy for concurrent writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ConsistencyModifier {
    #[default]
    Default,
    Lock,
    Fork,
}

/// Time unit accepted by `set_ttl`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Converts `value` to whole seconds, dropping any sub-second remainder
    pub fn to_whole_seconds(&self, value: u64) -> u64 {
        match self {
            TimeUnit::Nanoseconds => value / 1_000_000_000,
            TimeUnit::Microseconds => value / 1_000_000,
            TimeUnit::Milliseconds => value / 1_000,
            TimeUnit::Seconds => value,
            TimeUnit::Minutes => value.saturating_mul(60),
            TimeUnit::Hours => value.saturating_mul(3_600),
            TimeUnit::Days => value.saturating_mul(86_400),
        }
    }
}

/// Value of a backend-specific index parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::Str(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        ParameterValue::Str(value)
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        ParameterValue::Int(value)
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Float(value)
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        ParameterValue::Bool(value)
    }
}

/// Key/value parameter attached to an indexed key, e.g. a text mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub key: String,
    pub value: ParameterValue,
}

impl Parameter {
    pub fn new(key: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One indexed property key and its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexField {
    pub key: SchemaId,
    pub parameters: Vec<Parameter>,
}

/// A graph-wide index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphIndex {
    pub(crate) id: SchemaId,
    pub(crate) name: String,
    pub(crate) category: ElementCategory,
    pub(crate) backing: IndexBacking,
    pub(crate) fields: Vec<IndexField>,
    pub(crate) restricted_to: Option<SchemaId>,
    pub(crate) unique: bool,
    pub(crate) status: IndexStatus,
    /// Bumped on every committed REGISTER_INDEX or REINDEX
    pub(crate) generation: u64,
    pub(crate) created_at: DateTime<Utc>,
}

impl GraphIndex {
    pub fn id(&self) -> SchemaId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn element_category(&self) -> ElementCategory {
        self.category
    }

    pub fn backing(&self) -> &IndexBacking {
        &self.backing
    }

    pub fn is_composite(&self) -> bool {
        self.backing.is_composite()
    }

    pub fn is_mixed(&self) -> bool {
        self.backing.is_mixed()
    }

    pub fn backing_index(&self) -> Option<&str> {
        self.backing.backend()
    }

    pub fn fields(&self) -> &[IndexField] {
        &self.fields
    }

    /// Indexed property keys in match order
    pub fn keys(&self) -> Vec<SchemaId> {
        self.fields.iter().map(|field| field.key).collect()
    }

    pub fn parameters_for(&self, key: SchemaId) -> Option<&[Parameter]> {
        self.fields
            .iter()
            .find(|field| field.key == key)
            .map(|field| field.parameters.as_slice())
    }

    pub fn restricted_to(&self) -> Option<SchemaId> {
        self.restricted_to
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn status(&self) -> IndexStatus {
        self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A vertex-centric index over the relations of one relation type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationTypeIndex {
    pub(crate) id: SchemaId,
    pub(crate) name: String,
    pub(crate) owner: SchemaId,
    pub(crate) owner_kind: SchemaKind,
    pub(crate) direction: Direction,
    pub(crate) sort_order: Order,
    pub(crate) sort_keys: Vec<SchemaId>,
}

impl RelationTypeIndex {
    pub fn id(&self) -> SchemaId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> SchemaId {
        self.owner
    }

    pub fn owner_kind(&self) -> SchemaKind {
        self.owner_kind
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn sort_order(&self) -> Order {
        self.sort_order
    }

    pub fn sort_keys(&self) -> &[SchemaId] {
        &self.sort_keys
    }

    /// Vertex-centric indexes are authoritative as soon as they are committed
    pub fn status(&self) -> IndexStatus {
        IndexStatus::Enabled
    }
}

/// Handle accepted by `update_index`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexRef {
    Graph(SchemaId),
    Relation(SchemaId),
}

impl From<&GraphIndex> for IndexRef {
    fn from(index: &GraphIndex) -> Self {
        IndexRef::Graph(index.id)
    }
}

impl From<&RelationTypeIndex> for IndexRef {
    fn from(index: &RelationTypeIndex) -> Self {
        IndexRef::Relation(index.id)
    }
}
