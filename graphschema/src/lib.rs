// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! GraphSchema - transactional schema and index management for property graphs
//!
//! This crate provides:
//! - A versioned registry of vertex labels, edge labels and property keys
//! - Vertex-centric indexes and graph-wide composite and mixed indexes
//! - The INSTALLED / REGISTERED / ENABLED / DISABLED index lifecycle with
//!   asynchronous backfill
//! - Consistency modifiers and time-to-live settings
//! - Management transactions with snapshot reads and optimistic commits
//!
//! ```text
//! let registry = SchemaRegistry::in_memory()?;
//! let mut tx = registry.open_management();
//! let name = tx.make_property_key("name")?.data_type(DataType::String).make()?;
//! tx.build_index("by_name", ElementCategory::Vertex)?
//!     .index_key(&name)?
//!     .unique()
//!     .build_composite_index()?;
//! tx.commit()?;
//! ```

pub mod config;
pub mod consistency;
pub mod error;
pub mod index;
pub mod jobs;
pub mod management;
mod names;
pub mod registry;
pub mod storage;
pub mod types;

pub use config::ManagementConfig;
pub use error::{ErrorKind, SchemaError, SchemaResult};
pub use index::IndexBuilder;
pub use jobs::{IndexDescriptor, IndexMaintainer, JobRecord, JobState, NoopIndexMaintainer};
pub use management::{
    EdgeLabelMaker, ManagementTransaction, PropertyKeyMaker, TransactionState, VertexLabelMaker,
};
pub use names::SYSTEM_PREFIX;
pub use registry::{CommitSummary, SchemaRegistry, SchemaSnapshot, SchemaTypes};
pub use storage::{MemorySchemaStore, SchemaStore, StorageType};
#[cfg(feature = "sled-backend")]
pub use storage::SledSchemaStore;
pub use types::{
    Cardinality, ConsistencyModifier, DataType, Direction, EdgeLabel, ElementCategory, GraphIndex,
    IndexBacking, IndexField, IndexRef, IndexStatus, Multiplicity, Order, Parameter,
    ParameterValue, PropertyKey, RelationType, RelationTypeFilter, RelationTypeIndex,
    SchemaAction, SchemaElement, SchemaId, SchemaKind, SchemaRef, TimeUnit, TypeDefinition,
    VertexLabel,
};
