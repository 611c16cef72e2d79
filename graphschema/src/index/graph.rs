// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Graph-wide composite and mixed indexes
//!
//! This module provides:
//! - `IndexBuilder`, a single-use accumulator consumed by its finalizers
//! - Graph index lookups scoped to a management transaction
//! - Key addition for mixed indexes
//!
//! New indexes start INSTALLED; see `lifecycle` for the transitions.

use chrono::Utc;
use log::{debug, info};

use crate::error::{SchemaError, SchemaResult};
use crate::management::ManagementTransaction;
use crate::types::{
    ElementCategory, GraphIndex, IndexBacking, IndexField, IndexStatus, Parameter, PropertyKey,
    SchemaElement, SchemaId,
};

/// Accumulates the definition of one graph index
pub struct IndexBuilder<'a> {
    tx: &'a mut ManagementTransaction,
    name: String,
    category: ElementCategory,
    fields: Vec<IndexField>,
    restriction: Option<SchemaId>,
    unique: bool,
}

impl<'a> IndexBuilder<'a> {
    /// Append a key; key order is preserved
    pub fn index_key(self, key: &PropertyKey) -> SchemaResult<Self> {
        self.index_key_with(key, Vec::new())
    }

    /// Append a key with backend parameters
    pub fn index_key_with(mut self, key: &PropertyKey, parameters: Vec<Parameter>) -> SchemaResult<Self> {
        let visible = self.tx.read(|view| Ok(view.type_by_id(key.id())))?;
        if visible.is_none() {
            return Err(SchemaError::unknown(key.element()));
        }
        if self.fields.iter().any(|field| field.key == key.id()) {
            return Err(SchemaError::invalid_index(format!(
                "Key '{}' is already part of index '{}'",
                key.name(),
                self.name
            )));
        }
        self.fields.push(IndexField {
            key: key.id(),
            parameters,
        });
        Ok(self)
    }

    /// Only index elements that have, or are, `schema_type`
    pub fn index_only(mut self, schema_type: &SchemaElement) -> SchemaResult<Self> {
        if self.restriction.is_some() {
            return Err(SchemaError::invalid_index(format!(
                "Index '{}' already has a type restriction",
                self.name
            )));
        }
        let visible = self.tx.read(|view| Ok(view.type_by_id(schema_type.id())))?;
        let Some(schema_type) = visible else {
            return Err(SchemaError::unknown(schema_type));
        };
        if schema_type.kind() != self.category.restriction_kind() {
            return Err(SchemaError::invalid_index(format!(
                "{} index '{}' cannot be restricted to {}",
                self.category, self.name, schema_type
            )));
        }
        self.restriction = Some(schema_type.id());
        Ok(self)
    }

    /// Mark the index unique; only valid for composite vertex indexes
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Seal the key list and create a composite index
    pub fn build_composite_index(self) -> SchemaResult<GraphIndex> {
        if self.unique && self.category != ElementCategory::Vertex {
            return Err(SchemaError::invalid_index(format!(
                "Unique index '{}' must index vertices, not {}",
                self.name, self.category
            )));
        }
        self.install(IndexBacking::Composite)
    }

    /// Create an index maintained by the named mixed backend
    pub fn build_mixed_index(self, backend: &str) -> SchemaResult<GraphIndex> {
        if self.unique {
            return Err(SchemaError::invalid_index(format!(
                "Mixed index '{}' cannot enforce uniqueness",
                self.name
            )));
        }
        if !self.tx.config().accepts_backend(backend) {
            return Err(SchemaError::invalid_index(format!(
                "Unknown mixed index backend '{}'",
                backend
            )));
        }
        self.install(IndexBacking::Mixed {
            backend: backend.to_string(),
        })
    }

    fn install(self, backing: IndexBacking) -> SchemaResult<GraphIndex> {
        self.tx.ensure_open()?;
        if self.fields.is_empty() {
            return Err(SchemaError::invalid_index(format!(
                "Index '{}' needs at least one key",
                self.name
            )));
        }
        if self.tx.read(|view| Ok(view.name_taken(&self.name)))? {
            return Err(SchemaError::DuplicateName(self.name));
        }

        let index = GraphIndex {
            id: self.tx.registry().allocate_id(),
            name: self.name,
            category: self.category,
            backing,
            fields: self.fields,
            restricted_to: self.restriction,
            unique: self.unique,
            status: IndexStatus::Installed,
            generation: 0,
            created_at: Utc::now(),
        };
        info!(
            "Installed {} {} index '{}' with {} keys",
            if index.is_composite() { "composite" } else { "mixed" },
            index.element_category(),
            index.name(),
            index.fields().len()
        );
        self.tx.overlay.create_graph_index(index.clone());
        Ok(index)
    }
}

impl ManagementTransaction {
    /// Start building a graph index named `name` over elements of `category`
    pub fn build_index(&mut self, name: &str, category: ElementCategory) -> SchemaResult<IndexBuilder<'_>> {
        self.ensure_open()?;
        self.check_name(name)?;
        Ok(IndexBuilder {
            tx: self,
            name: name.to_string(),
            category,
            fields: Vec::new(),
            restriction: None,
            unique: false,
        })
    }

    pub fn contains_graph_index(&self, name: &str) -> SchemaResult<bool> {
        Ok(self.get_graph_index(name)?.is_some())
    }

    pub fn get_graph_index(&self, name: &str) -> SchemaResult<Option<GraphIndex>> {
        self.read(|view| Ok(view.graph_index_by_name(name)))
    }

    /// Graph indexes over one element category in creation order
    pub fn get_graph_indexes(
        &self,
        category: ElementCategory,
    ) -> SchemaResult<impl Iterator<Item = GraphIndex>> {
        self.read(|view| Ok(view.graph_indexes(category).into_iter()))
    }

    /// Append a key to a mixed index; composite indexes are sealed
    pub fn add_index_key(
        &mut self,
        index: &GraphIndex,
        key: &PropertyKey,
        parameters: Vec<Parameter>,
    ) -> SchemaResult<()> {
        let current = self.read(|view| {
            let current = view
                .graph_index(index.id())
                .ok_or_else(|| SchemaError::unknown(format!("graph index '{}'", index.name())))?;
            if view.type_by_id(key.id()).is_none() {
                return Err(SchemaError::unknown(key.element()));
            }
            Ok(current)
        })?;

        if !current.is_mixed() {
            return Err(SchemaError::violation(format!(
                "Composite index '{}' has a sealed key set",
                current.name()
            )));
        }
        if current.fields().iter().any(|field| field.key == key.id()) {
            return Err(SchemaError::violation(format!(
                "Key '{}' is already part of index '{}'",
                key.name(),
                current.name()
            )));
        }

        debug!("Adding key '{}' to mixed index '{}'", key.name(), current.name());
        self.overlay.add_index_key(
            current.id(),
            IndexField {
                key: key.id(),
                parameters,
            },
        );
        Ok(())
    }
}
