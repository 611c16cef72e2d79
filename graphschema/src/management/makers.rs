// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Builders for new schema types

use super::ManagementTransaction;
use crate::error::SchemaResult;
use crate::types::{
    Cardinality, DataType, EdgeLabel, Multiplicity, PropertyKey, TypeDefinition, VertexLabel,
};

/// Builder returned by `make_property_key`
#[derive(Debug)]
pub struct PropertyKeyMaker<'a> {
    tx: &'a mut ManagementTransaction,
    name: String,
    data_type: DataType,
    cardinality: Cardinality,
}

impl<'a> PropertyKeyMaker<'a> {
    pub(crate) fn new(tx: &'a mut ManagementTransaction, name: &str) -> Self {
        Self {
            tx,
            name: name.to_string(),
            data_type: DataType::default(),
            cardinality: Cardinality::default(),
        }
    }

    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    pub fn make(self) -> SchemaResult<PropertyKey> {
        let element = self.tx.define(
            &self.name,
            TypeDefinition::PropertyKey {
                data_type: self.data_type,
                cardinality: self.cardinality,
            },
        )?;
        Ok(PropertyKey(element))
    }
}

/// Builder returned by `make_edge_label`
#[derive(Debug)]
pub struct EdgeLabelMaker<'a> {
    tx: &'a mut ManagementTransaction,
    name: String,
    multiplicity: Multiplicity,
    unidirected: bool,
}

impl<'a> EdgeLabelMaker<'a> {
    pub(crate) fn new(tx: &'a mut ManagementTransaction, name: &str) -> Self {
        Self {
            tx,
            name: name.to_string(),
            multiplicity: Multiplicity::default(),
            unidirected: false,
        }
    }

    pub fn multiplicity(mut self, multiplicity: Multiplicity) -> Self {
        self.multiplicity = multiplicity;
        self
    }

    pub fn directed(mut self) -> Self {
        self.unidirected = false;
        self
    }

    /// Edges are only stored and traversable from their out-vertex
    pub fn unidirected(mut self) -> Self {
        self.unidirected = true;
        self
    }

    pub fn make(self) -> SchemaResult<EdgeLabel> {
        let element = self.tx.define(
            &self.name,
            TypeDefinition::EdgeLabel {
                multiplicity: self.multiplicity,
                unidirected: self.unidirected,
            },
        )?;
        Ok(EdgeLabel(element))
    }
}

/// Builder returned by `make_vertex_label`
#[derive(Debug)]
pub struct VertexLabelMaker<'a> {
    tx: &'a mut ManagementTransaction,
    name: String,
    partitioned: bool,
    is_static: bool,
}

impl<'a> VertexLabelMaker<'a> {
    pub(crate) fn new(tx: &'a mut ManagementTransaction, name: &str) -> Self {
        Self {
            tx,
            name: name.to_string(),
            partitioned: false,
            is_static: false,
        }
    }

    pub fn partition(mut self) -> Self {
        self.partitioned = true;
        self
    }

    /// Vertices of a static label are immutable once their creating transaction commits
    pub fn set_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn make(self) -> SchemaResult<VertexLabel> {
        let element = self.tx.define(
            &self.name,
            TypeDefinition::VertexLabel {
                partitioned: self.partitioned,
                is_static: self.is_static,
            },
        )?;
        Ok(VertexLabel(element))
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::registry::SchemaRegistry;
    use crate::types::{Cardinality, DataType, Multiplicity};

    #[test]
    fn test_makers_apply_attributes() {
        let registry = SchemaRegistry::in_memory().unwrap();
        let mut tx = registry.open_management();

        let key = tx
            .make_property_key("tags")
            .unwrap()
            .data_type(DataType::String)
            .cardinality(Cardinality::Set)
            .make()
            .unwrap();
        assert_eq!(key.data_type(), DataType::String);
        assert_eq!(key.cardinality(), Cardinality::Set);

        let label = tx
            .make_edge_label("mother")
            .unwrap()
            .multiplicity(Multiplicity::Many2One)
            .unidirected()
            .make()
            .unwrap();
        assert_eq!(label.multiplicity(), Multiplicity::Many2One);
        assert!(label.is_unidirected());

        let vertex = tx
            .make_vertex_label("event")
            .unwrap()
            .set_static()
            .partition()
            .make()
            .unwrap();
        assert!(vertex.is_static());
        assert!(vertex.is_partitioned());
    }

    #[test]
    fn test_maker_rejects_invalid_names() {
        let registry = SchemaRegistry::in_memory().unwrap();
        let mut tx = registry.open_management();

        let err = tx.make_property_key("").unwrap().make().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);
        let err = tx.make_edge_label("~system").unwrap().make().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);
    }
}
