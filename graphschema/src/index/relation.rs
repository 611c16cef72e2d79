// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Vertex-centric indexes over the relations of one edge label or property key
//!
//! These indexes only reorder relation data a vertex already holds, so they
//! are authoritative as soon as their transaction commits.

use log::debug;
use std::collections::HashSet;

use crate::error::{SchemaError, SchemaResult};
use crate::management::ManagementTransaction;
use crate::registry::view::SchemaView;
use crate::types::{
    Cardinality, Direction, EdgeLabel, Order, PropertyKey, RelationType, RelationTypeIndex,
    SchemaId, TypeDefinition,
};

/// Checks a vertex-centric index definition against the visible schema and
/// returns the direction to store
fn validate_definition(
    view: &SchemaView<'_>,
    owner: &RelationType,
    name: &str,
    direction: Direction,
    sort_keys: &[RelationType],
) -> SchemaResult<Direction> {
    if view.type_by_id(owner.id()).is_none() {
        return Err(SchemaError::unknown(owner.element()));
    }
    if sort_keys.is_empty() {
        return Err(SchemaError::invalid_index(format!(
            "Index '{}' needs at least one sort key",
            name
        )));
    }

    let mut seen = HashSet::new();
    for key in sort_keys {
        let current = view
            .type_by_id(key.id())
            .ok_or_else(|| SchemaError::unknown(key.element()))?;
        if !seen.insert(key.id()) {
            return Err(SchemaError::invalid_index(format!(
                "Sort key '{}' appears more than once in index '{}'",
                current.name(),
                name
            )));
        }
        if key.id() == owner.id() {
            return Err(SchemaError::invalid_index(format!(
                "'{}' cannot be a sort key of its own index",
                current.name()
            )));
        }
        if let TypeDefinition::PropertyKey { cardinality, .. } = current.definition() {
            if *cardinality != Cardinality::Single {
                return Err(SchemaError::invalid_index(format!(
                    "Sort key '{}' must have SINGLE cardinality",
                    current.name()
                )));
            }
        }
    }

    if view.relation_index_by_name(owner.id(), name).is_some() {
        return Err(SchemaError::invalid_index(format!(
            "'{}' already has an index named '{}'",
            owner.name(),
            name
        )));
    }

    match owner {
        RelationType::Property(_) => Ok(Direction::Out),
        RelationType::Edge(label) => {
            if label.is_unidirected() && direction != Direction::Out {
                return Err(SchemaError::invalid_index(format!(
                    "Unidirected edge label '{}' only supports OUT indexes",
                    label.name()
                )));
            }
            Ok(direction)
        }
    }
}

impl ManagementTransaction {
    /// Create an ascending vertex-centric index on an edge label
    pub fn create_edge_index(
        &mut self,
        label: &EdgeLabel,
        name: &str,
        direction: Direction,
        sort_keys: &[RelationType],
    ) -> SchemaResult<RelationTypeIndex> {
        self.create_edge_index_with_order(label, name, direction, Order::Asc, sort_keys)
    }

    /// Create a vertex-centric index on an edge label with an explicit sort order
    pub fn create_edge_index_with_order(
        &mut self,
        label: &EdgeLabel,
        name: &str,
        direction: Direction,
        sort_order: Order,
        sort_keys: &[RelationType],
    ) -> SchemaResult<RelationTypeIndex> {
        self.create_relation_index(label.into(), name, direction, sort_order, sort_keys)
    }

    /// Create an ascending vertex-centric index on a property key
    pub fn create_property_index(
        &mut self,
        key: &PropertyKey,
        name: &str,
        sort_keys: &[RelationType],
    ) -> SchemaResult<RelationTypeIndex> {
        self.create_property_index_with_order(key, name, Order::Asc, sort_keys)
    }

    /// Create a vertex-centric index on a property key with an explicit sort order
    pub fn create_property_index_with_order(
        &mut self,
        key: &PropertyKey,
        name: &str,
        sort_order: Order,
        sort_keys: &[RelationType],
    ) -> SchemaResult<RelationTypeIndex> {
        self.create_relation_index(key.into(), name, Direction::Out, sort_order, sort_keys)
    }

    fn create_relation_index(
        &mut self,
        owner: RelationType,
        name: &str,
        direction: Direction,
        sort_order: Order,
        sort_keys: &[RelationType],
    ) -> SchemaResult<RelationTypeIndex> {
        self.ensure_open()?;
        self.check_name(name)?;
        let direction =
            self.read(|view| validate_definition(view, &owner, name, direction, sort_keys))?;

        let index = RelationTypeIndex {
            id: self.registry().allocate_id(),
            name: name.to_string(),
            owner: owner.id(),
            owner_kind: owner.kind(),
            direction,
            sort_order,
            sort_keys: sort_keys.iter().map(|key| key.id()).collect::<Vec<SchemaId>>(),
        };
        debug!(
            "Created vertex-centric index '{}' on '{}' ({} sort keys)",
            index.name(),
            owner.name(),
            index.sort_keys().len()
        );
        self.overlay.create_relation_index(index.clone());
        Ok(index)
    }

    pub fn contains_relation_index(
        &self,
        owner: impl Into<RelationType>,
        name: &str,
    ) -> SchemaResult<bool> {
        Ok(self.get_relation_index(owner, name)?.is_some())
    }

    pub fn get_relation_index(
        &self,
        owner: impl Into<RelationType>,
        name: &str,
    ) -> SchemaResult<Option<RelationTypeIndex>> {
        let owner = owner.into();
        self.read(|view| Ok(view.relation_index_by_name(owner.id(), name)))
    }

    /// All vertex-centric indexes of `owner` in creation order
    pub fn get_relation_indexes(
        &self,
        owner: impl Into<RelationType>,
    ) -> SchemaResult<impl Iterator<Item = RelationTypeIndex>> {
        let owner = owner.into();
        self.read(|view| Ok(view.relation_indexes(Some(owner.id())).into_iter()))
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::registry::SchemaRegistry;
    use crate::types::{Cardinality, DataType, Direction, Order, RelationType};

    #[test]
    fn test_edge_index_round_trip() {
        let registry = SchemaRegistry::in_memory().unwrap();
        let mut tx = registry.open_management();
        let time = tx
            .make_property_key("time")
            .unwrap()
            .data_type(DataType::Long)
            .make()
            .unwrap();
        let battled = tx.make_edge_label("battled").unwrap().make().unwrap();

        let index = tx
            .create_edge_index_with_order(
                &battled,
                "battles_by_time",
                Direction::Both,
                Order::Desc,
                &[RelationType::from(&time)],
            )
            .unwrap();
        assert!(tx.contains_relation_index(&battled, "battles_by_time").unwrap());
        tx.commit().unwrap();

        let tx = registry.open_management();
        let battled = tx.get_edge_label("battled").unwrap().unwrap();
        let found = tx
            .get_relation_index(&battled, "battles_by_time")
            .unwrap()
            .unwrap();
        assert_eq!(found, index);
        assert_eq!(found.direction(), Direction::Both);
        assert_eq!(found.sort_order(), Order::Desc);
        assert_eq!(found.sort_keys(), &[time.id()]);
        assert_eq!(tx.get_relation_indexes(&battled).unwrap().count(), 1);
    }

    #[test]
    fn test_sort_key_rules() {
        let registry = SchemaRegistry::in_memory().unwrap();
        let mut tx = registry.open_management();
        let time = tx.make_property_key("time").unwrap().make().unwrap();
        let tags = tx
            .make_property_key("tags")
            .unwrap()
            .cardinality(Cardinality::Set)
            .make()
            .unwrap();
        let knows = tx.make_edge_label("knows").unwrap().make().unwrap();
        let time_key = RelationType::from(&time);

        let cases = [
            tx.create_edge_index(&knows, "empty", Direction::Out, &[]),
            tx.create_edge_index(
                &knows,
                "twice",
                Direction::Out,
                &[time_key.clone(), time_key.clone()],
            ),
            tx.create_edge_index(&knows, "self", Direction::Out, &[RelationType::from(&knows)]),
            tx.create_edge_index(&knows, "multi", Direction::Out, &[RelationType::from(&tags)]),
        ];
        for result in cases {
            assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidIndexDefinition);
        }
    }

    #[test]
    fn test_name_unique_per_owner() {
        let registry = SchemaRegistry::in_memory().unwrap();
        let mut tx = registry.open_management();
        let time = RelationType::from(&tx.make_property_key("time").unwrap().make().unwrap());
        let knows = tx.make_edge_label("knows").unwrap().make().unwrap();
        let likes = tx.make_edge_label("likes").unwrap().make().unwrap();

        tx.create_edge_index(&knows, "by_time", Direction::Out, &[time.clone()])
            .unwrap();
        let err = tx
            .create_edge_index(&knows, "by_time", Direction::In, &[time.clone()])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidIndexDefinition);
        tx.create_edge_index(&likes, "by_time", Direction::Out, &[time])
            .unwrap();
    }

    #[test]
    fn test_unidirected_label_only_supports_out() {
        let registry = SchemaRegistry::in_memory().unwrap();
        let mut tx = registry.open_management();
        let time = RelationType::from(&tx.make_property_key("time").unwrap().make().unwrap());
        let follows = tx
            .make_edge_label("follows")
            .unwrap()
            .unidirected()
            .make()
            .unwrap();

        let err = tx
            .create_edge_index(&follows, "in_time", Direction::In, &[time.clone()])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidIndexDefinition);
        tx.create_edge_index(&follows, "out_time", Direction::Out, &[time])
            .unwrap();
    }

    #[test]
    fn test_property_index_ignores_direction() {
        let registry = SchemaRegistry::in_memory().unwrap();
        let mut tx = registry.open_management();
        let time = RelationType::from(&tx.make_property_key("time").unwrap().make().unwrap());
        let sensor = tx
            .make_property_key("reading")
            .unwrap()
            .cardinality(Cardinality::List)
            .make()
            .unwrap();

        let index = tx
            .create_property_index(&sensor, "readings_by_time", &[time])
            .unwrap();
        assert_eq!(index.direction(), Direction::Out);
        assert_eq!(index.sort_order(), Order::Asc);
    }
}
