// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Per-element consistency modifiers and time-to-live settings

use log::debug;
use std::time::Duration;

use crate::error::{SchemaError, SchemaResult};
use crate::management::ManagementTransaction;
use crate::types::{ConsistencyModifier, SchemaId, SchemaRef, TimeUnit};

impl ManagementTransaction {
    /// Consistency modifier of a type or index, DEFAULT when unset
    pub fn get_consistency(&self, target: impl Into<SchemaRef>) -> SchemaResult<ConsistencyModifier> {
        let target = target.into();
        self.read(|view| {
            match target {
                SchemaRef::Type(id) => {
                    view.type_by_id(id).ok_or_else(|| SchemaError::unknown(id))?;
                }
                SchemaRef::GraphIndex(id) => {
                    view.graph_index(id)
                        .ok_or_else(|| SchemaError::unknown(format!("graph index {}", id)))?;
                }
                SchemaRef::RelationIndex(id) => {
                    view.relation_index(id).ok_or_else(|| {
                        SchemaError::unknown(format!("vertex-centric index {}", id))
                    })?;
                    return Ok(ConsistencyModifier::Default);
                }
            }
            Ok(view.consistency(target.id()))
        })
    }

    /// Set the consistency modifier of a relation type or composite graph index
    pub fn set_consistency(
        &mut self,
        target: impl Into<SchemaRef>,
        modifier: ConsistencyModifier,
    ) -> SchemaResult<()> {
        let target = target.into();
        let id = self.read(|view| match target {
            SchemaRef::Type(id) => {
                let element = view.type_by_id(id).ok_or_else(|| SchemaError::unknown(id))?;
                if !element.is_relation_type() {
                    return Err(SchemaError::violation(format!(
                        "Consistency can only be set on relation types, not on {}",
                        element
                    )));
                }
                Ok(id)
            }
            SchemaRef::GraphIndex(id) => {
                let index = view
                    .graph_index(id)
                    .ok_or_else(|| SchemaError::unknown(format!("graph index {}", id)))?;
                if !index.is_composite() {
                    return Err(SchemaError::violation(format!(
                        "Consistency can only be set on composite indexes, '{}' is mixed",
                        index.name()
                    )));
                }
                Ok(id)
            }
            SchemaRef::RelationIndex(id) => Err(SchemaError::violation(format!(
                "Consistency cannot be set on vertex-centric index {}",
                id
            ))),
        })?;

        debug!("Setting consistency of {} to {:?}", id, modifier);
        self.overlay.set_consistency(id, modifier);
        Ok(())
    }

    /// Time-to-live of a schema type, zero when unset
    pub fn get_ttl(&self, target: impl Into<SchemaRef>) -> SchemaResult<Duration> {
        self.ensure_open()?;
        let id = ttl_owner(target.into())?;
        self.read(|view| {
            view.type_by_id(id).ok_or_else(|| SchemaError::unknown(id))?;
            Ok(Duration::from_secs(view.ttl_seconds(id)))
        })
    }

    /// Set the time-to-live of a schema type; sub-second precision is dropped
    pub fn set_ttl(
        &mut self,
        target: impl Into<SchemaRef>,
        value: u64,
        unit: TimeUnit,
    ) -> SchemaResult<()> {
        self.ensure_open()?;
        let id = ttl_owner(target.into())?;
        let ttl_supported = self.config().ttl_supported;
        self.read(|view| {
            let element = view.type_by_id(id).ok_or_else(|| SchemaError::unknown(id))?;
            if !ttl_supported {
                return Err(SchemaError::violation(
                    "The storage backend does not support time-to-live",
                ));
            }
            if !element.supports_ttl() {
                return Err(SchemaError::violation(format!(
                    "{} does not support time-to-live",
                    element
                )));
            }
            Ok(())
        })?;

        let seconds = unit.to_whole_seconds(value);
        debug!("Setting time-to-live of {} to {}s", id, seconds);
        self.overlay.set_ttl(id, seconds);
        Ok(())
    }
}

fn ttl_owner(target: SchemaRef) -> SchemaResult<SchemaId> {
    match target {
        SchemaRef::Type(id) => Ok(id),
        other => Err(SchemaError::violation(format!(
            "Time-to-live applies to schema types only, not index {}",
            other.id()
        ))),
    }
}
