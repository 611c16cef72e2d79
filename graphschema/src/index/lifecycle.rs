// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Graph index lifecycle state machine
//!
//! ```text
//! INSTALLED --REGISTER--> REGISTERED --ENABLE--> ENABLED
//!                             |                    |
//!                             +------DISABLE-------+--> DISABLED --REMOVE--> (removed)
//! ENABLED | DISABLED --REINDEX--> REGISTERED
//! ```
//!
//! An action aimed at the state an index is already in is a no-op, so a
//! crashed backfill can be retried by re-driving the same action.

use log::{debug, info};

use crate::error::{SchemaError, SchemaResult};
use crate::management::ManagementTransaction;
use crate::types::{GraphIndex, IndexRef, IndexStatus, SchemaAction, SchemaId};

/// Outcome of applying an action to an index in a given state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Move to the given state
    Apply(IndexStatus),
    /// Drop the index and release its storage
    Remove,
    /// Already in the target state
    NoOp,
}

/// Resolves `action` against `status`; `None` when the transition is illegal
pub fn transition(status: IndexStatus, action: SchemaAction) -> Option<Transition> {
    use IndexStatus::*;
    use SchemaAction::*;

    match (status, action) {
        (Installed, RegisterIndex) => Some(Transition::Apply(Registered)),
        (Registered, RegisterIndex) | (Registered, Reindex) => Some(Transition::NoOp),

        (Registered, EnableIndex) => Some(Transition::Apply(Enabled)),
        (Enabled, EnableIndex) => Some(Transition::NoOp),

        (Registered, DisableIndex) | (Enabled, DisableIndex) => Some(Transition::Apply(Disabled)),
        (Disabled, DisableIndex) => Some(Transition::NoOp),

        (Enabled, Reindex) | (Disabled, Reindex) => Some(Transition::Apply(Registered)),

        (Disabled, RemoveIndex) => Some(Transition::Remove),

        _ => None,
    }
}

impl ManagementTransaction {
    /// Apply a lifecycle action to a graph index or a vertex-centric index
    pub fn update_index(&mut self, index: impl Into<IndexRef>, action: SchemaAction) -> SchemaResult<()> {
        match index.into() {
            IndexRef::Graph(id) => self.update_graph_index(id, action),
            IndexRef::Relation(id) => self.update_relation_index(id, action),
        }
    }

    fn update_graph_index(&mut self, id: SchemaId, action: SchemaAction) -> SchemaResult<()> {
        let Some(current) = self.read(|view| Ok(view.graph_index(id)))? else {
            if action == SchemaAction::RemoveIndex {
                debug!("{} on index {} that is already removed", action, id);
                return Ok(());
            }
            return Err(SchemaError::unknown(format!("graph index {}", id)));
        };

        match transition(current.status(), action) {
            None => Err(SchemaError::IndexState(format!(
                "Index '{}' is {} and cannot apply {}",
                current.name(),
                current.status(),
                action
            ))),
            Some(Transition::NoOp) => {
                debug!(
                    "{} on index '{}' already in {}",
                    action,
                    current.name(),
                    current.status()
                );
                self.overlay.keep_graph_index(&current, action);
                Ok(())
            }
            Some(Transition::Apply(IndexStatus::Enabled)) => {
                if !self
                    .registry()
                    .backfill_completed(current.id(), current.generation())
                {
                    return Err(SchemaError::IndexState(format!(
                        "Index '{}' cannot be enabled before its backfill completes",
                        current.name()
                    )));
                }
                self.apply_status(current, action, IndexStatus::Enabled);
                Ok(())
            }
            Some(Transition::Apply(status)) => {
                self.apply_status(current, action, status);
                Ok(())
            }
            Some(Transition::Remove) => {
                info!("Removing index '{}'", current.name());
                self.overlay.remove_graph_index(&current);
                Ok(())
            }
        }
    }

    fn apply_status(&mut self, current: GraphIndex, action: SchemaAction, status: IndexStatus) {
        info!(
            "Index '{}' {} -> {} ({})",
            current.name, current.status, status, action
        );
        let generation = if status == IndexStatus::Registered {
            current.generation + 1
        } else {
            current.generation
        };
        self.overlay
            .update_graph_index(&current, action, status, generation);
    }

    fn update_relation_index(&mut self, id: SchemaId, action: SchemaAction) -> SchemaResult<()> {
        let index = self.read(|view| {
            view.relation_index(id)
                .ok_or_else(|| SchemaError::unknown(format!("vertex-centric index {}", id)))
        })?;

        match action {
            SchemaAction::EnableIndex => {
                debug!("Vertex-centric index '{}' is always ENABLED", index.name());
                Ok(())
            }
            SchemaAction::Reindex => {
                info!("Rebuilding vertex-centric index '{}'", index.name());
                self.overlay.rebuild_relation_index(id);
                Ok(())
            }
            _ => Err(SchemaError::IndexState(format!(
                "Vertex-centric index '{}' is always ENABLED and cannot apply {}",
                index.name(),
                action
            ))),
        }
    }
}
