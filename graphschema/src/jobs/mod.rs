// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Asynchronous index maintenance
//!
//! This module provides:
//! - The `IndexMaintainer` trait implemented by the host storage layer
//! - A background coordinator that runs backfills and releases off the commit path
//! - A job tracker recording per-index backfill progress
//!
//! Jobs are only scheduled after a commit has been published, so a schema
//! change never waits on data movement.

mod coordinator;
mod tracker;

use async_trait::async_trait;

use crate::types::{GraphIndex, RelationTypeIndex, SchemaId};

pub use coordinator::BackfillCoordinator;
pub use tracker::{JobRecord, JobState, JobTracker};

/// Index handed to the maintainer
#[derive(Debug, Clone, PartialEq)]
pub enum IndexDescriptor {
    Graph(GraphIndex),
    Relation(RelationTypeIndex),
}

impl IndexDescriptor {
    pub fn id(&self) -> SchemaId {
        match self {
            IndexDescriptor::Graph(index) => index.id(),
            IndexDescriptor::Relation(index) => index.id(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            IndexDescriptor::Graph(index) => index.name(),
            IndexDescriptor::Relation(index) => index.name(),
        }
    }
}

/// Host hook that moves index data
#[async_trait]
pub trait IndexMaintainer: Send + Sync {
    /// Populates the index from existing graph data; returns the number of
    /// elements indexed
    async fn backfill(&self, index: &IndexDescriptor) -> Result<u64, String>;

    /// Drops all stored entries of a removed index
    async fn release(&self, index: &IndexDescriptor) -> Result<(), String>;
}

/// Maintainer for hosts without stored graph data; every backfill completes immediately
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopIndexMaintainer;

#[async_trait]
impl IndexMaintainer for NoopIndexMaintainer {
    async fn backfill(&self, _index: &IndexDescriptor) -> Result<u64, String> {
        Ok(0)
    }

    async fn release(&self, _index: &IndexDescriptor) -> Result<(), String> {
        Ok(())
    }
}
