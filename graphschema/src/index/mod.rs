// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Index management
//!
//! This module provides:
//! - Vertex-centric indexes attached to a relation type
//! - Graph-wide composite and mixed indexes and their builder
//! - The graph index lifecycle state machine and `update_index`

pub mod graph;
pub mod lifecycle;
pub mod relation;

pub use graph::IndexBuilder;
pub use lifecycle::{transition, Transition};
