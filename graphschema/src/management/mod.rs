// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Management transactions, type makers and managed options
//!
//! Index creation and lifecycle operations live next to their managers in
//! `crate::index`; consistency and TTL settings in `crate::consistency`.

mod makers;
mod options;
mod transaction;

pub use makers::{EdgeLabelMaker, PropertyKeyMaker, VertexLabelMaker};
pub use transaction::{ManagementTransaction, TransactionState};
