// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Index maintainers with controllable backfill outcomes

use async_trait::async_trait;
use graphschema::{IndexDescriptor, IndexMaintainer};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Holds every backfill until `open` is called
#[derive(Debug, Default)]
pub struct GatedMaintainer {
    open: AtomicBool,
    released: AtomicUsize,
}

impl GatedMaintainer {
    pub fn open(&self) {
        self.open.store(true, Ordering::SeqCst);
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IndexMaintainer for GatedMaintainer {
    async fn backfill(&self, _index: &IndexDescriptor) -> Result<u64, String> {
        while !self.open.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        Ok(42)
    }

    async fn release(&self, _index: &IndexDescriptor) -> Result<(), String> {
        self.released.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Fails the first `failures` backfills, then succeeds
#[derive(Debug)]
pub struct FlakyMaintainer {
    failures: usize,
    attempts: AtomicUsize,
}

impl FlakyMaintainer {
    pub fn failing(failures: usize) -> Self {
        Self {
            failures,
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IndexMaintainer for FlakyMaintainer {
    async fn backfill(&self, index: &IndexDescriptor) -> Result<u64, String> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            return Err(format!("scan of '{}' interrupted", index.name()));
        }
        Ok(7)
    }

    async fn release(&self, _index: &IndexDescriptor) -> Result<(), String> {
        Ok(())
    }
}
