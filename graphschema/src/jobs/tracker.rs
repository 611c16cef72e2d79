// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Backfill job bookkeeping

use chrono::{DateTime, Utc};
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::types::SchemaId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Running,
    Completed { elements: u64 },
    Failed { reason: String },
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed { .. } | JobState::Failed { .. })
    }
}

/// Latest known job of one index
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub index: SchemaId,
    /// Index generation the job was scheduled for
    pub generation: u64,
    pub state: JobState,
    pub updated_at: DateTime<Utc>,
}

/// Tracks the most recent backfill of every index
#[derive(Debug, Default)]
pub struct JobTracker {
    records: Mutex<HashMap<SchemaId, JobRecord>>,
    changed: Condvar,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a state change; updates from an older generation are dropped
    pub fn record(&self, index: SchemaId, generation: u64, state: JobState) {
        let mut records = self.records.lock();
        if let Some(existing) = records.get(&index) {
            if existing.generation > generation {
                return;
            }
        }
        records.insert(
            index,
            JobRecord {
                index,
                generation,
                state,
                updated_at: Utc::now(),
            },
        );
        self.changed.notify_all();
    }

    pub fn get(&self, index: SchemaId) -> Option<JobRecord> {
        self.records.lock().get(&index).cloned()
    }

    /// True once the backfill for exactly this generation has completed
    pub fn is_completed(&self, index: SchemaId, generation: u64) -> bool {
        self.records.lock().get(&index).map_or(false, |record| {
            record.generation == generation && matches!(record.state, JobState::Completed { .. })
        })
    }

    /// True when no job for `generation` is pending, running or done
    pub fn needs_redrive(&self, index: SchemaId, generation: u64) -> bool {
        match self.records.lock().get(&index) {
            None => true,
            Some(record) => {
                record.generation < generation || matches!(record.state, JobState::Failed { .. })
            }
        }
    }

    pub fn forget(&self, index: SchemaId) {
        self.records.lock().remove(&index);
        self.changed.notify_all();
    }

    /// Blocks until the job of `index` reaches a terminal state or `timeout`
    /// elapses; returns the last known record either way
    pub fn wait_for(&self, index: SchemaId, timeout: Duration) -> Option<JobRecord> {
        let deadline = Instant::now() + timeout;
        let mut records = self.records.lock();
        loop {
            if let Some(record) = records.get(&index) {
                if record.state.is_terminal() {
                    return Some(record.clone());
                }
            }
            if self.changed.wait_until(&mut records, deadline).timed_out() {
                return records.get(&index).cloned();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_stale_generation_is_ignored() {
        let tracker = JobTracker::new();
        let id = SchemaId::new(7);
        tracker.record(id, 2, JobState::Pending);
        tracker.record(id, 1, JobState::Completed { elements: 10 });

        let record = tracker.get(id).unwrap();
        assert_eq!(record.generation, 2);
        assert_eq!(record.state, JobState::Pending);
        assert!(!tracker.is_completed(id, 1));
        assert!(!tracker.is_completed(id, 2));
    }

    #[test]
    fn test_needs_redrive() {
        let tracker = JobTracker::new();
        let id = SchemaId::new(3);
        assert!(tracker.needs_redrive(id, 1));

        tracker.record(id, 1, JobState::Running);
        assert!(!tracker.needs_redrive(id, 1));
        assert!(tracker.needs_redrive(id, 2));

        tracker.record(
            id,
            1,
            JobState::Failed {
                reason: "disk full".to_string(),
            },
        );
        assert!(tracker.needs_redrive(id, 1));
    }

    #[test]
    fn test_wait_for_wakes_on_completion() {
        let tracker = Arc::new(JobTracker::new());
        let id = SchemaId::new(1);
        tracker.record(id, 1, JobState::Pending);

        let worker = {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                tracker.record(id, 1, JobState::Completed { elements: 4 });
            })
        };

        let record = tracker.wait_for(id, Duration::from_secs(5)).unwrap();
        assert_eq!(record.state, JobState::Completed { elements: 4 });
        worker.join().unwrap();
    }

    #[test]
    fn test_wait_for_times_out() {
        let tracker = JobTracker::new();
        let id = SchemaId::new(1);
        tracker.record(id, 1, JobState::Running);
        let record = tracker.wait_for(id, Duration::from_millis(10)).unwrap();
        assert_eq!(record.state, JobState::Running);
    }
}
