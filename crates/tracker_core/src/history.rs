use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::JobStatusSnapshot;

pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressHistoryPoint {
    pub timestamp: DateTime<Utc>,
    pub progress: u8,
    pub processed_count: u64,
}

/// Bounded, de-duplicated series of progress observations for one job.
///
/// Oldest points are evicted first once `capacity` is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressHistory {
    points: VecDeque<ProgressHistoryPoint>,
    capacity: usize,
}

impl Default for ProgressHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl ProgressHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a point for `snapshot` unless its progress equals the last
    /// recorded progress. Returns whether a point was appended.
    pub fn record(&mut self, now: DateTime<Utc>, snapshot: &JobStatusSnapshot) -> bool {
        let progress = snapshot.progress();
        if self.last().is_some_and(|last| last.progress == progress) {
            return false;
        }

        self.points.push_back(ProgressHistoryPoint {
            timestamp: now,
            progress,
            processed_count: snapshot.processed_count,
        });
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
        true
    }

    pub fn last(&self) -> Option<&ProgressHistoryPoint> {
        self.points.back()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &ProgressHistoryPoint> {
        self.points.iter()
    }

    pub fn to_vec(&self) -> Vec<ProgressHistoryPoint> {
        self.points.iter().copied().collect()
    }

    /// Processed items per second between the oldest and newest retained
    /// points. The server may report non-monotonic counts, so the result can
    /// be negative.
    pub fn throughput_per_second(&self) -> Option<f64> {
        let first = self.points.front()?;
        let last = self.points.back()?;
        let elapsed_ms = (last.timestamp - first.timestamp).num_milliseconds();
        if elapsed_ms <= 0 {
            return None;
        }
        let delta = last.processed_count as f64 - first.processed_count as f64;
        Some(delta * 1000.0 / elapsed_ms as f64)
    }
}
