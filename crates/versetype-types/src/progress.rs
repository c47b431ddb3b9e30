//! Durable progress and ephemeral typing metrics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable per-user, per-collection advancement state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// Next passage to attempt (0-based). Equal to `total_count` once completed.
    pub current_index: u32,
    /// Number of passages in the collection.
    pub total_count: u32,
    /// Correct submissions.
    pub correct: u32,
    /// Incorrect submissions.
    pub mistakes: u32,
}

impl ProgressRecord {
    /// A fresh record positioned at the first passage.
    pub fn new(total_count: u32) -> Self {
        Self {
            current_index: 0,
            total_count,
            correct: 0,
            mistakes: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.current_index >= self.total_count
    }

    /// Integer completion percentage, 0 for an empty collection.
    pub fn percent_complete(&self) -> u32 {
        if self.total_count == 0 {
            return 0;
        }
        (u64::from(self.current_index) * 100 / u64::from(self.total_count)) as u32
    }

    /// Combine with another view of the same record without moving any
    /// counter backwards. The total count is taken from `newer`, and the
    /// index never exceeds it.
    pub fn merge_monotonic(&self, newer: &ProgressRecord) -> ProgressRecord {
        ProgressRecord {
            current_index: self
                .current_index
                .max(newer.current_index)
                .min(newer.total_count),
            total_count: newer.total_count,
            correct: self.correct.max(newer.correct),
            mistakes: self.mistakes.max(newer.mistakes),
        }
    }
}

/// Per-connection timing and typing counters. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeMetrics {
    /// Timing anchor for words-per-minute.
    pub start_time: DateTime<Utc>,
    /// Set once the first non-empty submission arrives.
    pub started: bool,
    pub chars_typed: u64,
    pub correct_chars: u64,
    pub wpm: u32,
}

impl RuntimeMetrics {
    /// Zeroed metrics anchored at `now`.
    pub fn reset_at(now: DateTime<Utc>) -> Self {
        Self {
            start_time: now,
            started: false,
            chars_typed: 0,
            correct_chars: 0,
            wpm: 0,
        }
    }
}

/// Progress and runtime metrics reported together, kept as two structs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub progress: ProgressRecord,
    pub runtime: RuntimeMetrics,
}

/// Completion of a single collection, for the collection picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookProgress {
    pub name: String,
    pub percent: u32,
}
