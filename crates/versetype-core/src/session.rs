//! Per-connection session state.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use versetype_types::{Passage, ProgressRecord, RuntimeMetrics, StatsSnapshot};

/// Where a session is in the exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No collection selected.
    Idle,
    /// A passage is on screen, waiting for a submission.
    AwaitingInput,
    /// Every passage of the selected collection has been typed.
    Completed,
}

/// The collection a session is working through.
#[derive(Debug, Clone)]
pub struct Selection {
    pub collection: String,
    pub passages: Arc<[Passage]>,
    /// Working copy of the durable record.
    pub record: ProgressRecord,
    /// Passage on screen. Differs from `record.current_index` only after a jump.
    pub cursor: u32,
}

impl Selection {
    pub fn total(&self) -> u32 {
        self.passages.len() as u32
    }

    /// Whether submissions only replay already-reached passages.
    pub fn is_replaying(&self) -> bool {
        self.cursor != self.record.current_index
    }

    pub fn current_passage(&self) -> Option<&Passage> {
        self.passages.get(self.cursor as usize)
    }
}

/// Live binding of one connection to a user.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub selection: Option<Selection>,
    pub metrics: RuntimeMetrics,
    pub state: SessionState,
}

impl Session {
    pub fn new(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            selection: None,
            metrics: RuntimeMetrics::reset_at(now),
            state: SessionState::Idle,
        }
    }

    /// Progress and runtime metrics, if a collection is selected.
    pub fn stats(&self) -> Option<StatsSnapshot> {
        self.selection.as_ref().map(|selection| StatsSnapshot {
            progress: selection.record,
            runtime: self.metrics,
        })
    }
}
