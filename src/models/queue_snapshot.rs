//! The reconciled, renderable state of one institution's queue.

use std::time::Instant;

use super::queue_entry::{QueueEntry, QueueStatus};

/// Which source of truth produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    /// Pull-based `GET /queue` fetch.
    Rest,
    /// Push event carrying a full list.
    Push,
}

/// A point-in-time view of a queue: at most one entry being served plus the
/// waiting sequence.
///
/// Invariant: the served entry never appears in the waiting sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueSnapshot {
    /// The entry currently being served, if any.
    pub serving: Option<QueueEntry>,
    /// Entries still waiting, in display order.
    pub waiting: Vec<QueueEntry>,
    /// Which source produced this snapshot.
    pub source: SnapshotSource,
    /// When this snapshot was produced (client clock).
    pub received_at: Instant,
}

impl QueueSnapshot {
    /// Build a snapshot from a full server-ordered list.
    ///
    /// The served entry is the first whose status normalizes to
    /// `in-progress`; the waiting sequence is every `waiting` entry, kept in
    /// server order except that purely numeric display numbers sort
    /// ascending (non-numeric numbers compare equal, so the stable sort
    /// leaves them where the server put them). Completed/cancelled/missed
    /// entries are not rendered.
    pub fn from_entries(entries: Vec<QueueEntry>, source: SnapshotSource) -> Self {
        let mut serving = None;
        let mut waiting = Vec::new();

        for entry in entries {
            match entry.status {
                QueueStatus::InProgress if serving.is_none() => serving = Some(entry),
                QueueStatus::Waiting => waiting.push(entry),
                _ => {}
            }
        }

        waiting.sort_by(|a, b| match (a.numeric_number(), b.numeric_number()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => std::cmp::Ordering::Equal,
        });

        Self {
            serving,
            waiting,
            source,
            received_at: Instant::now(),
        }
    }

    /// Zero-based position of an entry in the waiting sequence.
    pub fn waiting_position(&self, id: &str) -> Option<usize> {
        self.waiting.iter().position(|e| e.id == id)
    }

    /// True when nobody is being served and nobody is waiting.
    pub fn is_empty(&self) -> bool {
        self.serving.is_none() && self.waiting.is_empty()
    }
}
