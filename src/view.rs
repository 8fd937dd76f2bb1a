//! Consumer-side reconciliation of push events and REST fetches.
//!
//! Every screen that renders queue state combines two sources of truth:
//! pull-based REST fetches (authoritative at the instant of the call, stale
//! between calls) and push events (full snapshots or change signals).
//! [`QueueView`] applies the reconciliation contract: whichever source
//! produces a full list last wins and replaces the rendered snapshot in
//! full; a push event that is not itself a full list only tells the
//! consumer to re-fetch.

use serde_json::Value;

use crate::models::{QueueEntry, QueuePayload, QueueSnapshot, SnapshotSource};
use crate::session::events;

/// What a consumer should do after feeding an event into the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
    /// The event carried a full list; the snapshot has been replaced.
    Updated,
    /// The event only signals a change (or a reconnect happened); re-fetch
    /// the full list via REST.
    RefetchNeeded,
    /// The event does not affect queue state.
    Ignored,
}

/// Reconciled queue state for one institution.
#[derive(Default)]
pub struct QueueView {
    snapshot: Option<QueueSnapshot>,
}

impl QueueView {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current snapshot, if any source has produced one yet.
    pub fn snapshot(&self) -> Option<&QueueSnapshot> {
        self.snapshot.as_ref()
    }

    /// Replace the snapshot with a full list from `source`. Last writer
    /// wins — there is deliberately no element-wise merging, because a REST
    /// response and a push event racing each other have no ordering
    /// guarantee.
    pub fn apply_full(
        &mut self,
        entries: Vec<QueueEntry>,
        source: SnapshotSource,
    ) -> &QueueSnapshot {
        self.snapshot
            .insert(QueueSnapshot::from_entries(entries, source))
    }

    /// Feed a dispatched session event into the view.
    ///
    /// `queue_update` payloads that parse as a full list replace the
    /// snapshot; any other `queue_update` payload, every change signal, and
    /// a (re)connect all demand a fresh REST fetch — after a reconnect the
    /// client must assume events were missed.
    pub fn apply_event(&mut self, logical_event: &str, payload: &Value) -> ViewAction {
        match logical_event {
            events::QUEUE_UPDATE => match QueuePayload::entries_from_value(payload) {
                Some(entries) => {
                    self.apply_full(entries, SnapshotSource::Push);
                    ViewAction::Updated
                }
                None => ViewAction::RefetchNeeded,
            },
            events::CONNECT => ViewAction::RefetchNeeded,
            event if events::is_signal_event(event) => ViewAction::RefetchNeeded,
            _ => ViewAction::Ignored,
        }
    }
}
