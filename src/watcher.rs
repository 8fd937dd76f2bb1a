//! Ready-made wiring of session + REST client + reconciliation.
//!
//! [`QueueWatcher`] is the piece a screen actually holds: it subscribes the
//! session to an institution's queue topic, listens for push events,
//! re-fetches over REST on signals/reconnects/a fixed timer, funnels every
//! full list through one [`QueueView`], and publishes the reconciled
//! [`QueueSnapshot`] on a `tokio::sync::watch` channel.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;

use crate::client::MediqClient;
use crate::models::{QueueSnapshot, SnapshotSource};
use crate::session::{events, EventCallback, RealtimeSession};
use crate::view::{QueueView, ViewAction};

/// Watches one institution's queue and publishes reconciled snapshots.
pub struct QueueWatcher {
    session: RealtimeSession,
    institution_id: String,
    snapshot_rx: watch::Receiver<Option<QueueSnapshot>>,
    refresh: Arc<Notify>,
    callbacks: Vec<(&'static str, EventCallback)>,
    fetch_task: JoinHandle<()>,
}

impl QueueWatcher {
    /// Interval of the periodic REST fallback fetch.
    pub const REFRESH_INTERVAL: Duration = Duration::from_secs(30);

    /// Start watching. Subscribes the session to `institution_id`, connects
    /// it, and spawns the fetch loop (which performs the initial fetch
    /// immediately). Must be called from within a tokio runtime.
    pub fn spawn(
        session: RealtimeSession,
        client: MediqClient,
        institution_id: impl Into<String>,
    ) -> Self {
        let institution_id = institution_id.into();
        let view = Arc::new(Mutex::new(QueueView::new()));
        let refresh = Arc::new(Notify::new());
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let snapshot_tx = Arc::new(snapshot_tx);

        let mut callbacks: Vec<(&'static str, EventCallback)> = Vec::new();

        // Full lists ride straight into the view; anything partial (and
        // every signal/reconnect) pokes the fetch loop instead.
        for event in [
            events::QUEUE_UPDATE,
            events::QUEUE_READY,
            events::QUEUE_ALMOST_READY,
            events::QUEUE_CALLED,
            events::QUEUE_COMPLETED,
            events::CONNECT,
        ] {
            let view = view.clone();
            let refresh = refresh.clone();
            let snapshot_tx = snapshot_tx.clone();
            let callback: EventCallback = Arc::new(move |payload| {
                let action = {
                    let mut view = view.lock().unwrap_or_else(|e| e.into_inner());
                    view.apply_event(event, payload)
                };
                match action {
                    ViewAction::Updated => {
                        let snapshot = {
                            let view = view.lock().unwrap_or_else(|e| e.into_inner());
                            view.snapshot().cloned()
                        };
                        let _ = snapshot_tx.send(snapshot);
                    }
                    ViewAction::RefetchNeeded => refresh.notify_one(),
                    ViewAction::Ignored => {}
                }
            });
            session.add_callbacks(event, callback.clone());
            callbacks.push((event, callback));
        }

        session.subscribe_queue_updates(&institution_id);
        session.connect();

        let fetch_task = tokio::spawn(fetch_loop(
            client,
            institution_id.clone(),
            view,
            snapshot_tx,
            refresh.clone(),
        ));

        Self {
            session,
            institution_id,
            snapshot_rx,
            refresh,
            callbacks,
            fetch_task,
        }
    }

    /// A receiver of reconciled snapshots. `None` until the first source
    /// produces a full list.
    pub fn snapshot_rx(&self) -> watch::Receiver<Option<QueueSnapshot>> {
        self.snapshot_rx.clone()
    }

    /// The institution being watched.
    pub fn institution_id(&self) -> &str {
        &self.institution_id
    }

    /// The underlying session handle.
    pub fn session(&self) -> &RealtimeSession {
        &self.session
    }

    /// Manual refresh action: trigger an immediate REST fetch.
    pub fn refresh(&self) {
        self.refresh.notify_one();
    }

    /// Stop watching: detach the listeners and abort the fetch loop. The
    /// session itself stays connected for other consumers.
    pub fn stop(self) {
        for (event, callback) in &self.callbacks {
            self.session.remove_callbacks(event, callback);
        }
        self.fetch_task.abort();
    }
}

async fn fetch_loop(
    client: MediqClient,
    institution_id: String,
    view: Arc<Mutex<QueueView>>,
    snapshot_tx: Arc<watch::Sender<Option<QueueSnapshot>>>,
    refresh: Arc<Notify>,
) {
    let mut interval = tokio::time::interval(QueueWatcher::REFRESH_INTERVAL);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        // The first tick fires immediately — that is the initial fetch.
        tokio::select! {
            _ = interval.tick() => {}
            _ = refresh.notified() => {}
        }

        match client.get_queue(Some(&institution_id)).await {
            Ok(entries) => {
                let snapshot = {
                    let mut view = view.lock().unwrap_or_else(|e| e.into_inner());
                    view.apply_full(entries, SnapshotSource::Rest);
                    view.snapshot().cloned()
                };
                let _ = snapshot_tx.send(snapshot);
            }
            // Push delivery keeps working; the UI surfaces its own retry
            // affordance when both sources are down.
            Err(e) => log::warn!("[mediq-link] queue refresh failed: {}", e),
        }
    }
}
