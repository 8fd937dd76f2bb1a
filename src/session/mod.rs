//! Realtime session: the single authoritative channel to the server's
//! push-event stream.
//!
//! [`RealtimeSession`] hides reconnect/backoff/re-subscribe complexity from
//! callers: screens register callbacks for named events, issue subscription
//! intents, and the session keeps those working across connection loss. It
//! is an explicit service object — construct one at application start and
//! hand clones to the pieces that need it; independent sessions (e.g. in
//! parallel tests) do not share state.
//!
//! All public operations are non-blocking and never return errors: failures
//! surface through the `error` / `disconnect` listener channels, and
//! operations that need a live connection degrade to a logged no-op.

pub mod events;
mod registry;
mod task;

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::{mpsc, watch};

use crate::auth::TokenCell;
use crate::models::{ClientMessage, NotificationIntent, SessionOptions, WireFrame};

pub use registry::EventCallback;
use registry::ListenerRegistry;

/// State shared between the public handle and the background connection
/// task.
pub(crate) struct SessionInner {
    pub(crate) options: SessionOptions,
    pub(crate) token: TokenCell,
    pub(crate) registry: Mutex<ListenerRegistry>,
    /// Last queue-updates topic (institution id); replayed on reconnect.
    pub(crate) queue_topic: Mutex<Option<String>>,
    /// Last notification subscription; replayed on reconnect.
    pub(crate) notification_intent: Mutex<Option<NotificationIntent>>,
    pub(crate) connected: AtomicBool,
    pub(crate) reconnect_attempts: AtomicU32,
    /// Sender into the live connection's write loop; `None` while
    /// disconnected.
    pub(crate) outbound: Mutex<Option<mpsc::UnboundedSender<WireFrame>>>,
    /// Whether a connection task currently exists. Guards the one-handle
    /// invariant: `connect()` while this is set is a no-op.
    pub(crate) task_alive: AtomicBool,
    /// Stop signal for the current connection task.
    stop_tx: Mutex<Option<watch::Sender<bool>>>,
}

/// Dispatch `payload` to every listener registered for the logical event.
///
/// Iterates a snapshot of the listener list with no lock held, so callbacks
/// are free to call back into the session (including removing themselves).
pub(crate) fn dispatch(inner: &SessionInner, logical: &str, payload: &Value) {
    let callbacks = {
        let registry = inner.registry.lock().unwrap_or_else(|e| e.into_inner());
        registry.snapshot(logical)
    };
    for callback in callbacks {
        callback(payload);
    }
}

/// Resolve a wire event name through the alias table, then dispatch.
pub(crate) fn dispatch_wire(inner: &SessionInner, wire: &str, payload: &Value) {
    dispatch(inner, events::logical_event(wire), payload);
}

/// Handle to the realtime session. Cheap to clone; all clones share one
/// connection, one listener registry and one set of remembered intents.
#[derive(Clone)]
pub struct RealtimeSession {
    inner: Arc<SessionInner>,
}

impl RealtimeSession {
    /// Create a session with its own (empty) token cell.
    pub fn new(options: SessionOptions) -> Self {
        Self::with_token_cell(options, TokenCell::new())
    }

    /// Create a session sharing an existing token cell (typically the one
    /// handed to [`MediqClient`](crate::MediqClient)).
    pub fn with_token_cell(options: SessionOptions, token: TokenCell) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                options,
                token,
                registry: Mutex::new(ListenerRegistry::new()),
                queue_topic: Mutex::new(None),
                notification_intent: Mutex::new(None),
                connected: AtomicBool::new(false),
                reconnect_attempts: AtomicU32::new(0),
                outbound: Mutex::new(None),
                task_alive: AtomicBool::new(false),
                stop_tx: Mutex::new(None),
            }),
        }
    }

    /// The token cell this session authenticates with.
    pub fn token_cell(&self) -> TokenCell {
        self.inner.token.clone()
    }

    /// Open the realtime connection. Idempotent: while a connection task is
    /// alive (connected, handshaking, or between reconnect attempts) this
    /// is a no-op, so no duplicate sockets are ever created.
    ///
    /// Returns immediately; success and failure are reported through the
    /// `connect` / `error` / `disconnect` listener channels. Must be called
    /// from within a tokio runtime.
    pub fn connect(&self) {
        if self.inner.task_alive.swap(true, Ordering::SeqCst) {
            log::debug!("connect() ignored: connection task already running");
            return;
        }

        self.inner.reconnect_attempts.store(0, Ordering::SeqCst);
        let (stop_tx, stop_rx) = watch::channel(false);
        *self.inner.stop_tx.lock().unwrap_or_else(|e| e.into_inner()) = Some(stop_tx);

        let inner = Arc::clone(&self.inner);
        tokio::spawn(task::session_task(inner, stop_rx));
    }

    /// Close the connection. Idempotent. Cancels a pending reconnect timer
    /// if one is armed, so no stray reconnect fires after an intentional
    /// teardown. Listeners, the token and the remembered subscription
    /// intents all survive for a later `connect()`.
    pub fn disconnect(&self) {
        self.inner.connected.store(false, Ordering::SeqCst);
        let stop_tx = self
            .inner
            .stop_tx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(tx) = stop_tx {
            let _ = tx.send(true);
        }
    }

    /// Whether the transport is currently established.
    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }

    /// Consecutive failed reconnect attempts so far. Resets to 0 on every
    /// successful connect and on every manual `connect()`.
    pub fn reconnect_attempts(&self) -> u32 {
        self.inner.reconnect_attempts.load(Ordering::SeqCst)
    }

    /// Update the credential used for connections. When a connection is
    /// live the new token is pushed over it as an `auth_update` event, so
    /// rotation does not force a reconnect. `None` (or an empty string)
    /// clears the stored credential.
    pub fn set_token(&self, token: Option<String>) {
        self.inner.token.set(token);
        if self.is_connected() {
            // Propagate the post-filter value so clearing is also pushed.
            self.send_message(ClientMessage::AuthUpdate {
                token: self.inner.token.get(),
            });
        }
    }

    /// Send an application event to the server. Dropped with a warning when
    /// not connected — callers rely on REST fallback and on subscription
    /// replay at the next reconnect, never on queued emits.
    pub fn emit(&self, event: &str, data: Value) {
        if !self.is_connected() {
            log::warn!("emit('{}') dropped: not connected", event);
            return;
        }
        self.send_frame(WireFrame::new(event, data));
    }

    /// Register a listener for a logical event name. Multiple listeners per
    /// event are invoked in registration order.
    pub fn add_callbacks(&self, event: &str, callback: EventCallback) {
        self.inner
            .registry
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .add(event, callback);
    }

    /// Unregister a listener (by `Arc` pointer identity). Removing a
    /// listener that was never added is a no-op.
    pub fn remove_callbacks(&self, event: &str, callback: &EventCallback) {
        self.inner
            .registry
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(event, callback);
    }

    /// Ask the server to push queue changes for `institution_id`. The topic
    /// is remembered (replacing any previous one) and replayed after every
    /// reconnect, so a network blip is invisible to the caller.
    pub fn subscribe_queue_updates(&self, institution_id: &str) {
        *self
            .inner
            .queue_topic
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(institution_id.to_string());
        self.send_or_replay_later(ClientMessage::SubscribeQueueUpdates {
            institution_id: institution_id.to_string(),
        });
    }

    /// Ask the server to push personal notifications of the given kinds.
    /// The intent is remembered and replayed after every reconnect.
    pub fn subscribe_to_notifications(
        &self,
        user_id: &str,
        institution_id: &str,
        types: Vec<String>,
    ) {
        let intent = NotificationIntent {
            user_id: user_id.to_string(),
            institution_id: institution_id.to_string(),
            types: types.clone(),
        };
        *self
            .inner
            .notification_intent
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(intent);
        self.send_or_replay_later(ClientMessage::SubscribeNotifications {
            user_id: user_id.to_string(),
            institution_id: institution_id.to_string(),
            types,
        });
    }

    /// Cancel the notification subscription for this user and institution.
    /// Clears the remembered intent so it is no longer replayed.
    pub fn unsubscribe_from_notifications(&self, user_id: &str, institution_id: &str) {
        *self
            .inner
            .notification_intent
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = None;
        self.send_message(ClientMessage::UnsubscribeNotifications {
            user_id: user_id.to_string(),
            institution_id: institution_id.to_string(),
        });
    }

    /// Request an immediate full snapshot push for `institution_id`.
    pub fn request_queue_status(&self, institution_id: &str) {
        self.send_message(ClientMessage::GetQueueStatus {
            institution_id: institution_id.to_string(),
        });
    }

    fn send_message(&self, message: ClientMessage) {
        match message.into_frame() {
            Ok(frame) => {
                if !self.is_connected() {
                    log::warn!("'{}' dropped: not connected", frame.event);
                    return;
                }
                self.send_frame(frame);
            }
            Err(e) => log::warn!("failed to encode outbound message: {}", e),
        }
    }

    /// Like [`send_message`](Self::send_message), but quiet when offline:
    /// subscription intents are remembered and replayed on connect, so a
    /// pre-connect call is normal usage, not a dropped send.
    fn send_or_replay_later(&self, message: ClientMessage) {
        match message.into_frame() {
            Ok(frame) => {
                if !self.is_connected() {
                    log::debug!("'{}' deferred: will replay on connect", frame.event);
                    return;
                }
                self.send_frame(frame);
            }
            Err(e) => log::warn!("failed to encode outbound message: {}", e),
        }
    }

    fn send_frame(&self, frame: WireFrame) {
        let outbound = self
            .inner
            .outbound
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        match outbound.as_ref() {
            Some(tx) => {
                if tx.send(frame).is_err() {
                    log::warn!("outbound channel closed; frame dropped");
                }
            }
            None => log::warn!("'{}' dropped: no live connection", frame.event),
        }
    }
}
