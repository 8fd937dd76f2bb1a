//! Background connection task.
//!
//! Owns the WebSocket for one `connect()` lifetime: establishes the
//! transport (bearer token attached at handshake), replays remembered
//! subscription intents, pumps inbound frames to the listener registry and
//! outbound frames from the session handle, keeps the link alive with
//! pings, and reconnects with bounded exponential backoff when the
//! transport is lost. Exits on manual disconnect or reconnect exhaustion.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use reqwest::Url;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant as TokioInstant;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        client::IntoClientRequest,
        http::header::{HeaderValue, AUTHORIZATION},
        protocol::Message,
    },
};

use crate::error::{MediqLinkError, Result};
use crate::models::{ClientMessage, WireFrame};

use super::{dispatch, dispatch_wire, events, SessionInner};

type WebSocketStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<TcpStream>>;

/// A duration far enough in the future (~100 years) to act as "never" for
/// deadline calculations without overflowing `Instant::now() + dur`.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 3600);

/// How a connection ended.
#[derive(Debug, PartialEq, Eq)]
enum ConnExit {
    /// `disconnect()` was called — no reconnect.
    Stopped,
    /// The transport was lost — eligible for reconnect.
    Lost,
}

/// Convert the configured base URL into the WebSocket endpoint.
///
/// `http(s)` schemes map to `ws(s)`; a URL without an explicit path gets
/// the default `/ws` path, while an explicit path is kept as an override.
fn resolve_ws_url(base_url: &str) -> Result<Url> {
    let mut url = Url::parse(base_url.trim()).map_err(|e| {
        MediqLinkError::ConfigurationError(format!("Invalid session URL '{}': {}", base_url, e))
    })?;

    if url.host_str().is_none() {
        return Err(MediqLinkError::ConfigurationError(format!(
            "Session URL '{}' must include a host",
            base_url
        )));
    }

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(MediqLinkError::ConfigurationError(format!(
                "Unsupported session URL scheme '{}'; expected http(s) or ws(s)",
                other
            )));
        }
    };

    url.set_scheme(scheme).map_err(|_| {
        MediqLinkError::ConfigurationError("Failed to set WebSocket URL scheme".to_string())
    })?;
    url.set_fragment(None);
    if url.path().is_empty() || url.path() == "/" {
        url.set_path("/ws");
    }

    Ok(url)
}

/// Subscription intents to replay on a fresh connection, queue topic first.
fn replay_messages(inner: &SessionInner) -> Vec<ClientMessage> {
    let mut messages = Vec::new();

    let topic = inner
        .queue_topic
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone();
    if let Some(institution_id) = topic {
        messages.push(ClientMessage::SubscribeQueueUpdates { institution_id });
    }

    let intent = inner
        .notification_intent
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone();
    if let Some(intent) = intent {
        messages.push(ClientMessage::SubscribeNotifications {
            user_id: intent.user_id,
            institution_id: intent.institution_id,
            types: intent.types,
        });
    }

    messages
}

async fn establish(inner: &SessionInner) -> Result<WebSocketStream> {
    let url = resolve_ws_url(&inner.options.url)?;
    log::debug!("[mediq-link] connecting to {}", url);

    let mut request = url.as_str().into_client_request().map_err(|e| {
        MediqLinkError::WebSocketError(format!("Failed to build WebSocket request: {}", e))
    })?;

    if let Some(token) = inner.token.get() {
        let header = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
            MediqLinkError::AuthenticationError(format!(
                "Invalid token for Authorization header: {}",
                e
            ))
        })?;
        request.headers_mut().insert(AUTHORIZATION, header);
    }

    let timeout = inner.options.connection_timeout();
    let (stream, _response) = tokio::time::timeout(timeout, connect_async(request))
        .await
        .map_err(|_| MediqLinkError::TimeoutError(format!("Connection timeout ({:?})", timeout)))?
        .map_err(|e| MediqLinkError::WebSocketError(format!("Connection failed: {}", e)))?;

    Ok(stream)
}

async fn send_frame(ws: &mut WebSocketStream, frame: &WireFrame) -> Result<()> {
    let payload = serde_json::to_string(frame)
        .map_err(|e| MediqLinkError::SerializationError(e.to_string()))?;
    ws.send(Message::Text(payload.into())).await.map_err(|e| {
        MediqLinkError::WebSocketError(format!("Failed to send '{}': {}", frame.event, e))
    })
}

fn handle_text(inner: &Arc<SessionInner>, text: &str) {
    match serde_json::from_str::<WireFrame>(text) {
        Ok(frame) => dispatch_wire(inner, &frame.event, &frame.data),
        Err(e) => log::warn!("[mediq-link] ignoring malformed frame: {}", e),
    }
}

/// Connect / reconnect loop. One instance of this task exists per
/// `connect()` lifetime; `session_task` exiting is what re-arms
/// `connect()`.
pub(crate) async fn session_task(inner: Arc<SessionInner>, mut stop_rx: watch::Receiver<bool>) {
    loop {
        match establish(&inner).await {
            Ok(ws) => {
                if run_connection(&inner, ws, &mut stop_rx).await == ConnExit::Stopped {
                    break;
                }
            }
            Err(e) => {
                log::warn!("[mediq-link] connect failed: {}", e);
                dispatch(&inner, events::ERROR, &json!({ "message": e.to_string() }));
            }
        }

        if *stop_rx.borrow() {
            break;
        }

        let attempts = inner.reconnect_attempts.load(Ordering::SeqCst);
        if attempts >= inner.options.max_reconnect_attempts {
            log::warn!(
                "[mediq-link] max reconnect attempts ({}) reached; giving up",
                attempts
            );
            dispatch(
                &inner,
                events::RECONNECT_EXHAUSTED,
                &json!({ "attempts": attempts }),
            );
            break;
        }
        inner.reconnect_attempts.fetch_add(1, Ordering::SeqCst);

        let delay = inner.options.reconnect_delay(attempts);
        log::info!(
            "[mediq-link] reconnecting in {:?} (attempt {})",
            delay,
            attempts + 1
        );

        // The backoff sleep races the stop signal: disconnect() during
        // backoff cancels the pending retry instead of letting it fire.
        let mut stopped = false;
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            changed = stop_rx.changed() => {
                stopped = changed.is_err() || *stop_rx.borrow();
            }
        }
        if stopped || *stop_rx.borrow() {
            break;
        }
    }

    inner.connected.store(false, Ordering::SeqCst);
    *inner.outbound.lock().unwrap_or_else(|e| e.into_inner()) = None;
    inner.task_alive.store(false, Ordering::SeqCst);
}

/// Drive one established connection until it is stopped or lost.
async fn run_connection(
    inner: &Arc<SessionInner>,
    mut ws: WebSocketStream,
    stop_rx: &mut watch::Receiver<bool>,
) -> ConnExit {
    // Replay remembered intents before anything else can write to the
    // socket: exactly once per successful connect, ahead of any
    // listener-driven traffic, so the server resumes pushing without the
    // caller re-subscribing.
    for message in replay_messages(inner) {
        let frame = match message.into_frame() {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("[mediq-link] failed to encode replay frame: {}", e);
                continue;
            }
        };
        if let Err(e) = send_frame(&mut ws, &frame).await {
            log::warn!("[mediq-link] subscription replay failed: {}", e);
            dispatch(inner, events::ERROR, &json!({ "message": e.to_string() }));
            dispatch(
                inner,
                events::DISCONNECT,
                &json!({ "reason": "subscription replay failed" }),
            );
            return ConnExit::Lost;
        }
        log::debug!("[mediq-link] replayed '{}'", frame.event);
    }

    let (out_tx, mut out_rx) = mpsc::unbounded_channel();
    *inner.outbound.lock().unwrap_or_else(|e| e.into_inner()) = Some(out_tx);
    inner.connected.store(true, Ordering::SeqCst);
    inner.reconnect_attempts.store(0, Ordering::SeqCst);
    log::info!("[mediq-link] connected");
    dispatch(inner, events::CONNECT, &Value::Null);

    let exit = connection_loop(inner, &mut ws, &mut out_rx, stop_rx).await;

    inner.connected.store(false, Ordering::SeqCst);
    *inner.outbound.lock().unwrap_or_else(|e| e.into_inner()) = None;
    exit
}

async fn connection_loop(
    inner: &Arc<SessionInner>,
    ws: &mut WebSocketStream,
    out_rx: &mut mpsc::UnboundedReceiver<WireFrame>,
    stop_rx: &mut watch::Receiver<bool>,
) -> ConnExit {
    let keepalive_enabled = inner.options.keepalive_interval_ms > 0;
    let keepalive_dur = if keepalive_enabled {
        Duration::from_millis(inner.options.keepalive_interval_ms)
    } else {
        FAR_FUTURE
    };
    let pong_timeout = Duration::from_millis(inner.options.pong_timeout_ms);
    let has_pong_timeout = keepalive_enabled && inner.options.pong_timeout_ms > 0;

    let mut idle_deadline = TokioInstant::now() + keepalive_dur;
    let mut awaiting_pong = false;
    let mut pong_deadline = TokioInstant::now() + FAR_FUTURE;

    loop {
        let idle_sleep = tokio::time::sleep_until(idle_deadline);
        tokio::pin!(idle_sleep);
        let pong_sleep = tokio::time::sleep_until(pong_deadline);
        tokio::pin!(pong_sleep);

        tokio::select! {
            biased;

            _ = stop_rx.changed() => {
                let _ = ws.close(None).await;
                dispatch(
                    inner,
                    events::DISCONNECT,
                    &json!({ "reason": "client disconnected" }),
                );
                return ConnExit::Stopped;
            }

            _ = &mut pong_sleep, if has_pong_timeout && awaiting_pong => {
                log::warn!(
                    "[mediq-link] pong timeout ({:?}) — server unresponsive",
                    pong_timeout
                );
                dispatch(inner, events::DISCONNECT, &json!({ "reason": "pong timeout" }));
                return ConnExit::Lost;
            }

            frame = out_rx.recv() => {
                match frame {
                    Some(frame) => {
                        if let Err(e) = send_frame(ws, &frame).await {
                            log::warn!("[mediq-link] send failed: {}", e);
                            dispatch(inner, events::ERROR, &json!({ "message": e.to_string() }));
                            dispatch(inner, events::DISCONNECT, &json!({ "reason": "send failed" }));
                            return ConnExit::Lost;
                        }
                    }
                    None => return ConnExit::Lost,
                }
            }

            _ = &mut idle_sleep, if keepalive_enabled && !awaiting_pong => {
                if let Err(e) = ws.send(Message::Ping(Bytes::new())).await {
                    log::warn!("[mediq-link] keepalive ping failed: {}", e);
                    dispatch(
                        inner,
                        events::DISCONNECT,
                        &json!({ "reason": "keepalive ping failed" }),
                    );
                    return ConnExit::Lost;
                }
                if has_pong_timeout {
                    awaiting_pong = true;
                    pong_deadline = TokioInstant::now() + pong_timeout;
                }
                idle_deadline = TokioInstant::now() + keepalive_dur;
            }

            frame = ws.next() => {
                idle_deadline = TokioInstant::now() + keepalive_dur;
                if awaiting_pong {
                    // Any frame proves the peer is alive.
                    awaiting_pong = false;
                    pong_deadline = TokioInstant::now() + FAR_FUTURE;
                }

                match frame {
                    Some(Ok(Message::Text(text))) => handle_text(inner, &text),
                    Some(Ok(Message::Binary(_))) => {
                        log::debug!("[mediq-link] ignoring unexpected binary frame");
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        let _ = ws.send(Message::Pong(payload)).await;
                    }
                    Some(Ok(Message::Pong(_))) | Some(Ok(Message::Frame(_))) => {}
                    Some(Ok(Message::Close(close))) => {
                        let reason = close
                            .map(|f| f.reason.to_string())
                            .unwrap_or_else(|| "server closed connection".to_string());
                        dispatch(inner, events::DISCONNECT, &json!({ "reason": reason }));
                        return ConnExit::Lost;
                    }
                    Some(Err(e)) => {
                        let message = e.to_string();
                        dispatch(inner, events::ERROR, &json!({ "message": message }));
                        dispatch(
                            inner,
                            events::DISCONNECT,
                            &json!({ "reason": format!("transport error: {}", message) }),
                        );
                        return ConnExit::Lost;
                    }
                    None => {
                        dispatch(inner, events::DISCONNECT, &json!({ "reason": "stream ended" }));
                        return ConnExit::Lost;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::session::RealtimeSession;
    use crate::SessionOptions;

    use super::*;

    #[test]
    fn test_ws_url_conversion() {
        assert_eq!(
            resolve_ws_url("http://localhost:3000").unwrap().as_str(),
            "ws://localhost:3000/ws"
        );
        assert_eq!(
            resolve_ws_url("https://api.example.com").unwrap().as_str(),
            "wss://api.example.com/ws"
        );
        assert_eq!(
            resolve_ws_url("ws://localhost:3000").unwrap().as_str(),
            "ws://localhost:3000/ws"
        );
    }

    #[test]
    fn test_ws_url_keeps_explicit_path() {
        assert_eq!(
            resolve_ws_url("http://localhost:3000/realtime").unwrap().as_str(),
            "ws://localhost:3000/realtime"
        );
    }

    #[test]
    fn test_ws_url_rejects_unsupported_scheme() {
        assert!(resolve_ws_url("ftp://example.com").is_err());
        assert!(resolve_ws_url("not a url").is_err());
    }

    #[test]
    fn test_replay_is_queue_topic_then_notifications() {
        let session = RealtimeSession::new(SessionOptions::default());
        session.subscribe_queue_updates("inst-1");
        session.subscribe_to_notifications("u-1", "inst-1", vec!["queue_ready".to_string()]);

        let messages = replay_messages(&session.inner);
        assert_eq!(messages.len(), 2);
        assert!(matches!(
            &messages[0],
            ClientMessage::SubscribeQueueUpdates { institution_id } if institution_id == "inst-1"
        ));
        assert!(matches!(
            &messages[1],
            ClientMessage::SubscribeNotifications { user_id, .. } if user_id == "u-1"
        ));
    }

    #[test]
    fn test_replay_uses_latest_topic_only() {
        let session = RealtimeSession::new(SessionOptions::default());
        session.subscribe_queue_updates("inst-1");
        session.subscribe_queue_updates("inst-2");

        let messages = replay_messages(&session.inner);
        assert_eq!(messages.len(), 1);
        assert!(matches!(
            &messages[0],
            ClientMessage::SubscribeQueueUpdates { institution_id } if institution_id == "inst-2"
        ));
    }

    #[test]
    fn test_replay_empty_without_intents() {
        let session = RealtimeSession::new(SessionOptions::default());
        assert!(replay_messages(&session.inner).is_empty());
    }
}
