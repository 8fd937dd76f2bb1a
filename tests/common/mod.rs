//! In-process WebSocket server for exercising the realtime session without
//! an external backend.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::WebSocketStream;

use mediq_link::{SessionOptions, WireFrame};

const WAIT: Duration = Duration::from_secs(5);

/// Accepts WebSocket connections and exposes each as a [`ServerConnection`].
pub struct MockQueueServer {
    addr: SocketAddr,
    conn_rx: mpsc::UnboundedReceiver<ServerConnection>,
    accept_task: JoinHandle<()>,
}

impl MockQueueServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let (conn_tx, conn_rx) = mpsc::unbounded_channel();

        let accept_task = tokio::spawn(async move {
            loop {
                let Ok((stream, _peer)) = listener.accept().await else {
                    break;
                };
                let Ok(ws) = tokio_tungstenite::accept_async(stream).await else {
                    continue;
                };
                let (frame_tx, frame_rx) = mpsc::unbounded_channel();
                let (push_tx, push_rx) = mpsc::unbounded_channel();
                let io_task = tokio::spawn(connection_io(ws, frame_tx, push_rx));
                let conn = ServerConnection {
                    frames: frame_rx,
                    push_tx,
                    io_task,
                };
                if conn_tx.send(conn).is_err() {
                    break;
                }
            }
        });

        Self {
            addr,
            conn_rx,
            accept_task,
        }
    }

    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Session options tuned for tests: short backoff, no keepalive.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions::new(self.url())
            .with_reconnect_delay_ms(100)
            .with_max_reconnect_delay_ms(400)
            .with_connection_timeout_ms(2000)
            .with_keepalive_interval_ms(0)
    }

    /// Wait for the next accepted connection.
    pub async fn next_connection(&mut self) -> ServerConnection {
        tokio::time::timeout(WAIT, self.conn_rx.recv())
            .await
            .expect("timed out waiting for a connection")
            .expect("accept loop ended")
    }

    /// Assert that no connection is accepted within `window`.
    pub async fn expect_no_connection(&mut self, window: Duration) {
        if tokio::time::timeout(window, self.conn_rx.recv())
            .await
            .is_ok()
        {
            panic!("unexpected connection accepted");
        }
    }

    /// Stop accepting and release the port.
    pub fn shutdown(self) {
        self.accept_task.abort();
    }
}

impl Drop for MockQueueServer {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

/// One accepted client connection.
pub struct ServerConnection {
    frames: mpsc::UnboundedReceiver<WireFrame>,
    push_tx: mpsc::UnboundedSender<Message>,
    io_task: JoinHandle<()>,
}

impl ServerConnection {
    /// Push an event frame to the client.
    pub fn push_event(&self, event: &str, data: serde_json::Value) {
        let text = serde_json::to_string(&WireFrame::new(event, data)).expect("serialize frame");
        let _ = self.push_tx.send(Message::Text(text.into()));
    }

    /// Kill the connection abruptly (simulated network loss).
    pub fn drop_connection(self) {
        self.io_task.abort();
    }

    /// Wait for the next frame sent by the client.
    pub async fn next_frame(&mut self) -> WireFrame {
        tokio::time::timeout(WAIT, self.frames.recv())
            .await
            .expect("timed out waiting for a frame")
            .expect("connection closed")
    }

    /// Collect every frame the client sends within `window`.
    pub async fn frames_within(&mut self, window: Duration) -> Vec<WireFrame> {
        let mut frames = Vec::new();
        let deadline = tokio::time::Instant::now() + window;
        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                break;
            }
            match tokio::time::timeout(remaining, self.frames.recv()).await {
                Ok(Some(frame)) => frames.push(frame),
                Ok(None) | Err(_) => break,
            }
        }
        frames
    }
}

async fn connection_io(
    ws: WebSocketStream<TcpStream>,
    frame_tx: mpsc::UnboundedSender<WireFrame>,
    mut push_rx: mpsc::UnboundedReceiver<Message>,
) {
    let (mut sink, mut stream) = ws.split();
    loop {
        tokio::select! {
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Ok(frame) = serde_json::from_str::<WireFrame>(&text) {
                            if frame_tx.send(frame).is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        let _ = sink.send(Message::Pong(payload)).await;
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
            out = push_rx.recv() => {
                match out {
                    Some(msg) => {
                        if sink.send(msg).await.is_err() {
                            break;
                        }
                    }
                    None => {
                        let _ = sink.send(Message::Close(None)).await;
                        break;
                    }
                }
            }
        }
    }
}

/// Poll `cond` until it holds (or panic after ~5s).
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..100 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("condition not met within 5s");
}
