//! WebSocket test client for signaling tests
//!
//! Provides both low-level WsConnection and high-level TestPeer.
//!
//! Note: Some methods may appear unused because they're only used in specific
//! test files and clippy checks each test independently.

use std::net::SocketAddr;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Default wait for an expected message
pub const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// Low-level WebSocket connection
pub struct WsConnection {
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
}

impl WsConnection {
    /// Connect to a room's signaling endpoint; `target` is the path after `/`
    pub async fn connect(addr: SocketAddr, target: &str) -> Self {
        let url = format!("ws://{}/{}", addr, target);
        let (ws, _) = tokio_tungstenite::connect_async(&url)
            .await
            .expect("Failed to connect");
        let (sink, stream) = ws.split();
        Self { sink, stream }
    }

    /// Send raw text message
    pub async fn send_raw(&mut self, msg: &str) {
        self.sink
            .send(Message::Text(msg.to_string().into()))
            .await
            .unwrap();
    }

    /// Send JSON message
    pub async fn send_json<T: Serialize>(&mut self, msg: &T) {
        let json = serde_json::to_string(msg).unwrap();
        self.send_raw(&json).await;
    }

    /// Receive raw text message
    pub async fn recv_raw(&mut self) -> String {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return text.to_string(),
                Some(Ok(Message::Ping(_))) => continue,
                Some(Ok(_)) => continue,
                Some(Err(e)) => panic!("WebSocket error: {}", e),
                None => panic!("WebSocket closed"),
            }
        }
    }

    /// Receive with timeout, returns None if timeout
    pub async fn recv_timeout(&mut self, duration: Duration) -> Option<String> {
        tokio::time::timeout(duration, self.recv_raw()).await.ok()
    }

    /// Send a close frame
    pub async fn close(mut self) {
        let _ = self.sink.send(Message::Close(None)).await;
    }
}

/// High-level peer with signaling helpers
pub struct TestPeer {
    pub conn: WsConnection,
}

impl TestPeer {
    /// Connect to `/session/{session_id}`
    #[allow(dead_code)]
    pub async fn connect(addr: SocketAddr, session_id: &str) -> Self {
        let conn = WsConnection::connect(addr, &format!("session/{}", session_id)).await;
        Self { conn }
    }

    /// Send JOIN_MEETING for `member`
    #[allow(dead_code)]
    pub async fn join(&mut self, member: &str) {
        self.conn
            .send_json(&serde_json::json!({
                "type": "JOIN_MEETING",
                "member": member,
            }))
            .await;
    }

    /// Send an OFFER, ANSWER or CANDIDATE
    #[allow(dead_code)]
    pub async fn signal(&mut self, kind: &str, session_id: &str, member: &str, payload: Value) {
        let field = kind.to_lowercase();
        let mut msg = serde_json::json!({
            "type": kind,
            "sessionID": format!("session/{}", session_id),
            "member": member,
        });
        msg[field.as_str()] = payload;
        self.conn.send_json(&msg).await;
    }

    /// Wait for the next message
    #[allow(dead_code)]
    pub async fn expect(&mut self) -> Value {
        let text = self
            .conn
            .recv_timeout(RECV_TIMEOUT)
            .await
            .expect("Timeout waiting for message");
        serde_json::from_str(&text).expect("Failed to parse JSON")
    }

    /// Wait for the next message and check its type
    #[allow(dead_code)]
    pub async fn expect_type(&mut self, kind: &str) -> Value {
        let msg = self.expect().await;
        assert_eq!(msg["type"], kind, "Unexpected message: {}", msg);
        msg
    }

    /// Assert that nothing arrives within a short window
    #[allow(dead_code)]
    pub async fn expect_silence(&mut self) {
        if let Some(text) = self.conn.recv_timeout(Duration::from_millis(150)).await {
            panic!("Expected no message, got: {}", text);
        }
    }
}
