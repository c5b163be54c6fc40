//! Connection handles
//!
//! A [`ConnectionHandle`] is the relay's reference to one peer's live
//! message stream. It wraps the sending half of a bounded queue; the
//! transport drains the receiving half in order, so every message the
//! router hands to one handle is written to that peer FIFO.
//!
//! A peer whose queue overflows has lost a frame and cannot finish
//! negotiating, so the handle cancels its connection token instead of
//! dropping frames quietly. The peer then reconnects.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::TransportError;
use crate::protocol::ServerMessage;

/// Default capacity of a connection's outbound queue
pub const DEFAULT_SEND_QUEUE: usize = 64;

/// Unique identifier for one physical connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cloneable sender side of one peer's outbound queue
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    tx: mpsc::Sender<String>,
    cancel: CancellationToken,
}

impl ConnectionHandle {
    /// Create a handle together with the receiver the transport should drain
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        Self::with_token(capacity, CancellationToken::new())
    }

    /// Like [`ConnectionHandle::channel`], with a caller-supplied token that
    /// is cancelled when the connection has to be dropped
    pub fn with_token(
        capacity: usize,
        cancel: CancellationToken,
    ) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                id: ConnectionId::new(),
                tx,
                cancel,
            },
            rx,
        )
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Token cancelled once this connection is being dropped
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Queue an already-encoded frame without waiting
    ///
    /// A full queue cancels the connection.
    pub fn try_send_text(&self, text: String) -> Result<(), TransportError> {
        self.tx.try_send(text).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                self.cancel.cancel();
                TransportError::QueueFull
            }
            mpsc::error::TrySendError::Closed(_) => TransportError::Closed,
        })
    }

    /// Encode and queue a message
    pub fn send(&self, message: &ServerMessage) -> Result<(), TransportError> {
        let json = message.encode()?;
        self.try_send_text(json)
    }
}

impl PartialEq for ConnectionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConnectionHandle {}
