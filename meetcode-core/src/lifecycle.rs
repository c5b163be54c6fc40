//! Connection lifecycle
//!
//! Runs the read loop of one connection: each inbound frame is routed to
//! completion before the next is read. When the loop ends, for whatever
//! reason, the connection is detached from the room it last joined.

use std::fmt::Display;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::connection::ConnectionHandle;
use crate::router::{SessionBinding, SignalingRouter};
use crate::session::SessionRegistry;

/// Why a connection's read loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The peer closed the stream
    Closed,
    /// Reading from the transport failed
    ReadError,
    /// The connection or the whole server was shut down
    Cancelled,
    /// The relay dropped the connection because frames could not be delivered
    Dropped,
}

/// Owns a connection's room binding and releases it exactly once
struct ConnectionScope {
    router: SignalingRouter,
    handle: ConnectionHandle,
    binding: SessionBinding,
}

impl ConnectionScope {
    async fn release(mut self) {
        if let Some(session_id) = self.binding.take_joined() {
            self.router.detach(&session_id, &self.handle).await;
        }
    }
}

impl Drop for ConnectionScope {
    // Only reached with a binding left when the read loop future was dropped
    // mid-flight (task abort); detach in the background.
    fn drop(&mut self) {
        let Some(session_id) = self.binding.take_joined() else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let router = self.router.clone();
        let handle = self.handle.clone();
        runtime.spawn(async move {
            router.detach(&session_id, &handle).await;
        });
    }
}

/// Binds connections to rooms for their whole lifetime
#[derive(Clone)]
pub struct SessionLifecycleManager {
    router: SignalingRouter,
}

impl SessionLifecycleManager {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self {
            router: SignalingRouter::new(registry),
        }
    }

    /// Run the read loop for one connection until it ends
    ///
    /// `hint` is the room reference from the connection target. `inbound`
    /// yields the peer's text frames. The loop stops when the stream ends,
    /// a read fails, `cancel` fires, or the handle's own token is cancelled
    /// because its outbound queue overflowed.
    pub async fn run<S, E>(
        &self,
        hint: &str,
        handle: ConnectionHandle,
        mut inbound: S,
        cancel: CancellationToken,
    ) -> DisconnectReason
    where
        S: Stream<Item = Result<String, E>> + Unpin,
        E: Display,
    {
        let mut scope = ConnectionScope {
            router: self.router.clone(),
            handle,
            binding: SessionBinding::new(hint),
        };
        let connection_id = scope.handle.id();
        let dropped = scope.handle.cancel_token();
        info!(%connection_id, session_id = %scope.binding.hint(), "Connection opened");

        let reason = loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => break DisconnectReason::Cancelled,
                _ = dropped.cancelled() => break DisconnectReason::Dropped,
                next = inbound.next() => next,
            };

            match next {
                None => break DisconnectReason::Closed,
                Some(Err(e)) => {
                    warn!(%connection_id, error = %e, "Failed to read message");
                    break DisconnectReason::ReadError;
                }
                Some(Ok(text)) => {
                    if let Err(e) = self
                        .router
                        .route_text(&scope.handle, &mut scope.binding, &text)
                        .await
                    {
                        warn!(%connection_id, error = %e, "Dropped message");
                    }
                }
            }
        };

        let last_session = scope.binding.joined().cloned();
        scope.release().await;
        match last_session {
            Some(session_id) => {
                info!(%connection_id, %session_id, ?reason, "Connection closed");
            }
            None => debug!(%connection_id, ?reason, "Connection closed before joining"),
        }

        reason
    }
}
