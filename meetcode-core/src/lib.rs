//! meetcode-core: Room registry and signaling router for the meetcode relay
//!
//! This crate holds the transport-agnostic heart of the relay:
//!
//! - **Session registry** - [`SessionRegistry`] owns every room ([`Session`]) and
//!   serializes roster changes per room
//! - **Wire protocol** - [`ClientMessage`] and [`ServerMessage`] model the JSON
//!   frames peers exchange; negotiation payloads stay opaque
//! - **Signaling router** - [`SignalingRouter`] turns one inbound frame into
//!   replies and fan-out
//! - **Lifecycle** - [`SessionLifecycleManager`] runs a connection's read loop
//!   and detaches it from its room on every exit path
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use meetcode_core::{ConnectionHandle, SessionLifecycleManager, SessionRegistry};
//! use tokio_util::sync::CancellationToken;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Arc::new(SessionRegistry::new());
//!     let session_id = registry.create("host-name").await?;
//!
//!     let manager = SessionLifecycleManager::new(Arc::clone(&registry));
//!     let (handle, _outbound) = ConnectionHandle::channel(64);
//!     let inbound = futures::stream::iter(vec![Ok::<_, std::io::Error>(
//!         r#"{"type":"JOIN_MEETING","member":"alice"}"#.to_string(),
//!     )]);
//!
//!     let path = format!("session/{}", session_id);
//!     manager.run(&path, handle, inbound, CancellationToken::new()).await;
//!     Ok(())
//! }
//! ```

pub mod connection;
pub mod error;
pub mod lifecycle;
pub mod protocol;
pub mod router;
pub mod session;

// Re-export key types for convenience
pub use connection::{ConnectionHandle, ConnectionId, DEFAULT_SEND_QUEUE};
pub use error::{ProtocolError, SessionError, SignalingError, TransportError};
pub use lifecycle::{DisconnectReason, SessionLifecycleManager};
pub use protocol::{ClientMessage, ServerMessage, Signal, SignalKind};
pub use router::{Broadcast, SessionBinding, SignalingRouter, broadcast};
pub use session::{
    DEFAULT_MAX_CREATE_ATTEMPTS, Session, SessionId, SessionIdGenerator, SessionRegistry,
    SessionSnapshot, UuidGenerator,
};
