//! Signaling router
//!
//! Turns one inbound message into zero or more outbound messages. Membership
//! events mutate the [`SessionRegistry`]; negotiation events are fanned out
//! to every other connection in the addressed room.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::connection::ConnectionHandle;
use crate::error::{SessionError, SignalingError, TransportError};
use crate::protocol::{ClientMessage, ServerMessage, Signal, SignalKind};
use crate::session::{SessionId, SessionRegistry};

/// Which room a connection addresses and which one it has joined
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionBinding {
    hint: SessionId,
    joined: Option<SessionId>,
}

impl SessionBinding {
    /// Bind to the room named in the connection target (normalized)
    pub fn new(hint: &str) -> Self {
        Self {
            hint: SessionId::normalize(hint),
            joined: None,
        }
    }

    pub fn hint(&self) -> &SessionId {
        &self.hint
    }

    /// Room this connection is currently attached to, if any
    pub fn joined(&self) -> Option<&SessionId> {
        self.joined.as_ref()
    }

    pub(crate) fn take_joined(&mut self) -> Option<SessionId> {
        self.joined.take()
    }
}

/// Outcome of one fan-out
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Broadcast {
    pub delivered: usize,
    pub failed: usize,
}

/// Send one message to each peer, isolating per-recipient failures
///
/// A peer whose queue is full misses this message and has its connection
/// cancelled.
pub fn broadcast(
    peers: &[ConnectionHandle],
    message: &ServerMessage,
) -> Result<Broadcast, TransportError> {
    let json = message.encode()?;
    let mut tally = Broadcast::default();

    for peer in peers {
        match peer.try_send_text(json.clone()) {
            Ok(()) => tally.delivered += 1,
            Err(e) => {
                warn!(connection_id = %peer.id(), error = %e, "Failed to deliver message to peer");
                tally.failed += 1;
            }
        }
    }

    Ok(tally)
}

/// Routes inbound messages for every connection
#[derive(Clone)]
pub struct SignalingRouter {
    registry: Arc<SessionRegistry>,
}

impl SignalingRouter {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Decode and route one text frame
    ///
    /// Errors are protocol errors (the frame was dropped) or a failure to
    /// reply to the sender. Neither should end the connection.
    pub async fn route_text(
        &self,
        sender: &ConnectionHandle,
        binding: &mut SessionBinding,
        text: &str,
    ) -> Result<(), SignalingError> {
        let message = ClientMessage::decode(text)?;
        self.route(sender, binding, message).await
    }

    /// Route one decoded message
    pub async fn route(
        &self,
        sender: &ConnectionHandle,
        binding: &mut SessionBinding,
        message: ClientMessage,
    ) -> Result<(), SignalingError> {
        debug!(connection_id = %sender.id(), kind = message.type_tag(), "Routing message");

        match message {
            ClientMessage::JoinMeeting { member } => self.join(sender, binding, &member).await,
            ClientMessage::Offer(signal) => self.relay(SignalKind::Offer, sender, signal).await,
            ClientMessage::Answer(signal) => self.relay(SignalKind::Answer, sender, signal).await,
            ClientMessage::Candidate(signal) => {
                self.relay(SignalKind::Candidate, sender, signal).await
            }
            ClientMessage::Unknown { kind, raw } => {
                warn!(kind = %kind, raw = %raw, "Unknown message type");
                Ok(())
            }
        }
    }

    async fn join(
        &self,
        sender: &ConnectionHandle,
        binding: &mut SessionBinding,
        member: &str,
    ) -> Result<(), SignalingError> {
        if member.is_empty() {
            debug!(connection_id = %sender.id(), "Join without member");
            sender.send(&ServerMessage::InvalidRequest)?;
            return Ok(());
        }

        let target = binding.hint.clone();
        if target.is_empty() {
            sender.send(&ServerMessage::SessionNotFound)?;
            return Ok(());
        }

        let peers = match self.registry.add_member(&target, member, sender.clone()).await {
            Ok(peers) => peers,
            Err(SessionError::NotFound(_)) => {
                warn!(session_id = %target, "Session does not exist");
                sender.send(&ServerMessage::SessionNotFound)?;
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        binding.joined = Some(target.clone());

        let notice = ServerMessage::NewMember {
            member: member.to_string(),
            session_id: target.to_string(),
        };
        let tally = broadcast(&peers, &notice)?;
        debug!(
            session_id = %target,
            member,
            delivered = tally.delivered,
            failed = tally.failed,
            "Notified peers about new member"
        );

        Ok(())
    }

    async fn relay(
        &self,
        kind: SignalKind,
        sender: &ConnectionHandle,
        signal: Signal,
    ) -> Result<(), SignalingError> {
        let session_id = SessionId::normalize(&signal.session_id);

        let peers = match self.registry.peers_except(&session_id, sender.id()).await {
            Ok(peers) => peers,
            Err(SessionError::NotFound(_)) => {
                warn!(
                    session_id = %session_id,
                    kind = kind.type_tag(),
                    "Session not found for signaling message"
                );
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let member = signal.member.clone();
        let envelope = ServerMessage::relay(kind, session_id.as_str(), signal);
        let tally = broadcast(&peers, &envelope)?;
        debug!(
            session_id = %session_id,
            kind = kind.type_tag(),
            member = %member,
            delivered = tally.delivered,
            failed = tally.failed,
            "Relayed signaling message"
        );

        Ok(())
    }

    /// Detach `connection` from `session_id`, tolerating a missing room
    pub(crate) async fn detach(&self, session_id: &SessionId, connection: &ConnectionHandle) {
        if let Err(e) = self
            .registry
            .remove_connection(session_id, connection.id())
            .await
        {
            debug!(session_id = %session_id, error = %e, "Detach from missing session");
        }
    }
}
