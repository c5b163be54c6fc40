//! Signaling wire protocol
//!
//! Every frame is a JSON object with a `type` discriminator. Negotiation
//! payloads (`offer`, `answer`, `candidate`) are carried as opaque
//! [`serde_json::Value`]s and relayed untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ProtocolError, TransportError};

/// The three negotiation message kinds the router relays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Offer,
    Answer,
    Candidate,
}

impl SignalKind {
    /// Wire value of the `type` field
    pub fn type_tag(self) -> &'static str {
        match self {
            SignalKind::Offer => "OFFER",
            SignalKind::Answer => "ANSWER",
            SignalKind::Candidate => "CANDIDATE",
        }
    }

    /// Name of the field holding the opaque payload
    pub fn payload_field(self) -> &'static str {
        match self {
            SignalKind::Offer => "offer",
            SignalKind::Answer => "answer",
            SignalKind::Candidate => "candidate",
        }
    }
}

/// A negotiation message addressed to a room
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    /// Session id as sent by the peer (not yet normalized)
    pub session_id: String,
    /// Member the payload originates from
    pub member: String,
    /// Opaque negotiation payload
    pub payload: Value,
}

impl Signal {
    fn from_object(kind: SignalKind, map: &mut Map<String, Value>) -> Result<Self, ProtocolError> {
        let tag = kind.type_tag();
        let session_id = take_string(map, "sessionID").ok_or(ProtocolError::MissingField {
            kind: tag,
            field: "sessionID",
        })?;
        let member = take_string(map, "member").ok_or(ProtocolError::MissingField {
            kind: tag,
            field: "member",
        })?;
        let payload = map
            .remove(kind.payload_field())
            .ok_or(ProtocolError::MissingField {
                kind: tag,
                field: kind.payload_field(),
            })?;

        Ok(Self {
            session_id,
            member,
            payload,
        })
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

/// Messages sent from a peer to the relay
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    /// Join the room named by the connection target.
    /// An absent member decodes as empty and is rejected by the router.
    JoinMeeting { member: String },
    Offer(Signal),
    Answer(Signal),
    Candidate(Signal),
    /// Any other `type`; kept only for logging
    Unknown { kind: String, raw: Value },
}

impl ClientMessage {
    /// Decode one text frame
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let mut raw: Value = serde_json::from_str(text)?;
        let map = raw.as_object_mut().ok_or(ProtocolError::NotAnObject)?;

        let kind = match map.get("type") {
            Some(Value::String(kind)) => kind.clone(),
            Some(_) => return Err(ProtocolError::InvalidType),
            None => return Err(ProtocolError::MissingType),
        };

        match kind.as_str() {
            "JOIN_MEETING" => Ok(ClientMessage::JoinMeeting {
                member: take_string(map, "member").unwrap_or_default(),
            }),
            "OFFER" => Signal::from_object(SignalKind::Offer, map).map(ClientMessage::Offer),
            "ANSWER" => Signal::from_object(SignalKind::Answer, map).map(ClientMessage::Answer),
            "CANDIDATE" => {
                Signal::from_object(SignalKind::Candidate, map).map(ClientMessage::Candidate)
            }
            _ => Ok(ClientMessage::Unknown { kind, raw }),
        }
    }

    /// Wire value of the `type` field
    pub fn type_tag(&self) -> &str {
        match self {
            ClientMessage::JoinMeeting { .. } => "JOIN_MEETING",
            ClientMessage::Offer(_) => SignalKind::Offer.type_tag(),
            ClientMessage::Answer(_) => SignalKind::Answer.type_tag(),
            ClientMessage::Candidate(_) => SignalKind::Candidate.type_tag(),
            ClientMessage::Unknown { kind, .. } => kind,
        }
    }
}

/// Messages sent from the relay to a peer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    /// A required field was missing or empty
    InvalidRequest,

    /// The addressed room does not exist
    SessionNotFound,

    /// Someone joined the room
    NewMember {
        member: String,
        #[serde(rename = "sessionID")]
        session_id: String,
    },

    Offer {
        offer: Value,
        member: String,
        #[serde(rename = "sessionID")]
        session_id: String,
    },

    Answer {
        answer: Value,
        member: String,
        #[serde(rename = "sessionID")]
        session_id: String,
    },

    Candidate {
        candidate: Value,
        member: String,
        #[serde(rename = "sessionID")]
        session_id: String,
    },
}

impl ServerMessage {
    /// Build the envelope relayed to peers for a negotiation message
    pub fn relay(kind: SignalKind, session_id: impl Into<String>, signal: Signal) -> Self {
        let session_id = session_id.into();
        let Signal {
            member, payload, ..
        } = signal;
        match kind {
            SignalKind::Offer => ServerMessage::Offer {
                offer: payload,
                member,
                session_id,
            },
            SignalKind::Answer => ServerMessage::Answer {
                answer: payload,
                member,
                session_id,
            },
            SignalKind::Candidate => ServerMessage::Candidate {
                candidate: payload,
                member,
                session_id,
            },
        }
    }

    pub fn encode(&self) -> Result<String, TransportError> {
        serde_json::to_string(self).map_err(|e| TransportError::Encode(e.to_string()))
    }
}
