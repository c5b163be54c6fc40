//! Error types for meetcode-core

use thiserror::Error;

/// Top-level error type for signaling operations
#[derive(Error, Debug)]
pub enum SignalingError {
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Errors raised by the session registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Session id collision after {attempts} attempts")]
    Conflict { attempts: usize },
}

/// Malformed or unintelligible inbound messages
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Message is not a JSON object")]
    NotAnObject,

    #[error("Message type not found")]
    MissingType,

    #[error("Message type is not a string")]
    InvalidType,

    #[error("{kind} message is missing field '{field}'")]
    MissingField { kind: &'static str, field: &'static str },
}

/// Read or write failures on a connection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Send queue full")]
    QueueFull,

    #[error("Connection closed")]
    Closed,

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Read error: {0}")]
    Read(String),
}
