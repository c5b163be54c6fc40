//! WebSocket module for signaling connections

mod connection;

pub use connection::session_ws;
