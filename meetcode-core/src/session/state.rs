//! Session entity
//!
//! A [`Session`] is one room. Its immutable identity lives directly on the
//! struct; the mutable roster (members and attached connections) sits behind
//! a lock owned by this session alone, so rooms never contend with each other.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::connection::{ConnectionHandle, ConnectionId};

use super::id::SessionId;

/// Mutable part of a room
#[derive(Debug, Default)]
struct Roster {
    /// Append-only, in join order
    members: Vec<String>,
    /// Attached connections, in attach order
    connections: Vec<ConnectionHandle>,
}

impl Roster {
    fn others(&self, except: ConnectionId) -> Vec<ConnectionHandle> {
        self.connections
            .iter()
            .filter(|c| c.id() != except)
            .cloned()
            .collect()
    }
}

/// One room
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    created_at: DateTime<Utc>,
    host: String,
    roster: Mutex<Roster>,
}

impl Session {
    pub fn new(id: SessionId, host: impl Into<String>) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            host: host.into(),
            roster: Mutex::new(Roster::default()),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Record a member and attach its connection
    ///
    /// Returns the other connections attached at the moment of the join.
    /// A connection already attached is not attached twice.
    pub async fn join(
        &self,
        member: impl Into<String>,
        connection: ConnectionHandle,
    ) -> Vec<ConnectionHandle> {
        let mut roster = self.roster.lock().await;
        roster.members.push(member.into());
        let id = connection.id();
        if !roster.connections.iter().any(|c| c.id() == id) {
            roster.connections.push(connection);
        }
        roster.others(id)
    }

    /// Detach a connection; members are historical and stay
    ///
    /// Returns whether the connection was attached.
    pub async fn detach(&self, connection: ConnectionId) -> bool {
        let mut roster = self.roster.lock().await;
        let before = roster.connections.len();
        roster.connections.retain(|c| c.id() != connection);
        roster.connections.len() != before
    }

    /// Copy of the attached connections other than `except`
    pub async fn peers_except(&self, except: ConnectionId) -> Vec<ConnectionHandle> {
        self.roster.lock().await.others(except)
    }

    pub async fn members(&self) -> Vec<String> {
        self.roster.lock().await.members.clone()
    }

    #[cfg(test)]
    pub(crate) async fn connection_ids(&self) -> Vec<ConnectionId> {
        self.roster
            .lock()
            .await
            .connections
            .iter()
            .map(ConnectionHandle::id)
            .collect()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let roster = self.roster.lock().await;
        SessionSnapshot {
            id: self.id.clone(),
            created_at: self.created_at,
            host: self.host.clone(),
            members: roster.members.clone(),
            connections: roster.connections.len(),
        }
    }
}

/// Point-in-time view of a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    pub host: String,
    pub members: Vec<String>,
    /// Number of attached connections
    pub connections: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(SessionId::new("room"), "host-1")
    }

    #[tokio::test]
    async fn join_returns_peers_present_before() {
        let session = session();
        let (a, _ra) = ConnectionHandle::channel(1);
        let (b, _rb) = ConnectionHandle::channel(1);

        assert!(session.join("alice", a.clone()).await.is_empty());
        let peers = session.join("bob", b.clone()).await;

        assert_eq!(peers, vec![a]);
        assert_eq!(session.members().await, vec!["alice", "bob"]);
    }

    #[tokio::test]
    async fn rejoin_keeps_connection_once() {
        let session = session();
        let (a, _ra) = ConnectionHandle::channel(1);

        session.join("alice", a.clone()).await;
        session.join("alice", a.clone()).await;

        assert_eq!(session.members().await, vec!["alice", "alice"]);
        assert_eq!(session.connection_ids().await, vec![a.id()]);
    }

    #[tokio::test]
    async fn detach_keeps_members() {
        let session = session();
        let (a, _ra) = ConnectionHandle::channel(1);

        session.join("alice", a.clone()).await;
        assert!(session.detach(a.id()).await);
        assert!(!session.detach(a.id()).await);

        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.members, vec!["alice"]);
        assert_eq!(snapshot.connections, 0);
        assert_eq!(snapshot.host, "host-1");
    }
}
