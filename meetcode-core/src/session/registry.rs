//! SessionRegistry for tracking rooms
//!
//! The registry exclusively owns every [`Session`]. The map itself is behind
//! a read/write lock that is only held for insertion and lookup; roster
//! mutation goes through each session's own lock.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::connection::{ConnectionHandle, ConnectionId};
use crate::error::SessionError;

use super::id::{SessionId, SessionIdGenerator, UuidGenerator};
use super::state::{Session, SessionSnapshot};

/// Default number of id generations tried before giving up with `Conflict`
pub const DEFAULT_MAX_CREATE_ATTEMPTS: usize = 3;

/// Registry of all rooms in the process
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Arc<Session>>>,
    id_generator: Box<dyn SessionIdGenerator>,
    max_create_attempts: usize,
}

impl SessionRegistry {
    /// Create a registry issuing UUID identifiers
    pub fn new() -> Self {
        Self::with_generator(UuidGenerator)
    }

    /// Create a registry with a custom id source
    pub fn with_generator(generator: impl SessionIdGenerator + 'static) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            id_generator: Box::new(generator),
            max_create_attempts: DEFAULT_MAX_CREATE_ATTEMPTS,
        }
    }

    /// Set how many fresh ids `create` tries before failing
    pub fn with_max_create_attempts(mut self, attempts: usize) -> Self {
        self.max_create_attempts = attempts.max(1);
        self
    }

    /// Create a new room for `host`
    ///
    /// Never overwrites an existing room: on an id collision a fresh id is
    /// generated, up to the configured attempt limit.
    pub async fn create(&self, host: &str) -> Result<SessionId, SessionError> {
        if host.trim().is_empty() {
            return Err(SessionError::InvalidRequest("host is required".to_string()));
        }

        for attempt in 1..=self.max_create_attempts {
            let id = self.id_generator.generate();
            let mut sessions = self.sessions.write().await;
            match sessions.entry(id.clone()) {
                Entry::Occupied(_) => {
                    warn!(session_id = %id, attempt, "Generated session id already exists");
                }
                Entry::Vacant(slot) => {
                    slot.insert(Arc::new(Session::new(id.clone(), host)));
                    info!(session_id = %id, host, "Session created");
                    return Ok(id);
                }
            }
        }

        Err(SessionError::Conflict {
            attempts: self.max_create_attempts,
        })
    }

    /// Resolve a room by id
    pub async fn lookup(&self, id: &SessionId) -> Result<Arc<Session>, SessionError> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    /// Append `member` and attach `connection` to a room
    ///
    /// Returns the other connections that were attached at the moment of
    /// the join.
    pub async fn add_member(
        &self,
        id: &SessionId,
        member: &str,
        connection: ConnectionHandle,
    ) -> Result<Vec<ConnectionHandle>, SessionError> {
        let session = self.lookup(id).await?;
        let peers = session.join(member, connection).await;
        debug!(session_id = %id, member, peers = peers.len(), "Member joined");
        Ok(peers)
    }

    /// Detach a connection from a room; the member list is left as is
    pub async fn remove_connection(
        &self,
        id: &SessionId,
        connection: ConnectionId,
    ) -> Result<(), SessionError> {
        let session = self.lookup(id).await?;
        if session.detach(connection).await {
            debug!(session_id = %id, connection_id = %connection, "Connection detached");
        }
        Ok(())
    }

    /// Copy of a room's connections other than `except`
    pub async fn peers_except(
        &self,
        id: &SessionId,
        except: ConnectionId,
    ) -> Result<Vec<ConnectionHandle>, SessionError> {
        let session = self.lookup(id).await?;
        Ok(session.peers_except(except).await)
    }

    /// Point-in-time view of one room
    pub async fn snapshot(&self, id: &SessionId) -> Result<SessionSnapshot, SessionError> {
        let session = self.lookup(id).await?;
        Ok(session.snapshot().await)
    }

    /// Point-in-time views of every room, oldest first
    pub async fn summaries(&self) -> Vec<SessionSnapshot> {
        let sessions: Vec<Arc<Session>> = self.sessions.read().await.values().cloned().collect();
        let mut snapshots = Vec::with_capacity(sessions.len());
        for session in sessions {
            snapshots.push(session.snapshot().await);
        }
        snapshots.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        snapshots
    }

    /// Number of rooms
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
