//! Session identifiers

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Path prefix peers use when they address a room by its URL
const SESSION_PATH_PREFIX: &str = "session/";

/// Identifier of one room in the registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Reduce a path-like reference to the bare identifier
    ///
    /// `"session/ABC"`, `"/session/ABC"` and `"ABC"` all yield `"ABC"`.
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim().trim_start_matches('/');
        let bare = trimmed
            .strip_prefix(SESSION_PATH_PREFIX)
            .unwrap_or(trimmed);
        Self(bare.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self::normalize(value)
    }
}

/// Source of fresh session identifiers
pub trait SessionIdGenerator: Send + Sync {
    fn generate(&self) -> SessionId;
}

/// Issues random UUID v4 identifiers
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl SessionIdGenerator for UuidGenerator {
    fn generate(&self) -> SessionId {
        SessionId(Uuid::new_v4().to_string())
    }
}
