//! Shared application state for the meetcode server

use std::sync::Arc;

use chrono::{DateTime, Utc};
use meetcode_core::{SessionLifecycleManager, SessionRegistry};
use tokio_util::sync::CancellationToken;

use crate::ServerConfig;

/// Shared application state accessible by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Registry of every room
    pub registry: Arc<SessionRegistry>,
    /// Runs the read loop of each WebSocket connection
    pub lifecycle: SessionLifecycleManager,
    /// Server settings
    pub config: ServerConfig,
    /// Cancelled when the server shuts down; every connection holds a child
    pub shutdown: CancellationToken,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create a new AppState with default settings
    pub fn new() -> Self {
        Self::from_config(ServerConfig::default())
    }

    /// Create AppState for the given settings
    pub fn from_config(config: ServerConfig) -> Self {
        let registry = Arc::new(
            SessionRegistry::new().with_max_create_attempts(config.max_create_attempts),
        );
        Self::with_registry(config, registry)
    }

    /// Create AppState around an existing registry (for testing)
    pub fn with_registry(config: ServerConfig, registry: Arc<SessionRegistry>) -> Self {
        Self {
            lifecycle: SessionLifecycleManager::new(Arc::clone(&registry)),
            registry,
            config,
            shutdown: CancellationToken::new(),
            started_at: Utc::now(),
        }
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
