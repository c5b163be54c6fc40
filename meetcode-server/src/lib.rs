//! meetcode-server - HTTP and WebSocket server for the meetcode relay
//!
//! This crate wires the room registry and signaling router from
//! `meetcode-core` to the network: a REST endpoint creates rooms, and each
//! peer holds one WebSocket per room over which signaling frames flow.

mod error;
pub mod http;
mod state;
pub mod ws;

use std::sync::Arc;
use std::time::Duration;

use meetcode_core::{DEFAULT_MAX_CREATE_ATTEMPTS, DEFAULT_SEND_QUEUE};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub use error::ServerError;
pub use http::create_router;
pub use state::AppState;

/// Default port for the meetcode server
pub const DEFAULT_PORT: u16 = 8000;
/// Default host for the meetcode server
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default deadline for one WebSocket frame write
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// The main meetcode server
pub struct MeetServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl MeetServer {
    /// Create a new server with fresh state
    pub fn new(config: ServerConfig) -> Self {
        let state = Arc::new(AppState::from_config(config.clone()));
        Self { config, state }
    }

    /// Create a server with custom state (for testing)
    pub fn with_state(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the shared application state
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Token that stops the server and every live connection when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.state.shutdown.clone()
    }

    /// Run the server, binding to the configured address
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.clone(),
                source: e,
            })?;

        self.run_with_listener(listener).await
    }

    /// Run the server on an already bound listener
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<(), ServerError> {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!("meetcode server listening on {}", addr);
        }

        let shutdown = self.state.shutdown.clone();
        let router = create_router(self.state);
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.cancelled_owned())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        tracing::info!("meetcode server stopped");
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
    /// Capacity of each connection's outbound queue
    pub send_queue: usize,
    /// Deadline for writing one frame to a peer
    pub write_timeout: Duration,
    /// Fresh ids tried before room creation reports a conflict
    pub max_create_attempts: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_origins: Vec::new(),
            send_queue: DEFAULT_SEND_QUEUE,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            max_create_attempts: DEFAULT_MAX_CREATE_ATTEMPTS,
        }
    }
}

impl ServerConfig {
    /// Create a new ServerConfig with the specified host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Returns the socket address string (e.g., "0.0.0.0:8000")
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
