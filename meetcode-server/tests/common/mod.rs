//! Shared test utilities for meetcode-server integration tests

pub mod client;

use std::net::SocketAddr;
use std::sync::Arc;

use meetcode_core::SessionId;
use meetcode_server::{AppState, MeetServer, ServerConfig};
use tokio::net::TcpListener;

/// Creates a test server with default config, returns state and address
#[allow(dead_code)]
pub async fn create_test_server() -> (Arc<AppState>, SocketAddr) {
    create_test_server_with_config(ServerConfig::default()).await
}

/// Creates a test server with custom config
#[allow(dead_code)]
pub async fn create_test_server_with_config(config: ServerConfig) -> (Arc<AppState>, SocketAddr) {
    let state = Arc::new(AppState::from_config(config.clone()));

    let server = MeetServer::with_state(config, Arc::clone(&state));
    let addr = spawn_server(server).await;

    (state, addr)
}

/// Creates a room directly in the registry, returns its id
#[allow(dead_code)]
pub async fn create_room(state: &AppState, host: &str) -> String {
    state.registry.create(host).await.unwrap().to_string()
}

/// Waits until a room has `count` attached connections
#[allow(dead_code)]
pub async fn wait_for_connections(state: &AppState, session_id: &str, count: usize) {
    let id = SessionId::normalize(session_id);
    for _ in 0..200 {
        if state.registry.snapshot(&id).await.unwrap().connections == count {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    panic!("Room {} never reached {} connections", session_id, count);
}

/// Spawns server in background task, returns bound address
async fn spawn_server(server: MeetServer) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = server.run_with_listener(listener).await;
    });

    // Brief delay to ensure server is accepting connections
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    addr
}
