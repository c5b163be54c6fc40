//! HTTP server module

mod api;

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::AppState;
use crate::ws::session_ws;

pub use api::{
    CreateMeetingRequest, ErrorResponse, HealthResponse, MEETING_CREATED, MeetingCreatedResponse,
    SessionInfoResponse, SessionListResponse, WELCOME_MESSAGE,
};

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/", get(api::root))
        .route("/create-meeting", post(api::create_meeting))
        .route("/session/:session_id", get(session_ws))
        .route("/api/health", get(api::health))
        .route("/api/sessions", get(api::list_sessions))
        .route("/api/sessions/:session_id", get(api::session_info))
        .with_state(state)
        .layer(cors)
}

/// CORS policy for GET and POST; an empty origin list allows any origin
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(allowed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ServerConfig;
    use axum::http::header;
    use axum_test::TestServer;

    #[tokio::test]
    async fn test_router_has_health_endpoint() {
        let state = Arc::new(AppState::new());
        let router = create_router(state);
        let server = TestServer::new(router).unwrap();

        let response = server.get("/api/health").await;
        response.assert_status_ok();
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin_by_default() {
        let server = TestServer::new(create_router(Arc::new(AppState::new()))).unwrap();

        let response = server
            .get("/")
            .add_header(header::ORIGIN, HeaderValue::from_static("http://localhost:5173"))
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            HeaderValue::from_static("*")
        );
    }

    #[tokio::test]
    async fn test_cors_restricts_to_configured_origins() {
        let config = ServerConfig {
            cors_origins: vec!["https://meet.example.com".to_string()],
            ..ServerConfig::default()
        };
        let server = TestServer::new(create_router(Arc::new(AppState::from_config(config)))).unwrap();

        let allowed = server
            .get("/")
            .add_header(header::ORIGIN, HeaderValue::from_static("https://meet.example.com"))
            .await;
        assert_eq!(
            allowed.header(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            HeaderValue::from_static("https://meet.example.com")
        );

        let denied = server
            .get("/")
            .add_header(header::ORIGIN, HeaderValue::from_static("https://evil.example.com"))
            .await;
        assert!(
            denied
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
    }
}
