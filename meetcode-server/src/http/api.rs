//! REST API handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use meetcode_core::{SessionError, SessionId, SessionSnapshot};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::AppState;

/// Body of `GET /`
pub const WELCOME_MESSAGE: &str = "Welcome to the Meetcode Api";

/// `type` of a successful room creation response
pub const MEETING_CREATED: &str = "MEETING_CREATED";

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn session_error(e: SessionError) -> ApiError {
    match e {
        SessionError::InvalidRequest(_) => {
            api_error(StatusCode::BAD_REQUEST, "Invalid request, host is required")
        }
        SessionError::Conflict { .. } => api_error(StatusCode::CONFLICT, "Session ID already exists"),
        SessionError::NotFound(id) => {
            api_error(StatusCode::NOT_FOUND, format!("Session '{}' not found", id))
        }
    }
}

/// GET / - Welcome text
pub async fn root() -> &'static str {
    WELCOME_MESSAGE
}

/// Request body for POST /create-meeting
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateMeetingRequest {
    /// Identifier of the room's creator
    #[serde(default)]
    pub host: String,
}

/// Response for POST /create-meeting
#[derive(Debug, Serialize, Deserialize)]
pub struct MeetingCreatedResponse {
    /// Always `MEETING_CREATED`
    #[serde(rename = "type")]
    pub kind: String,
    /// Id of the new room
    pub endpoint: String,
}

/// POST /create-meeting - Create a room
pub async fn create_meeting(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateMeetingRequest>, JsonRejection>,
) -> Result<Json<MeetingCreatedResponse>, ApiError> {
    let Json(request) = body.map_err(|e| {
        warn!("Rejected create-meeting body: {}", e);
        api_error(StatusCode::BAD_REQUEST, "Invalid request, host is required")
    })?;

    let session_id = state
        .registry
        .create(&request.host)
        .await
        .map_err(session_error)?;

    Ok(Json(MeetingCreatedResponse {
        kind: MEETING_CREATED.to_string(),
        endpoint: session_id.to_string(),
    }))
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the server
    pub status: String,
    /// Server version
    pub version: String,
    /// Seconds since server started
    pub uptime_seconds: i64,
    /// Number of rooms
    pub active_sessions: usize,
}

/// GET /api/health - Server status, version, uptime and room count
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        active_sessions: state.registry.len().await,
    })
}

/// Response for GET /api/sessions/:session_id
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionInfoResponse {
    pub id: String,
    pub host: String,
    /// When the room was created (RFC 3339)
    pub created_at: String,
    /// Members in join order
    pub members: Vec<String>,
    /// Number of attached connections
    pub connections: usize,
}

impl From<SessionSnapshot> for SessionInfoResponse {
    fn from(snapshot: SessionSnapshot) -> Self {
        Self {
            id: snapshot.id.to_string(),
            host: snapshot.host,
            created_at: snapshot.created_at.to_rfc3339(),
            members: snapshot.members,
            connections: snapshot.connections,
        }
    }
}

/// Response for listing rooms
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionListResponse {
    /// Rooms, oldest first
    pub sessions: Vec<SessionInfoResponse>,
}

/// GET /api/sessions - List every room
pub async fn list_sessions(State(state): State<Arc<AppState>>) -> Json<SessionListResponse> {
    let sessions = state
        .registry
        .summaries()
        .await
        .into_iter()
        .map(SessionInfoResponse::from)
        .collect();

    Json(SessionListResponse { sessions })
}

/// GET /api/sessions/:session_id - Inspect one room
pub async fn session_info(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionInfoResponse>, ApiError> {
    let id = SessionId::normalize(&session_id);
    let snapshot = state.registry.snapshot(&id).await.map_err(session_error)?;

    Ok(Json(snapshot.into()))
}
