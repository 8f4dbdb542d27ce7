//! HTTP API — chat and session endpoints.
//!
//! Endpoints:
//!
//! - `POST /chat`                 — Ask a question, get the answer and context
//! - `GET  /sessions`             — List known sessions
//! - `GET  /history/{session_id}` — Turns of one session
//! - `POST /reset/{session_id}`   — Clear one session's history
//! - `GET  /`                     — Service descriptor

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use atomia_agent::{ChatOutcome, ChatRequest};
use atomia_core::message::{SessionId, Subject, Turn};
use atomia_core::session::SessionSummary;
use atomia_core::{Error, SessionError};

use crate::SharedState;

const SERVICE_NAME: &str = "Atomia Bot — Your AI Doubt Partner for IISER Aspirants";
const CREATOR: &str = "Prep4IISER";

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/", get(root_handler))
        .route("/chat", post(chat_handler))
        .route("/sessions", get(list_sessions_handler))
        .route("/history/{session_id}", get(history_handler))
        .route("/reset/{session_id}", post(reset_handler))
}

// ── DTOs ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionListResponse {
    pub total_sessions: usize,
    pub sessions: Vec<SessionSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub history: Vec<Turn>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResetResponse {
    pub message: String,
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CoreApproach {
    pub explanation_style: String,
    pub tone: String,
    pub focus_level: String,
    pub output_goal: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub status: String,
    pub service_name: String,
    pub version: String,
    pub llm_enabled: bool,
    pub supported_subjects: Vec<Subject>,
    pub core_approach: CoreApproach,
    pub creator: String,
}

fn api_error(err: Error) -> ApiError {
    match err {
        Error::Session(SessionError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                detail: "Session not found".into(),
            }),
        ),
        other => {
            error!(error = %other, "Request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    detail: other.to_string(),
                }),
            )
        }
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatOutcome>, ApiError> {
    info!(has_session = payload.session_id.is_some(), "chat request");

    state.chat.chat(payload).await.map(Json).map_err(api_error)
}

async fn list_sessions_handler(
    State(state): State<SharedState>,
) -> Result<Json<SessionListResponse>, ApiError> {
    let sessions = state
        .chat
        .store()
        .list()
        .await
        .map_err(|e| api_error(e.into()))?;

    Ok(Json(SessionListResponse {
        total_sessions: sessions.len(),
        sessions,
    }))
}

async fn history_handler(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let history = state
        .chat
        .store()
        .get(&SessionId::from(session_id.as_str()))
        .await
        .map_err(|e| api_error(e.into()))?;

    Ok(Json(HistoryResponse {
        session_id,
        history,
    }))
}

async fn reset_handler(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
) -> Result<Json<ResetResponse>, ApiError> {
    state
        .chat
        .reset(&SessionId::from(session_id.as_str()))
        .await
        .map_err(api_error)?;

    Ok(Json(ResetResponse {
        message: "Session reset successfully".into(),
        session_id,
    }))
}

async fn root_handler(State(state): State<SharedState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        status: "online".into(),
        service_name: SERVICE_NAME.into(),
        version: env!("CARGO_PKG_VERSION").into(),
        llm_enabled: state.llm_enabled(),
        supported_subjects: Subject::ALL.to_vec(),
        core_approach: CoreApproach {
            explanation_style: "Step-by-step reasoning with formulas and logic".into(),
            tone: "Calm, encouraging, and academic".into(),
            focus_level: "IISER Aptitude Test (IAT) difficulty".into(),
            output_goal: "Concept clarity and problem-solving approach".into(),
        },
        creator: CREATOR.into(),
    })
}
