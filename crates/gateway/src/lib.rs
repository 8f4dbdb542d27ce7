//! HTTP API gateway for Atomia.
//!
//! Exposes the chat endpoint, session inspection and reset, the service
//! descriptor at `/`, and a `/health` liveness probe.
//!
//! Built on Axum for high performance async HTTP.

pub mod api;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::{Router, extract::State, response::Json, routing::get};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

use atomia_agent::{ChatService, PromptAssembler};
use atomia_config::AppConfig;
use atomia_core::SessionStore;
use atomia_providers::GenerationClient;
use atomia_session::InMemorySessionStore;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub config: AppConfig,
    pub chat: Arc<ChatService>,
    pub start_time: chrono::DateTime<chrono::Utc>,
}

pub type SharedState = Arc<GatewayState>;

impl GatewayState {
    /// Wire the session store, generation client, and chat service from config.
    pub fn from_config(config: AppConfig) -> Self {
        let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new(
            config.session.max_context_messages,
        ));
        let client = Arc::new(GenerationClient::from_config(&config));
        let assembler = PromptAssembler::from_config(&config.prompt);
        Self::new(config, Arc::new(ChatService::new(store, client, assembler)))
    }

    pub fn new(config: AppConfig, chat: Arc<ChatService>) -> Self {
        Self {
            config,
            chat,
            start_time: chrono::Utc::now(),
        }
    }

    /// Whether answers come from the live provider.
    pub fn llm_enabled(&self) -> bool {
        self.chat.client().is_live()
    }
}

/// Build the Axum router with all gateway routes.
///
/// Layers applied:
/// - CORS from `gateway.cors_origins` (any origin by default)
/// - Request body size limit (1 MB)
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.gateway.cors_origins);

    Router::new()
        .route("/health", get(health_handler))
        .merge(api::api_router())
        .with_state(state)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// An empty list or a `*` entry allows every origin, method, and header.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o.trim() == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.trim().parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let state = Arc::new(GatewayState::from_config(config));

    info!(
        addr = %addr,
        llm_enabled = state.llm_enabled(),
        provider = %state.chat.client().provider_name(),
        store = %state.chat.store().name(),
        "Atomia gateway starting"
    );

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Health ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: u64,
    active_sessions: usize,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    let uptime = (chrono::Utc::now() - state.start_time).num_seconds().max(0) as u64;
    // A store failure should not fail the liveness probe
    let active_sessions = state.chat.store().count().await.unwrap_or(0);

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: uptime,
        active_sessions,
    })
}
