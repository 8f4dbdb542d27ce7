//! Chat orchestration — one user message in, one tutor answer out.

use crate::prompt::PromptAssembler;
use atomia_core::message::{SessionId, Subject, Turn};
use atomia_core::session::SessionStore;
use atomia_providers::GenerationClient;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Fixed confidence reported with every answer.
pub const CONFIDENCE: f32 = 0.9;

/// An incoming chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Reuse an existing conversation; blank or absent starts a new one
    #[serde(default)]
    pub session_id: Option<String>,
    pub message: String,
    #[serde(default)]
    pub subject: Option<Subject>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            session_id: None,
            message: message.into(),
            subject: None,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subject = Some(subject);
        self
    }
}

/// The answer plus the session's history after the exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOutcome {
    pub session_id: String,
    pub subject: Option<Subject>,
    pub text_response: String,
    pub confidence: f32,
    pub context_used: Vec<Turn>,
}

/// Runs chat exchanges against a session store and a generation client.
///
/// Exchanges for one session id are serialized through that session's lane,
/// a fair async mutex, so they complete in arrival order. Different sessions
/// never wait on each other.
pub struct ChatService {
    store: Arc<dyn SessionStore>,
    client: Arc<GenerationClient>,
    assembler: PromptAssembler,
    lanes: std::sync::Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ChatService {
    pub fn new(
        store: Arc<dyn SessionStore>,
        client: Arc<GenerationClient>,
        assembler: PromptAssembler,
    ) -> Self {
        Self {
            store,
            client,
            assembler,
            lanes: std::sync::Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn client(&self) -> &Arc<GenerationClient> {
        &self.client
    }

    fn lane(&self, session_id: &SessionId) -> Arc<Mutex<()>> {
        let mut lanes = self.lanes.lock().unwrap_or_else(|e| e.into_inner());
        lanes
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Empty a session's history.
    ///
    /// Waits for any exchange already running on the session, so a reset never
    /// lands between a question and its answer.
    pub async fn reset(&self, session_id: &SessionId) -> atomia_core::Result<()> {
        let lane = self.lane(session_id);
        let _turn = lane.lock().await;

        self.store.reset(session_id).await?;
        info!(session_id = %session_id, "Session reset");
        Ok(())
    }

    /// Handle one chat message.
    ///
    /// Provider trouble never fails the call: it shows up in `text_response`.
    /// Only session store errors are returned.
    pub async fn chat(&self, request: ChatRequest) -> atomia_core::Result<ChatOutcome> {
        let session_id = SessionId::resolve(request.session_id.as_deref());
        let lane = self.lane(&session_id);
        let _turn = lane.lock().await;

        info!(
            session_id = %session_id,
            subject = ?request.subject,
            chars = request.message.chars().count(),
            "Processing chat message"
        );

        self.store.ensure(&session_id).await?;
        let history = self
            .store
            .append(&session_id, Turn::user(&request.message, request.subject))
            .await?;

        let prompt = self
            .assembler
            .assemble(request.subject, &history, &request.message);
        debug!(
            session_id = %session_id,
            turns = history.len(),
            prompt_chars = prompt.chars().count(),
            "Prompt assembled"
        );

        let generation = self
            .client
            .generate(&prompt, self.client.settings().max_output_tokens)
            .await;
        if generation.is_degraded() {
            warn!(
                session_id = %session_id,
                provider = %self.client.provider_name(),
                "Answering with degraded response"
            );
        }
        let text_response = generation.render();

        let context_used = self
            .store
            .append(
                &session_id,
                Turn::assistant(&text_response, request.subject),
            )
            .await?;

        Ok(ChatOutcome {
            session_id: session_id.to_string(),
            subject: request.subject,
            text_response,
            confidence: CONFIDENCE,
            context_used,
        })
    }
}
