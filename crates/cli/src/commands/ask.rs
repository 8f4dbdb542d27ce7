//! `atomia ask` — One question, answered in-process.

use std::sync::Arc;

use atomia_agent::{ChatRequest, ChatService, PromptAssembler};
use atomia_config::AppConfig;
use atomia_core::{SessionStore, Subject};
use atomia_providers::GenerationClient;
use atomia_session::InMemorySessionStore;

pub async fn run(
    message: String,
    subject: Option<Subject>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if message.trim().is_empty() {
        return Err("Message must not be empty".into());
    }

    if !config.llm_enabled() {
        eprintln!("⚠️  No Gemini API key configured, answering in offline mode.");
        eprintln!(
            "   Set GEMINI_API_KEY or add api_key to {}",
            AppConfig::config_dir().join("config.toml").display()
        );
        eprintln!();
    }

    let store: Arc<dyn SessionStore> =
        Arc::new(InMemorySessionStore::new(config.session.max_context_messages));
    let client = Arc::new(GenerationClient::from_config(&config));
    let service = ChatService::new(store, client, PromptAssembler::from_config(&config.prompt));

    let mut request = ChatRequest::new(message);
    if let Some(subject) = subject {
        request = request.with_subject(subject);
    }

    let outcome = service.chat(request).await?;

    if let Some(subject) = outcome.subject {
        println!("📘 {subject}\n");
    }
    println!("{}", outcome.text_response);

    Ok(())
}
