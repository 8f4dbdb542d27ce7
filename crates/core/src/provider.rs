//! Provider trait — the abstraction over the text-generation backend.
//!
//! A Provider takes one fully assembled prompt and returns generated text.
//! Atomia talks to a single backend (Gemini); the trait exists so the
//! request handler can be exercised against mocks.

use crate::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The model to use (e.g., "gemini-2.0-flash-exp")
    pub model: String,

    /// The assembled prompt text
    pub prompt: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Nucleus sampling cut-off
    pub top_p: f32,

    /// Cap on generated tokens
    pub max_output_tokens: u32,
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// The generated text, verbatim
    pub text: String,

    /// Which model actually responded
    pub model: String,

    /// Token usage statistics, when the provider reports them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send a prompt and get the generated text back.
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<GenerationResponse, ProviderError>;
}
