//! Generation client — the single boundary between Atomia and its provider.
//!
//! Always yields a [`Generation`]: either the provider's text, the offline
//! fallback when no provider is attached, or a captured [`ProviderError`].
//! Nothing escapes as an `Err`.

use crate::gemini::GeminiProvider;
use atomia_config::{AppConfig, ProviderConfig};
use atomia_core::error::ProviderError;
use atomia_core::provider::GenerationRequest;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Leading text of every offline fallback answer.
pub const OFFLINE_MARKER: &str = "⚠️ Atomia (offline mode)";

/// Number of prompt characters echoed back in offline mode.
pub const OFFLINE_EXCERPT_CHARS: usize = 700;

/// Outcome of one generation call.
#[derive(Debug, Clone)]
pub enum Generation {
    /// Verbatim text from the provider
    Text(String),
    /// No provider attached; carries the head of the prompt
    Offline { excerpt: String },
    /// The provider call failed or timed out
    Failed(ProviderError),
}

impl Generation {
    fn offline(prompt: &str) -> Self {
        Generation::Offline {
            excerpt: prompt.chars().take(OFFLINE_EXCERPT_CHARS).collect(),
        }
    }

    /// The answer text shown to the user.
    pub fn render(&self) -> String {
        match self {
            Generation::Text(text) => text.clone(),
            Generation::Offline { excerpt } => format!(
                "{OFFLINE_MARKER}: Unable to connect to AI engine.\n\n\
                 Here’s a general reasoning outline based on your topic:\n{excerpt}"
            ),
            Generation::Failed(err) => format!("Error generating content: {err}"),
        }
    }

    /// True for anything other than a real provider answer.
    pub fn is_degraded(&self) -> bool {
        !matches!(self, Generation::Text(_))
    }
}

/// Sampling parameters and limits applied to every call.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
    pub timeout: Duration,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::from(&ProviderConfig::default())
    }
}

impl From<&ProviderConfig> for GenerationSettings {
    fn from(config: &ProviderConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            max_output_tokens: config.max_output_tokens,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

pub struct GenerationClient {
    provider: Option<Arc<dyn atomia_core::Provider>>,
    settings: GenerationSettings,
}

impl GenerationClient {
    /// Client backed by a live provider.
    pub fn new(provider: Arc<dyn atomia_core::Provider>, settings: GenerationSettings) -> Self {
        Self {
            provider: Some(provider),
            settings,
        }
    }

    /// Client that always answers with the offline fallback.
    pub fn offline(settings: GenerationSettings) -> Self {
        Self {
            provider: None,
            settings,
        }
    }

    /// Attach Gemini when the config has a key and the provider is enabled.
    pub fn from_config(config: &AppConfig) -> Self {
        let settings = GenerationSettings::from(&config.provider);
        match config.api_key.as_deref() {
            Some(key) if config.llm_enabled() => {
                info!(model = %settings.model, "Gemini provider configured");
                let provider =
                    GeminiProvider::new(key).with_base_url(config.provider.api_url.as_str());
                Self::new(Arc::new(provider), settings)
            }
            _ => {
                warn!(
                    kind = %config.provider.kind,
                    "No usable provider credential, answering in offline mode"
                );
                Self::offline(settings)
            }
        }
    }

    /// Whether a real provider is attached.
    pub fn is_live(&self) -> bool {
        self.provider.is_some()
    }

    pub fn provider_name(&self) -> &str {
        self.provider.as_ref().map(|p| p.name()).unwrap_or("offline")
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Send `prompt` to the provider, capped at `max_output_tokens`.
    pub async fn generate(&self, prompt: &str, max_output_tokens: u32) -> Generation {
        let Some(provider) = &self.provider else {
            debug!("Offline mode, returning fallback answer");
            return Generation::offline(prompt);
        };

        let request = GenerationRequest {
            model: self.settings.model.clone(),
            prompt: prompt.to_string(),
            temperature: self.settings.temperature,
            top_p: self.settings.top_p,
            max_output_tokens,
        };

        match tokio::time::timeout(self.settings.timeout, provider.generate(request)).await {
            Ok(Ok(response)) => {
                debug!(
                    provider = %provider.name(),
                    model = %response.model,
                    chars = response.text.chars().count(),
                    "Generation succeeded"
                );
                Generation::Text(response.text)
            }
            Ok(Err(e)) => {
                warn!(provider = %provider.name(), error = %e, "Generation failed");
                Generation::Failed(e)
            }
            Err(_) => {
                warn!(
                    provider = %provider.name(),
                    timeout_secs = self.settings.timeout.as_secs(),
                    "Generation timed out"
                );
                Generation::Failed(ProviderError::Timeout(format!(
                    "no response within {}s",
                    self.settings.timeout.as_secs()
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use atomia_core::provider::GenerationResponse;
    use std::sync::Mutex;

    /// Records every request and replies with a fixed outcome.
    struct MockProvider {
        outcome: Result<String, ProviderError>,
        seen: Mutex<Vec<GenerationRequest>>,
    }

    impl MockProvider {
        fn replying(outcome: Result<String, ProviderError>) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl atomia_core::Provider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn generate(
            &self,
            request: GenerationRequest,
        ) -> Result<GenerationResponse, ProviderError> {
            let model = request.model.clone();
            self.seen.lock().unwrap().push(request);
            self.outcome.clone().map(|text| GenerationResponse {
                text,
                model,
                usage: None,
            })
        }
    }

    struct HangingProvider;

    #[async_trait]
    impl atomia_core::Provider for HangingProvider {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn generate(
            &self,
            _request: GenerationRequest,
        ) -> Result<GenerationResponse, ProviderError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(ProviderError::Network("unreachable".into()))
        }
    }

    #[tokio::test]
    async fn offline_returns_fixed_notice_with_prompt_head() {
        let client = GenerationClient::offline(GenerationSettings::default());
        let prompt = "x".repeat(1_000);

        let generation = client.generate(&prompt, 800).await;
        let text = generation.render();

        assert!(generation.is_degraded());
        assert!(text.starts_with(
            "⚠️ Atomia (offline mode): Unable to connect to AI engine.\n\n\
             Here’s a general reasoning outline based on your topic:\n"
        ));
        assert!(text.ends_with(&"x".repeat(700)));
        assert!(!text.ends_with(&"x".repeat(701)));
    }

    #[tokio::test]
    async fn offline_is_deterministic() {
        let client = GenerationClient::offline(GenerationSettings::default());
        let a = client.generate("What is entropy?", 800).await.render();
        let b = client.generate("What is entropy?", 800).await.render();
        assert_eq!(a, b);
        assert!(a.ends_with("What is entropy?"));
    }

    #[test]
    fn offline_excerpt_counts_characters_not_bytes() {
        let prompt = "é".repeat(800);
        match Generation::offline(&prompt) {
            Generation::Offline { excerpt } => {
                assert_eq!(excerpt.chars().count(), 700);
                assert_eq!(excerpt.len(), 1_400);
            }
            other => panic!("Expected Offline, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn live_passes_settings_and_returns_text_verbatim() {
        let mock = MockProvider::replying(Ok("  Newton's second law.\n".into()));
        let client = GenerationClient::new(mock.clone(), GenerationSettings::default());

        let generation = client.generate("prompt body", 256).await;
        assert!(!generation.is_degraded());
        assert_eq!(generation.render(), "  Newton's second law.\n");

        let seen = mock.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].prompt, "prompt body");
        assert_eq!(seen[0].max_output_tokens, 256);
        assert!((seen[0].temperature - 0.3).abs() < f32::EPSILON);
        assert!((seen[0].top_p - 0.9).abs() < f32::EPSILON);
        assert_eq!(seen[0].model, "gemini-2.0-flash-exp");
    }

    #[tokio::test]
    async fn provider_error_is_rendered_not_propagated() {
        let mock = MockProvider::replying(Err(ProviderError::RateLimited("Quota exceeded".into())));
        let client = GenerationClient::new(mock, GenerationSettings::default());

        let generation = client.generate("q", 800).await;
        assert!(matches!(
            generation,
            Generation::Failed(ProviderError::RateLimited(_))
        ));
        assert_eq!(
            generation.render(),
            "Error generating content: Rate limited by provider: Quota exceeded"
        );
    }

    #[tokio::test]
    async fn timeout_becomes_failed_generation() {
        let settings = GenerationSettings {
            timeout: Duration::from_millis(20),
            ..GenerationSettings::default()
        };
        let client = GenerationClient::new(Arc::new(HangingProvider), settings);

        let generation = client.generate("q", 800).await;
        assert!(matches!(
            generation,
            Generation::Failed(ProviderError::Timeout(_))
        ));
        assert!(generation.render().starts_with("Error generating content: "));
    }

    #[test]
    fn from_config_without_key_is_offline() {
        let client = GenerationClient::from_config(&AppConfig::default());
        assert!(!client.is_live());
        assert_eq!(client.provider_name(), "offline");
    }

    #[test]
    fn from_config_with_key_is_live() {
        let mut config = AppConfig::default();
        config.api_key = Some("AIza-test".into());
        let client = GenerationClient::from_config(&config);
        assert!(client.is_live());
        assert_eq!(client.provider_name(), "gemini");
        assert_eq!(client.settings().max_output_tokens, 800);
        assert_eq!(client.settings().timeout, Duration::from_secs(60));
    }

    #[test]
    fn offline_kind_ignores_key() {
        let mut config = AppConfig::default();
        config.api_key = Some("AIza-test".into());
        config.provider.kind = "offline".into();
        assert!(!GenerationClient::from_config(&config).is_live());
    }
}
