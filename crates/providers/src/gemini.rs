//! Google Gemini provider implementation.
//!
//! Uses the `models/{model}:generateContent` endpoint of the Generative
//! Language API with a single user turn carrying the assembled prompt.
//!
//! Features:
//! - `x-goog-api-key` header authentication
//! - Sampling parameters sent as `generationConfig`
//! - Safety blocks and empty candidates reported as errors, not empty text

use async_trait::async_trait;
use atomia_core::error::ProviderError;
use atomia_core::provider::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini `generateContent` provider.
pub struct GeminiProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider against the public endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: "gemini".into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    fn request_body(request: &GenerationRequest) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".into()),
                parts: vec![GeminiPart {
                    text: Some(request.prompt.clone()),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: request.temperature,
                top_p: request.top_p,
                max_output_tokens: request.max_output_tokens,
            },
        }
    }

    /// Pull the answer text out of a `generateContent` response.
    fn response_to_generation(
        resp: GeminiResponse,
        requested_model: &str,
    ) -> std::result::Result<GenerationResponse, ProviderError> {
        let Some(candidate) = resp.candidates.first() else {
            let reason = resp
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map(|r| format!("prompt blocked ({r})"))
                .unwrap_or_else(|| "response contained no candidates".into());
            return Err(ProviderError::EmptyResponse(reason));
        };

        let text: String = candidate
            .content
            .as_ref()
            .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect())
            .unwrap_or_default();

        if text.is_empty() {
            let reason = candidate
                .finish_reason
                .as_deref()
                .map(|r| format!("candidate finished with {r} and no text"))
                .unwrap_or_else(|| "candidate contained no text".into());
            return Err(ProviderError::EmptyResponse(reason));
        }

        let usage = resp.usage_metadata.map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });

        Ok(GenerationResponse {
            text,
            model: resp
                .model_version
                .unwrap_or_else(|| requested_model.to_string()),
            usage,
        })
    }

    /// Prefer the `error.message` field of a Google API error body.
    fn error_message(body: &str) -> String {
        serde_json::from_str::<GeminiErrorBody>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.to_string())
    }
}

#[async_trait]
impl atomia_core::Provider for GeminiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<GenerationResponse, ProviderError> {
        let url = self.endpoint(&request.model);
        let body = Self::request_body(&request);

        debug!(
            provider = "gemini",
            model = %request.model,
            prompt_chars = request.prompt.chars().count(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_body = response.text().await.unwrap_or_default();
            let message = Self::error_message(&error_body);
            warn!(status, message = %message, "Gemini API error");
            return Err(match status {
                429 => ProviderError::RateLimited(message),
                401 | 403 => ProviderError::AuthenticationFailed(message),
                404 => ProviderError::ModelNotFound(request.model),
                _ => ProviderError::ApiError {
                    status_code: status,
                    message,
                },
            });
        }

        let api_resp: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        let generation = Self::response_to_generation(api_resp, &request.model)?;
        if let Some(usage) = &generation.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Gemini usage"
            );
        }
        Ok(generation)
    }
}

// --- Gemini API types ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsage>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use atomia_core::Provider;
    use axum::{Json, Router, http::StatusCode, routing::post};

    fn request(prompt: &str) -> GenerationRequest {
        GenerationRequest {
            model: "gemini-2.0-flash-exp".into(),
            prompt: prompt.into(),
            temperature: 0.3,
            top_p: 0.9,
            max_output_tokens: 800,
        }
    }

    /// Serve `router` on an ephemeral local port and return its base URL.
    async fn spawn_mock(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v1beta")
    }

    #[test]
    fn constructor() {
        let provider = GeminiProvider::new("key").with_base_url("http://localhost:9/v1beta/");
        assert_eq!(provider.name(), "gemini");
        assert_eq!(
            provider.endpoint("gemini-pro"),
            "http://localhost:9/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn request_body_carries_sampling_parameters() {
        let body = serde_json::to_value(GeminiProvider::request_body(&request("Explain F=ma")))
            .unwrap();
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Explain F=ma");
        let cfg = &body["generationConfig"];
        assert!((cfg["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
        assert!((cfg["topP"].as_f64().unwrap() - 0.9).abs() < 1e-6);
        assert_eq!(cfg["maxOutputTokens"], 800);
    }

    #[test]
    fn parse_text_response() {
        let resp: GeminiResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Force equals "}, {"text": "mass times acceleration."}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 7, "totalTokenCount": 19},
            "modelVersion": "gemini-2.0-flash-exp"
        }))
        .unwrap();

        let generation = GeminiProvider::response_to_generation(resp, "fallback-model").unwrap();
        assert_eq!(generation.text, "Force equals mass times acceleration.");
        assert_eq!(generation.model, "gemini-2.0-flash-exp");
        assert_eq!(generation.usage.unwrap().total_tokens, 19);
    }

    #[test]
    fn blocked_prompt_is_empty_response_error() {
        let resp: GeminiResponse = serde_json::from_value(serde_json::json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        match GeminiProvider::response_to_generation(resp, "m") {
            Err(ProviderError::EmptyResponse(reason)) => assert!(reason.contains("SAFETY")),
            other => panic!("Expected EmptyResponse, got: {other:?}"),
        }
    }

    #[test]
    fn candidate_without_text_is_empty_response_error() {
        let resp: GeminiResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"finishReason": "MAX_TOKENS"}]
        }))
        .unwrap();
        match GeminiProvider::response_to_generation(resp, "m") {
            Err(ProviderError::EmptyResponse(reason)) => assert!(reason.contains("MAX_TOKENS")),
            other => panic!("Expected EmptyResponse, got: {other:?}"),
        }
    }

    #[test]
    fn error_message_prefers_google_error_field() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(GeminiProvider::error_message(body), "API key not valid.");
        assert_eq!(GeminiProvider::error_message("plain failure"), "plain failure");
    }

    #[tokio::test]
    async fn generate_against_mock_server() {
        let router = Router::new().route(
            "/v1beta/models/{model}",
            post(|headers: axum::http::HeaderMap, Json(body): Json<serde_json::Value>| async move {
                assert_eq!(headers.get("x-goog-api-key").unwrap(), "test-key");
                let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap().to_string();
                Json(serde_json::json!({
                    "candidates": [{"content": {"parts": [{"text": format!("echo: {prompt}")}]}}]
                }))
            }),
        );
        let base = spawn_mock(router).await;

        let provider = GeminiProvider::new("test-key").with_base_url(base);
        let generation = provider.generate(request("hello")).await.unwrap();
        assert_eq!(generation.text, "echo: hello");
        assert_eq!(generation.model, "gemini-2.0-flash-exp");
    }

    #[tokio::test]
    async fn rate_limit_status_is_mapped() {
        let router = Router::new().route(
            "/v1beta/models/{model}",
            post(|| async {
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(serde_json::json!({"error": {"code": 429, "message": "Quota exceeded"}})),
                )
            }),
        );
        let base = spawn_mock(router).await;

        let provider = GeminiProvider::new("k").with_base_url(base);
        match provider.generate(request("q")).await {
            Err(ProviderError::RateLimited(message)) => assert_eq!(message, "Quota exceeded"),
            other => panic!("Expected RateLimited, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_200_success_status_is_accepted() {
        let router = Router::new().route(
            "/v1beta/models/{model}",
            post(|| async {
                (
                    StatusCode::ACCEPTED,
                    Json(serde_json::json!({
                        "candidates": [{"content": {"parts": [{"text": "accepted"}]}}]
                    })),
                )
            }),
        );
        let base = spawn_mock(router).await;

        let provider = GeminiProvider::new("k").with_base_url(base);
        let generation = provider.generate(request("q")).await.unwrap();
        assert_eq!(generation.text, "accepted");
    }

    #[tokio::test]
    async fn malformed_body_is_reported() {
        let router = Router::new().route("/v1beta/models/{model}", post(|| async { "not json" }));
        let base = spawn_mock(router).await;

        let provider = GeminiProvider::new("k").with_base_url(base);
        assert!(matches!(
            provider.generate(request("q")).await,
            Err(ProviderError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let provider = GeminiProvider::new("k").with_base_url("http://127.0.0.1:1/v1beta");
        assert!(matches!(
            provider.generate(request("q")).await,
            Err(ProviderError::Network(_))
        ));
    }
}
