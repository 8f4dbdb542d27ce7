//! Configuration loading, validation, and management for Atomia.
//!
//! Loads configuration from `~/.atomia/config.toml` with environment
//! variable overrides. Validates all settings at startup.
//!
//! A missing provider credential is not an error: the generation client
//! falls back to its offline answer instead.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variables consulted for the provider credential, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "ATOMIA_API_KEY"];

/// The root configuration structure.
///
/// Maps directly to `~/.atomia/config.toml`.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Provider credential (usually supplied through `GEMINI_API_KEY`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Text-generation provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Session history settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Prompt assembly settings
    #[serde(default)]
    pub prompt: PromptConfig,

    /// HTTP gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("provider", &self.provider)
            .field("session", &self.session)
            .field("prompt", &self.prompt)
            .field("gateway", &self.gateway)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// "gemini" talks to the Gemini API; "offline" always uses the fallback answer
    #[serde(default = "default_provider_kind")]
    pub kind: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Cap on generated tokens per answer
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Upper bound on a single provider call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider_kind() -> String {
    "gemini".into()
}
fn default_model() -> String {
    "gemini-2.0-flash-exp".into()
}
fn default_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}
fn default_temperature() -> f32 {
    0.3
}
fn default_top_p() -> f32 {
    0.9
}
fn default_max_output_tokens() -> u32 {
    800
}
fn default_timeout_secs() -> u64 {
    60
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: default_provider_kind(),
            model: default_model(),
            api_url: default_api_url(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Turns retained per session; older turns are discarded
    #[serde(default = "default_max_context_messages")]
    pub max_context_messages: usize,
}

fn default_max_context_messages() -> usize {
    atomia_core::MAX_CONTEXT_MESSAGES
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_context_messages: default_max_context_messages(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Replace the built-in tutor preamble entirely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_preamble_override: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Allowed CORS origins. Empty or containing "*" allows any origin.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_port() -> u16 {
    8000
}
fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            cors_origins: default_cors_origins(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.atomia/config.toml).
    ///
    /// Environment variables take precedence over the file:
    /// - `GEMINI_API_KEY`, then `ATOMIA_API_KEY` for the credential
    /// - `ATOMIA_MODEL` for the model name
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.api_key = normalize_key(config.api_key.take());
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    ///
    /// Blank values are ignored so an empty `GEMINI_API_KEY=` leaves the
    /// provider in offline mode rather than sending an empty credential.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = API_KEY_ENV_VARS
            .iter()
            .find_map(|name| normalize_key(lookup(name)))
        {
            self.api_key = Some(key);
        }

        if let Some(model) = lookup("ATOMIA_MODEL").filter(|m| !m.trim().is_empty()) {
            self.provider.model = model.trim().to_string();
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".atomia")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.provider.kind.as_str(), "gemini" | "offline") {
            return Err(ConfigError::ValidationError(format!(
                "provider.kind must be \"gemini\" or \"offline\", got \"{}\"",
                self.provider.kind
            )));
        }

        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(ConfigError::ValidationError(
                "provider.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.provider.top_p) {
            return Err(ConfigError::ValidationError(
                "provider.top_p must be between 0.0 and 1.0".into(),
            ));
        }

        if self.provider.max_output_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "provider.max_output_tokens must be > 0".into(),
            ));
        }

        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "provider.timeout_secs must be > 0".into(),
            ));
        }

        if self.session.max_context_messages == 0 {
            return Err(ConfigError::ValidationError(
                "session.max_context_messages must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Check if a provider credential is available.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Whether answers will come from the live provider rather than the offline fallback.
    pub fn llm_enabled(&self) -> bool {
        self.provider.kind == "gemini" && self.has_api_key()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

fn normalize_key(key: Option<String>) -> Option<String> {
    key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty())
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
