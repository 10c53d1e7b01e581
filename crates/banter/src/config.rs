use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{BanterError, Result};

/// Main configuration structure for Banter
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Relay server configuration
    #[serde(default)]
    pub relay: RelayConfig,
    /// Chat session configuration
    #[serde(default)]
    pub chat: ChatConfig,
    /// Direct Gemini API backend configuration
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// Proxied OpenAI-compatible gateway backend configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl Config {
    /// Load configuration from an explicit path, or search the default
    /// locations (`~/.banter/config.toml`, the platform config dir,
    /// `./config.toml`), falling back to defaults when nothing is found.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        if let Some(path) = path {
            tracing::info!("Loading config from: {}", path.display());
            return Self::from_file(path);
        }

        let default_paths = [
            dirs::home_dir().map(|h| h.join(".banter").join("config.toml")),
            dirs::config_dir().map(|c| c.join("banter").join("config.toml")),
            Some(PathBuf::from("config.toml")),
        ];

        for candidate in default_paths.iter().flatten() {
            if candidate.exists() {
                tracing::info!("Loading config from: {}", candidate.display());
                return Self::from_file(candidate);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    fn from_file(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BanterError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| BanterError::Config(format!("Failed to parse config: {e}")))
    }
}

/// Relay server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Address to listen on (e.g., "127.0.0.1:8787")
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Fixed upstream base URL every relayed request is forwarded to
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,
    /// Reserved path prefix the relay answers under
    #[serde(default = "default_path_prefix")]
    pub path_prefix: String,
    /// Upstream request timeout in seconds
    #[serde(default = "default_relay_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            upstream_url: default_upstream_url(),
            path_prefix: default_path_prefix(),
            timeout_secs: default_relay_timeout_secs(),
        }
    }
}

fn default_listen_addr() -> String {
    "127.0.0.1:8787".to_string()
}

fn default_upstream_url() -> String {
    "https://router.huggingface.co".to_string()
}

fn default_path_prefix() -> String {
    "hf-api".to_string()
}

fn default_relay_timeout_secs() -> u64 {
    300
}

/// Chat session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Assistant turn every conversation is seeded with
    #[serde(default = "default_greeting")]
    pub greeting: String,
    /// System preamble sent ahead of the history in proxied mode
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Completion length cap for proxied requests
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature for proxied requests
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            system_prompt: default_system_prompt(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_greeting() -> String {
    "Hi! I'm Banter, your AI companion. Ask me anything and I'll do my best \
     to give you a useful, conversational answer."
        .to_string()
}

fn default_system_prompt() -> String {
    "You are Banter, a friendly AI companion. Answer conversationally and \
     keep replies concise and helpful."
        .to_string()
}

fn default_max_tokens() -> u32 {
    512
}

fn default_temperature() -> f32 {
    0.7
}

/// Direct Gemini API backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    /// API base URL
    #[serde(default = "default_gemini_api_url")]
    pub api_url: String,
    /// Model name appended to the generateContent endpoint
    #[serde(default = "default_gemini_model")]
    pub model: String,
    /// Environment variable the API key is read from
    #[serde(default = "default_gemini_api_key_env")]
    pub api_key_env: String,
    /// Request timeout in seconds
    #[serde(default = "default_backend_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_url: default_gemini_api_url(),
            model: default_gemini_model(),
            api_key_env: default_gemini_api_key_env(),
            timeout_secs: default_backend_timeout_secs(),
        }
    }
}

fn default_gemini_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash-latest".to_string()
}

fn default_gemini_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_backend_timeout_secs() -> u64 {
    120
}

/// Proxied OpenAI-compatible gateway backend configuration
///
/// The default `api_url` points at a locally running relay, which in turn
/// forwards to the gated upstream host.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// OpenAI-compatible API base URL (chat/completions is appended)
    #[serde(default = "default_gateway_api_url")]
    pub api_url: String,
    /// Gated model id requested through the gateway
    #[serde(default = "default_gateway_model")]
    pub model: String,
    /// Environment variable the bearer token is read from
    #[serde(default = "default_gateway_api_key_env")]
    pub api_key_env: String,
    /// Request timeout in seconds
    #[serde(default = "default_backend_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_url: default_gateway_api_url(),
            model: default_gateway_model(),
            api_key_env: default_gateway_api_key_env(),
            timeout_secs: default_backend_timeout_secs(),
        }
    }
}

fn default_gateway_api_url() -> String {
    "http://127.0.0.1:8787/hf-api/v1".to_string()
}

fn default_gateway_model() -> String {
    "meta-llama/Llama-3.1-8B-Instruct".to_string()
}

fn default_gateway_api_key_env() -> String {
    "HF_API_TOKEN".to_string()
}

/// Secrets resolved by the caller.
///
/// The library never reads the environment itself; the binaries look up the
/// env vars named in [`GeminiConfig`]/[`GatewayConfig`] and pass the values
/// in, so tests can construct sessions deterministically.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// API key for the direct Gemini backend
    pub gemini_api_key: Option<String>,
    /// Bearer token for the proxied gateway backend
    pub gateway_token: Option<String>,
}

impl Credentials {
    /// Resolve credentials from the environment variables named in `config`.
    /// Empty values count as absent.
    pub fn from_env(config: &Config) -> Self {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            gemini_api_key: read(&config.gemini.api_key_env),
            gateway_token: read(&config.gateway.api_key_env),
        }
    }
}
