//! Remote completion backends
//!
//! Two strategies exist: a direct call against the public Gemini API and a
//! proxied call through the relay to a gated OpenAI-compatible gateway.
//! Which one a session uses is decided purely by which credential is
//! present; with neither, the session never constructs a backend at all.

mod gateway;
mod gemini;

pub use gateway::GatewayBackend;
pub use gemini::GeminiBackend;

use async_trait::async_trait;

use super::conversation::Turn;
use super::error::ChatError;
use crate::config::{Config, Credentials};

/// A remote chat-completion strategy.
///
/// Implementations make exactly one network call per invocation and never
/// retry; classification of failures is left to [`ChatError`].
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Produce the assistant reply for `input`, given all prior turns.
    async fn complete(&self, history: &[Turn], input: &str) -> Result<String, ChatError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Pick the request strategy for the given credentials.
///
/// A Gemini API key selects the direct backend, otherwise a gateway token
/// selects the proxied one; with neither, `None` selects local-responder-only
/// mode and no network is ever attempted.
pub fn select_backend(
    config: &Config,
    credentials: &Credentials,
) -> Result<Option<Box<dyn CompletionBackend>>, ChatError> {
    if let Some(key) = &credentials.gemini_api_key {
        let backend = GeminiBackend::new(&config.gemini, key.clone())?;
        tracing::info!("Using direct backend: {}", config.gemini.model);
        return Ok(Some(Box::new(backend)));
    }
    if let Some(token) = &credentials.gateway_token {
        let backend = GatewayBackend::new(&config.gateway, &config.chat, token.clone())?;
        tracing::info!("Using proxied backend: {}", config.gateway.model);
        return Ok(Some(Box::new(backend)));
    }
    tracing::info!("No credential configured, running with the local responder only");
    Ok(None)
}
