//! Proxied OpenAI-compatible gateway backend
//!
//! Speaks chat/completions through the relay's reserved path to a gated
//! model. A 503 from the gateway means the hosted model is still loading
//! and is classified separately from other upstream failures.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::CompletionBackend;
use crate::chat::conversation::{Speaker, Turn};
use crate::chat::error::ChatError;
use crate::config::{ChatConfig, GatewayConfig};

pub struct GatewayBackend {
    client: Client,
    token: String,
    url: String,
    model: String,
    system_prompt: String,
    max_tokens: u32,
    temperature: f32,
}

impl GatewayBackend {
    /// Create a backend for the configured gateway. The bearer token is an
    /// explicit argument; callers resolve it from wherever they keep secrets.
    pub fn new(
        config: &GatewayConfig,
        chat: &ChatConfig,
        token: String,
    ) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChatError::Transport(format!("failed to create HTTP client: {e}")))?;

        let url = format!("{}/chat/completions", config.api_url.trim_end_matches('/'));

        Ok(Self {
            client,
            token,
            url,
            model: config.model.clone(),
            system_prompt: chat.system_prompt.clone(),
            max_tokens: chat.max_tokens,
            temperature: chat.temperature,
        })
    }

    fn build_request(&self, history: &[Turn], input: &str) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message {
            role: "system".to_string(),
            content: self.system_prompt.clone(),
        });
        for turn in history {
            messages.push(Message {
                role: match turn.speaker {
                    Speaker::Assistant => "assistant".to_string(),
                    Speaker::User => "user".to_string(),
                },
                content: turn.text.clone(),
            });
        }
        messages.push(Message {
            role: "user".to_string(),
            content: input.to_string(),
        });

        ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl CompletionBackend for GatewayBackend {
    async fn complete(&self, history: &[Turn], input: &str) -> Result<String, ChatError> {
        let request = self.build_request(history, input);
        tracing::debug!("Calling gateway at: {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await
            .map_err(ChatError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::SERVICE_UNAVAILABLE {
                tracing::warn!("Gateway model still loading: {body}");
                return Err(ChatError::ModelLoading);
            }
            return Err(ChatError::api(status.as_u16(), &body));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatError::MalformedResponse(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| ChatError::MalformedResponse("no message content".to_string()))
    }

    fn name(&self) -> &'static str {
        "gateway"
    }
}

// OpenAI-compatible wire types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}
