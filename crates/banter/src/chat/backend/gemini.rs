//! Direct Gemini API backend
//!
//! Builds `contents`/`parts` payloads from the conversation history and
//! reads the first candidate's text back. Speaker roles are remapped to the
//! provider's vocabulary: the assistant side becomes `model`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::CompletionBackend;
use crate::chat::conversation::{Speaker, Turn};
use crate::chat::error::ChatError;
use crate::config::GeminiConfig;

pub struct GeminiBackend {
    client: Client,
    api_key: String,
    url: String,
}

impl GeminiBackend {
    /// Create a backend for the configured model. The API key is an explicit
    /// argument; callers resolve it from wherever they keep secrets.
    pub fn new(config: &GeminiConfig, api_key: String) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChatError::Transport(format!("failed to create HTTP client: {e}")))?;

        let url = format!(
            "{}/models/{}:generateContent",
            config.api_url.trim_end_matches('/'),
            config.model
        );

        Ok(Self { client, api_key, url })
    }

    fn build_request(history: &[Turn], input: &str) -> GenerateRequest {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|turn| Content {
                role: match turn.speaker {
                    Speaker::Assistant => "model".to_string(),
                    Speaker::User => "user".to_string(),
                },
                parts: vec![Part {
                    text: turn.text.clone(),
                }],
            })
            .collect();

        contents.push(Content {
            role: "user".to_string(),
            parts: vec![Part {
                text: input.to_string(),
            }],
        });

        GenerateRequest { contents }
    }

    /// Join the first candidate's text parts with blank lines. `None` when
    /// the response carries no usable text.
    fn extract_text(response: &GenerateResponse) -> Option<String> {
        let candidate = response.candidates.first()?;
        let joined = candidate
            .content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");

        if joined.trim().is_empty() { None } else { Some(joined) }
    }
}

#[async_trait]
impl CompletionBackend for GeminiBackend {
    async fn complete(&self, history: &[Turn], input: &str) -> Result<String, ChatError> {
        let request = Self::build_request(history, input);
        tracing::debug!("Calling Gemini API at: {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(ChatError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::api(status.as_u16(), &body));
        }

        let completion: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ChatError::MalformedResponse(e.to_string()))?;

        Self::extract_text(&completion)
            .ok_or_else(|| ChatError::MalformedResponse("no candidate text".to_string()))
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

// Gemini wire types

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::conversation::Conversation;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(api_url: String) -> GeminiConfig {
        GeminiConfig {
            api_url,
            model: "gemini-1.5-flash-latest".to_string(),
            api_key_env: "TEST_GEMINI_KEY".to_string(),
            timeout_secs: 5,
        }
    }

    fn history_of(pairs: &[(&str, &str)]) -> Vec<Turn> {
        let mut convo = Conversation::new("greeting");
        for (question, answer) in pairs {
            convo.begin_exchange(question).unwrap();
            convo.complete_exchange(*answer);
        }
        convo.turns().to_vec()
    }

    #[test]
    fn test_build_request_remaps_assistant_to_model() {
        let history = history_of(&[("first", "reply")]);
        let request = GeminiBackend::build_request(&history, "second");

        let roles: Vec<&str> = request.contents.iter().map(|c| c.role.as_str()).collect();
        assert_eq!(roles, vec!["model", "user", "model", "user"]);
        assert_eq!(request.contents.last().unwrap().parts[0].text, "second");
    }

    #[test]
    fn test_extract_text_joins_parts_with_blank_lines() {
        let response = GenerateResponse {
            candidates: vec![Candidate {
                content: CandidateContent {
                    parts: vec![
                        CandidatePart {
                            text: Some("first".to_string()),
                        },
                        CandidatePart { text: None },
                        CandidatePart {
                            text: Some("second".to_string()),
                        },
                    ],
                },
            }],
        };

        assert_eq!(
            GeminiBackend::extract_text(&response).unwrap(),
            "first\n\nsecond"
        );
    }

    #[test]
    fn test_extract_text_empty_candidates_is_none() {
        let response = GenerateResponse { candidates: vec![] };
        assert!(GeminiBackend::extract_text(&response).is_none());
    }

    #[tokio::test]
    async fn test_complete_sends_key_header_and_parses_candidates() {
        let mock_server = MockServer::start().await;

        let response_body = serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "Nice to meet you."}]
                }
            }]
        });

        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash-latest:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "hello"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(response_body))
            .mount(&mock_server)
            .await;

        let backend =
            GeminiBackend::new(&test_config(mock_server.uri()), "test-key".to_string()).unwrap();

        let reply = backend.complete(&[], "hello").await.unwrap();
        assert_eq!(reply, "Nice to meet you.");
    }

    #[tokio::test]
    async fn test_complete_non_success_status_is_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("key rejected"))
            .mount(&mock_server)
            .await;

        let backend =
            GeminiBackend::new(&test_config(mock_server.uri()), "bad-key".to_string()).unwrap();

        let err = backend.complete(&[], "hello").await.unwrap_err();
        match err {
            ChatError::Api { status, detail } => {
                assert_eq!(status, 403);
                assert_eq!(detail, "key rejected");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_complete_empty_candidates_is_malformed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&mock_server)
            .await;

        let backend =
            GeminiBackend::new(&test_config(mock_server.uri()), "test-key".to_string()).unwrap();

        let err = backend.complete(&[], "hello").await.unwrap_err();
        assert!(matches!(err, ChatError::MalformedResponse(_)));
    }
}
