//! Chat session orchestration
//!
//! `submit` is the single entry point for a response cycle: it appends the
//! user turn, performs at most one suspending network call, and always
//! appends exactly one assistant turn — a real completion, a canned local
//! reply, or a diagnostic. No failure ever escapes to the caller.

use tracing::{debug, warn};

use super::backend::CompletionBackend;
use super::conversation::{Conversation, Turn};
use super::error::ChatError;
use super::responder::respond_locally;
use crate::config::ChatConfig;

/// Marker prefixed to diagnostic assistant turns.
const WARNING_PREFIX: &str = "\u{26a0}\u{fe0f} ";

/// One user's conversation with the assistant.
///
/// Owns the conversation, the input buffer, and the selected backend.
/// Exactly one request can be outstanding at a time: while the conversation
/// is awaiting, further submissions are rejected as no-ops.
pub struct ChatSession {
    conversation: Conversation,
    input: String,
    backend: Option<Box<dyn CompletionBackend>>,
}

/// Point-in-time copy of everything the rendering layer needs.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub turns: Vec<Turn>,
    pub awaiting: bool,
    pub input: String,
}

impl ChatSession {
    /// Create a session seeded with the configured greeting. `None` for the
    /// backend selects local-responder-only mode.
    pub fn new(config: &ChatConfig, backend: Option<Box<dyn CompletionBackend>>) -> Self {
        Self {
            conversation: Conversation::new(config.greeting.clone()),
            input: String::new(),
            backend,
        }
    }

    /// Submit user input and run one full response cycle.
    ///
    /// Empty input and submissions while a cycle is in flight are rejected
    /// without changing any state. Otherwise, whatever happens on the wire,
    /// the conversation gains exactly one user turn and one assistant turn
    /// and the awaiting flag ends up cleared.
    pub async fn submit(&mut self, input: &str) {
        let Some(user_id) = self.conversation.begin_exchange(input) else {
            debug!("Submission rejected (blank input or request already in flight)");
            return;
        };
        self.input.clear();

        let prompt = input.trim();
        let reply = match &self.backend {
            None => {
                debug!("No backend configured, answering locally");
                respond_locally(prompt)
            }
            Some(backend) => {
                // Everything before the just-appended user turn.
                let turns = self.conversation.turns();
                let history = &turns[..turns.len() - 1];
                match backend.complete(history, prompt).await {
                    Ok(text) => text,
                    Err(ChatError::MalformedResponse(detail)) => {
                        warn!(
                            "Completion from {} unusable ({detail}), answering locally",
                            backend.name()
                        );
                        respond_locally(prompt)
                    }
                    Err(err) => {
                        warn!("Completion via {} failed: {err}", backend.name());
                        format!("{WARNING_PREFIX}{err}")
                    }
                }
            }
        };

        let turn = self.conversation.complete_exchange(reply);
        debug_assert_eq!(turn.id, user_id + 1);
    }

    /// Discard all history: back to the single greeting turn, empty input
    /// buffer, no request in flight.
    pub fn reset(&mut self) {
        self.conversation.reset();
        self.input.clear();
        debug!("Conversation reset");
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn is_awaiting(&self) -> bool {
        self.conversation.is_awaiting()
    }

    /// The pending input buffer, as typed so far.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Mutable access for the rendering layer's editing keys.
    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    /// Copy of the renderable state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            turns: self.conversation.turns().to_vec(),
            awaiting: self.conversation.is_awaiting(),
            input: self.input.clone(),
        }
    }
}
