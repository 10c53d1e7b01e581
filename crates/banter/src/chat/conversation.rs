//! Conversation state: ordered turns plus the pending-request flag
//!
//! The state transitions (`begin_exchange`, `complete_exchange`, `reset`)
//! are plain functions on owned state, independent of any rendering layer,
//! so the invariants can be exercised without a UI harness.

use chrono::{DateTime, Utc};

/// Attribution of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    /// The assistant side of the exchange
    Assistant,
    /// The human side of the exchange
    User,
}

impl Speaker {
    /// String form used in logs and display labels
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::Assistant => "assistant",
            Speaker::User => "user",
        }
    }
}

/// One message unit in a conversation
///
/// Ids are allocated locally and monotonically; the remote API never
/// assigns them. Text is immutable once the turn is created.
#[derive(Debug, Clone)]
pub struct Turn {
    pub id: u64,
    pub speaker: Speaker,
    pub text: String,
    /// Used only for display formatting
    pub created_at: DateTime<Utc>,
}

impl Turn {
    fn new(id: u64, speaker: Speaker, text: String) -> Self {
        Self {
            id,
            speaker,
            text,
            created_at: Utc::now(),
        }
    }
}

/// Ordered turn history plus the pending-request flag
///
/// Invariants: the sequence is never empty (it is seeded with a greeting
/// turn), ids are strictly increasing in sequence order, and while a
/// request is in flight the last turn is a user turn. Each accepted
/// submission grows the history by exactly one user turn, and each
/// completed response cycle by exactly one assistant turn.
#[derive(Debug, Clone)]
pub struct Conversation {
    turns: Vec<Turn>,
    next_id: u64,
    awaiting: bool,
    greeting: String,
}

impl Conversation {
    /// Create a conversation seeded with the greeting as turn 1.
    pub fn new(greeting: impl Into<String>) -> Self {
        let greeting = greeting.into();
        Self {
            turns: vec![Turn::new(1, Speaker::Assistant, greeting.clone())],
            next_id: 2,
            awaiting: false,
            greeting,
        }
    }

    /// The ordered turn history.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Whether a response cycle is currently in flight.
    pub fn is_awaiting(&self) -> bool {
        self.awaiting
    }

    /// Start a response cycle: append a user turn and raise the awaiting
    /// flag.
    ///
    /// Returns `None` without touching any state when the trimmed input is
    /// empty or a cycle is already in flight; both rejections are idempotent
    /// no-ops. Returns the new turn's id otherwise.
    pub fn begin_exchange(&mut self, input: &str) -> Option<u64> {
        let trimmed = input.trim();
        if trimmed.is_empty() || self.awaiting {
            return None;
        }

        let id = self.next_id;
        self.turns.push(Turn::new(id, Speaker::User, trimmed.to_string()));
        self.next_id += 1;
        self.awaiting = true;
        Some(id)
    }

    /// Finish the in-flight cycle: append the assistant turn and clear the
    /// awaiting flag. Callers pair this with a successful `begin_exchange`.
    pub fn complete_exchange(&mut self, text: impl Into<String>) -> &Turn {
        debug_assert!(self.awaiting, "complete_exchange without begin_exchange");
        let id = self.next_id;
        self.turns.push(Turn::new(id, Speaker::Assistant, text.into()));
        self.next_id += 1;
        self.awaiting = false;
        self.turns.last().expect("turns is never empty")
    }

    /// Drop all history and return to the single-turn initial state with a
    /// fresh greeting timestamp. The id counter restarts at 2.
    pub fn reset(&mut self) {
        self.turns.clear();
        self.turns.push(Turn::new(1, Speaker::Assistant, self.greeting.clone()));
        self.next_id = 2;
        self.awaiting = false;
    }
}
