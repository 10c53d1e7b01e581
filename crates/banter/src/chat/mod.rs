//! Chat orchestration: conversation state, completion backends, and the
//! deterministic local fallback responder.

pub mod backend;
pub mod conversation;
mod error;
pub mod responder;
mod session;

pub use backend::{CompletionBackend, GatewayBackend, GeminiBackend, select_backend};
pub use conversation::{Conversation, Speaker, Turn};
pub use error::ChatError;
pub use responder::respond_locally;
pub use session::{ChatSession, SessionSnapshot};
