//! View rendering for the chat client

pub mod chat;

pub use chat::ChatView;
