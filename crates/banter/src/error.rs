//! Error types for Banter

use thiserror::Error;

/// Main error type for Banter operations
#[derive(Error, Debug)]
pub enum BanterError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Relay/HTTP errors
    #[error("Relay error: {0}")]
    Relay(String),

    /// Chat backend errors
    #[error("Chat error: {0}")]
    Chat(#[from] crate::chat::ChatError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Banter operations
pub type Result<T> = std::result::Result<T, BanterError>;
