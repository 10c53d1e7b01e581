//! Error taxonomy for remote completion calls
//!
//! Absence of a credential is not represented here: it is a deliberate mode
//! switch handled before any backend exists, not a failure.

use thiserror::Error;

/// Longest slice of an upstream error body carried into a diagnostic.
const MAX_ERROR_DETAIL_CHARS: usize = 150;

/// Failures while obtaining a completion from a remote backend.
///
/// Every variant is caught at the session boundary and rendered into an
/// assistant turn; none of them escapes to the caller of `submit`.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The network call could not be completed at all.
    #[error("connection error: {0}")]
    Transport(String),

    /// Upstream answered 503: the hosted model is still warming up.
    #[error("the model is still loading upstream, retry in a moment")]
    ModelLoading,

    /// Any other non-2xx status from the provider.
    #[error("upstream returned HTTP {status}: {detail}")]
    Api { status: u16, detail: String },

    /// A 2xx response that did not carry usable message content.
    #[error("malformed completion response: {0}")]
    MalformedResponse(String),
}

impl ChatError {
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        ChatError::Transport(err.to_string())
    }

    /// Build an `Api` error, truncating the body to a diagnostic-sized slice.
    pub(crate) fn api(status: u16, body: &str) -> Self {
        ChatError::Api {
            status,
            detail: body.chars().take(MAX_ERROR_DETAIL_CHARS).collect(),
        }
    }
}
