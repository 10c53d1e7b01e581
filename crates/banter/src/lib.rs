//! Banter - conversational companion engine with an edge relay
//!
//! This crate provides the chat session orchestrator (conversation state,
//! remote completion backends, deterministic local fallback) and a stateless
//! relay server that forwards client traffic to a gated upstream model API.

pub mod chat;
pub mod config;
pub mod error;
pub mod relay;

pub use error::BanterError;
