//! Banter TUI - terminal chat client for the Banter companion engine

pub mod app;
pub mod event;
pub mod tui;
pub mod views;

pub use app::App;
pub use event::{Event, EventPump};
pub use tui::Tui;
