//! Application state and key handling
//!
//! The session lives behind an async mutex: a submit cycle holds the lock on
//! a background task for its whole duration, so at most one request is ever
//! outstanding and there is nothing to cancel. The UI renders from a cached
//! snapshot that is re-read whenever the lock is free.

use std::sync::Arc;

use banter::chat::{ChatSession, SessionSnapshot, Speaker, Turn};
use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::{Mutex, mpsc};

use crate::event::Event;

/// Main application state
pub struct App {
    session: Arc<Mutex<ChatSession>>,
    snapshot: SessionSnapshot,
    wake_tx: mpsc::UnboundedSender<Event>,
    /// Whether the app should exit
    pub should_quit: bool,
    /// Manual scroll offset, counted upward from the latest line
    scroll_from_bottom: u16,
}

impl App {
    /// Create a new App instance around a ready session
    pub fn new(session: ChatSession, wake_tx: mpsc::UnboundedSender<Event>) -> Self {
        let snapshot = session.snapshot();
        Self {
            session: Arc::new(Mutex::new(session)),
            snapshot,
            wake_tx,
            should_quit: false,
            scroll_from_bottom: 0,
        }
    }

    /// The state the views render from
    pub fn snapshot(&self) -> &SessionSnapshot {
        &self.snapshot
    }

    pub fn scroll_from_bottom(&self) -> u16 {
        self.scroll_from_bottom
    }

    /// Re-read the session if no response cycle is holding it
    pub fn refresh(&mut self) {
        if let Ok(session) = self.session.try_lock() {
            self.snapshot = session.snapshot();
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => self.should_quit = true,
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => self.should_quit = true,
            (KeyCode::Char('l'), KeyModifiers::CONTROL) => self.clear(),
            (KeyCode::Enter, _) => self.submit(),
            (KeyCode::Backspace, _) => self.edit(|input| {
                input.pop();
            }),
            (KeyCode::PageUp, _) => {
                self.scroll_from_bottom = self.scroll_from_bottom.saturating_add(3);
            }
            (KeyCode::PageDown, _) => {
                self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(3);
            }
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.edit(|input| input.push(c));
            }
            _ => {}
        }
    }

    /// Edit the input buffer; frozen while a reply is pending, like the
    /// original form's disabled state.
    fn edit(&mut self, apply: impl FnOnce(&mut String)) {
        let Ok(mut session) = self.session.try_lock() else {
            return;
        };
        if session.is_awaiting() {
            return;
        }
        apply(session.input_mut());
        self.snapshot = session.snapshot();
    }

    fn clear(&mut self) {
        let Ok(mut session) = self.session.try_lock() else {
            return;
        };
        if session.is_awaiting() {
            return;
        }
        session.reset();
        self.scroll_from_bottom = 0;
        self.snapshot = session.snapshot();
    }

    /// Kick off one response cycle on a background task.
    fn submit(&mut self) {
        if self.snapshot.awaiting {
            return;
        }
        let Ok(session) = self.session.try_lock() else {
            return;
        };
        let text = session.input().trim().to_string();
        if text.is_empty() {
            return;
        }
        drop(session);

        // Echo the pending turn locally so the UI updates before the cycle
        // completes; the authoritative state replaces it on refresh.
        let next_id = self.snapshot.turns.last().map_or(1, |t| t.id) + 1;
        self.snapshot.turns.push(Turn {
            id: next_id,
            speaker: Speaker::User,
            text: text.clone(),
            created_at: Utc::now(),
        });
        self.snapshot.awaiting = true;
        self.snapshot.input.clear();
        self.scroll_from_bottom = 0;

        let session = Arc::clone(&self.session);
        let wake_tx = self.wake_tx.clone();
        tokio::spawn(async move {
            let mut session = session.lock().await;
            session.submit(&text).await;
            drop(session);
            let _ = wake_tx.send(Event::Refresh);
        });
    }
}
