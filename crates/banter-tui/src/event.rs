//! Event plumbing for the TUI
//!
//! Terminal input is read on a dedicated thread and funneled into a tokio
//! channel together with ticks; background submit tasks use a cloned sender
//! to wake the UI when a response cycle finishes.

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use std::time::Duration;
use tokio::sync::mpsc;

/// Events the UI loop reacts to
#[derive(Debug)]
pub enum Event {
    /// A key was pressed
    Key(KeyEvent),
    /// Terminal was resized
    Resize(u16, u16),
    /// Nothing happened for a tick interval (UI refresh)
    Tick,
    /// A background response cycle finished; re-read the session
    Refresh,
}

/// Input thread + channel pair feeding the UI loop
pub struct EventPump {
    rx: mpsc::UnboundedReceiver<Event>,
    tx: mpsc::UnboundedSender<Event>,
}

impl EventPump {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let input_tx = tx.clone();
        std::thread::spawn(move || {
            loop {
                match event::poll(tick_rate) {
                    Ok(true) => match event::read() {
                        Ok(CrosstermEvent::Key(key)) => {
                            if input_tx.send(Event::Key(key)).is_err() {
                                break;
                            }
                        }
                        Ok(CrosstermEvent::Resize(width, height)) => {
                            if input_tx.send(Event::Resize(width, height)).is_err() {
                                break;
                            }
                        }
                        Ok(_) => {}
                        Err(_) => break,
                    },
                    Ok(false) => {
                        if input_tx.send(Event::Tick).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });

        Self { rx, tx }
    }

    /// Sender handle for background tasks that need to wake the UI
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.tx.clone()
    }

    /// Next event, or `None` once every sender is gone
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}
