//! Chat view: turn list, typing indicator, input line, key hints

use banter::chat::{SessionSnapshot, Speaker, Turn};
use chrono::{DateTime, Local, Utc};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

/// Renders one conversation with its input line
pub struct ChatView;

impl ChatView {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        snapshot: &SessionSnapshot,
        scroll_from_bottom: u16,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_messages(frame, chunks[0], snapshot, scroll_from_bottom);
        self.render_input(frame, chunks[1], snapshot);
        self.render_hints(frame, chunks[2]);
    }

    fn render_messages(
        &self,
        frame: &mut Frame,
        area: Rect,
        snapshot: &SessionSnapshot,
        scroll_from_bottom: u16,
    ) {
        let block = Block::default().borders(Borders::ALL).title("Banter");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines: Vec<Line> = Vec::new();
        for turn in &snapshot.turns {
            lines.push(turn_header(turn));
            for text_line in turn.text.lines() {
                lines.push(Line::from(text_line.to_string()));
            }
            lines.push(Line::default());
        }
        if snapshot.awaiting {
            lines.push(Line::from(Span::styled(
                "Banter is typing…",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
        }

        let total = wrapped_height(&lines, inner.width);
        let overflow = total.saturating_sub(inner.height);
        let scroll = overflow.saturating_sub(scroll_from_bottom);

        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0));
        frame.render_widget(paragraph, inner);
    }

    fn render_input(&self, frame: &mut Frame, area: Rect, snapshot: &SessionSnapshot) {
        let title = if snapshot.awaiting {
            "Waiting for reply…"
        } else {
            "Message"
        };
        let paragraph = Paragraph::new(snapshot.input.as_str())
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(paragraph, area);
    }

    fn render_hints(&self, frame: &mut Frame, area: Rect) {
        let paragraph = Paragraph::new("Enter to send • Ctrl+L to clear • PgUp/PgDn to scroll • Esc to quit")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, area);
    }
}

impl Default for ChatView {
    fn default() -> Self {
        Self::new()
    }
}

fn turn_header(turn: &Turn) -> Line<'static> {
    let (label, color) = match turn.speaker {
        Speaker::Assistant => ("Banter", Color::Cyan),
        Speaker::User => ("You", Color::Green),
    };
    Line::from(vec![
        Span::styled(
            label,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" · {}", clock(turn.created_at)),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

/// Display clock like "3:42 PM", local time
fn clock(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%-I:%M %p")
        .to_string()
}

/// Approximate the height of `lines` after wrapping to `width` columns.
/// Good enough to keep the view pinned to the latest turn.
fn wrapped_height(lines: &[Line], width: u16) -> u16 {
    if width == 0 {
        return 0;
    }
    lines
        .iter()
        .map(|line| {
            let cells = line.width() as u16;
            cells.div_ceil(width).max(1)
        })
        .sum()
}
