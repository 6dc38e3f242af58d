//! Transcript pane widget.

use querychat_engine::Transcript;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, StatefulWidget, Widget},
};

use super::lines::entry_lines;
use super::view::TranscriptView;
use crate::theme::Theme;

/// Shown before anything has been appended.
pub const EMPTY_HINT: &str = "Upload a CSV or Excel file, then ask a question about it.";

/// Scrollable transcript pane.
///
/// ```text
/// ┌ querychat · http://127.0.0.1:8000 ───────────┐
/// │› you  14:02                                   │
/// │  Average sales by region?                     │
/// │                                               │
/// │● assistant  14:02                             │
/// │  The average sales by region were: ...        │
/// │                                               │
/// │  sql │ SELECT Region, AVG(Sales) FROM t ...   │
/// │                                               │
/// │  Region │ Average_Sales                       │
/// │  ───────┼──────────────                       │
/// │  North  │ 12000                               │
/// └───────────────────────────────────────────────┘
/// ```
pub struct TranscriptPane<'a> {
    transcript: &'a Transcript,
    theme: &'a Theme,
    title: &'a str,
    waiting: usize,
}

impl<'a> TranscriptPane<'a> {
    /// Create a new transcript pane.
    pub fn new(transcript: &'a Transcript, theme: &'a Theme) -> Self {
        Self {
            transcript,
            theme,
            title: " querychat ",
            waiting: 0,
        }
    }

    /// Set the pane title.
    #[must_use]
    pub fn title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }

    /// Set the number of replies still outstanding.
    #[must_use]
    pub fn waiting(mut self, waiting: usize) -> Self {
        self.waiting = waiting;
        self
    }

    /// All lines for the current width.
    fn build_lines(&self, width: usize) -> Vec<Line<'static>> {
        if self.transcript.is_empty() {
            return vec![Line::from(Span::styled(
                EMPTY_HINT,
                Style::default().fg(self.theme.muted),
            ))];
        }

        let mut lines: Vec<Line<'static>> = self
            .transcript
            .entries()
            .iter()
            .flat_map(|entry| entry_lines(entry, width, self.theme))
            .collect();

        if self.waiting > 0 {
            let noun = if self.waiting == 1 { "reply" } else { "replies" };
            lines.push(Line::from(Span::styled(
                format!("\u{25cf} waiting for {} {noun}...", self.waiting),
                Style::default()
                    .fg(self.theme.muted)
                    .add_modifier(Modifier::ITALIC),
            )));
        }

        lines
    }
}

impl StatefulWidget for TranscriptPane<'_> {
    type State = TranscriptView;

    #[allow(clippy::cast_possible_truncation)]
    fn render(self, area: Rect, buf: &mut Buffer, view: &mut TranscriptView) {
        let block = Block::default()
            .title(self.title)
            .title_style(Style::default().fg(self.theme.text))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border))
            .style(Style::default().bg(self.theme.base));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let lines = self.build_lines(inner.width as usize);
        let offset = view.resolve(lines.len(), inner.height as usize);

        let visible: Vec<Line<'static>> = lines
            .into_iter()
            .skip(offset)
            .take(inner.height as usize)
            .collect();
        Paragraph::new(visible).render(inner, buf);
    }
}
