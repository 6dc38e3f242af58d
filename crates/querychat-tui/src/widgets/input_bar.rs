//! Bordered input field widget.
//!
//! Used for both the question box and the upload path box. Supports
//! multi-line content with Ctrl+J or Alt+Enter for newlines.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::input::TextInputState;
use crate::theme::Theme;

const CURSOR: &str = "\u{2588}";

/// Bordered input field for text entry.
pub struct InputBar<'a> {
    input: &'a TextInputState,
    theme: &'a Theme,
    title: &'a str,
    placeholder: &'a str,
    focused: bool,
}

impl<'a> InputBar<'a> {
    /// Create a new input bar widget.
    pub fn new(input: &'a TextInputState, theme: &'a Theme) -> Self {
        Self {
            input,
            theme,
            title: "",
            placeholder: "",
            focused: false,
        }
    }

    /// Set the border title.
    #[must_use]
    pub fn title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }

    /// Set the text shown while the field is empty and unfocused.
    #[must_use]
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Set whether the input bar is focused.
    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Build display lines and the index of the line holding the cursor.
    fn build_input_lines(&self) -> (Vec<Line<'static>>, usize) {
        let content = self.input.content();

        if content.is_empty() && !self.focused {
            return (
                vec![Line::from(vec![
                    Span::raw("> "),
                    Span::styled(
                        self.placeholder.to_string(),
                        Style::default().fg(self.theme.muted),
                    ),
                ])],
                0,
            );
        }

        let text_lines: Vec<&str> = content.split('\n').collect();
        let (cursor_line, cursor_col) = cursor_position(&text_lines, self.input.cursor());

        let mut lines = Vec::with_capacity(text_lines.len());
        for (line_idx, line_text) in text_lines.iter().enumerate() {
            let prefix = if line_idx == 0 { "> " } else { "  " };

            if self.focused && line_idx == cursor_line {
                let chars: Vec<char> = line_text.chars().collect();
                let before: String = chars[..cursor_col].iter().collect();
                let after: String = chars[cursor_col..].iter().collect();
                lines.push(Line::from(vec![
                    Span::raw(prefix),
                    Span::raw(before),
                    Span::styled(CURSOR, Style::default().fg(self.theme.primary)),
                    Span::raw(after),
                ]));
            } else {
                lines.push(Line::from(format!("{prefix}{line_text}")));
            }
        }

        (lines, cursor_line)
    }
}

/// Line and column of a character cursor within newline-split text.
fn cursor_position(lines: &[&str], cursor: usize) -> (usize, usize) {
    let mut consumed = 0;
    for (idx, line) in lines.iter().enumerate() {
        let len = line.chars().count();
        if cursor <= consumed + len {
            return (idx, cursor - consumed);
        }
        // +1 for the newline
        consumed += len + 1;
    }
    let last = lines.len().saturating_sub(1);
    (last, lines.get(last).map_or(0, |l| l.chars().count()))
}

#[allow(clippy::cast_possible_truncation)]
impl Widget for InputBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(self.theme.border_focused)
        } else {
            Style::default().fg(self.theme.border)
        };

        let block = Block::default()
            .title(self.title)
            .borders(Borders::ALL)
            .border_style(border_style);

        let inner_height = area.height.saturating_sub(2) as usize;
        let (lines, cursor_line) = self.build_input_lines();

        // Keep the cursor line visible
        let scroll_offset = if lines.len() <= inner_height {
            0
        } else {
            cursor_line.saturating_sub(inner_height.saturating_sub(1))
        };

        Paragraph::new(lines)
            .block(block)
            .style(Style::default().fg(self.theme.text))
            .scroll((scroll_offset as u16, 0))
            .render(area, buf);
    }
}
