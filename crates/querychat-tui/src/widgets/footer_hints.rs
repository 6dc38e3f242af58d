//! Footer status bar widget.
//!
//! Format: `notice                    [Enter] send │ [Tab] upload │ [Esc] quit`

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::app::Focus;
use crate::theme::Theme;

/// A single keybinding hint.
#[derive(Debug, Clone)]
pub struct KeyHint {
    /// The key or key combination (e.g., "Tab", "Ctrl+U").
    pub key: String,
    /// The action description (e.g., "send", "quit").
    pub action: String,
}

impl KeyHint {
    /// Create a new key hint.
    pub fn new(key: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            action: action.into(),
        }
    }
}

/// Footer status bar widget.
pub struct FooterHints<'a> {
    hints: &'a [KeyHint],
    theme: &'a Theme,
    notice: Option<&'a str>,
}

impl<'a> FooterHints<'a> {
    /// Create a new footer hints widget.
    pub fn new(hints: &'a [KeyHint], theme: &'a Theme) -> Self {
        Self {
            hints,
            theme,
            notice: None,
        }
    }

    /// Set a transient notice shown on the left.
    #[must_use]
    pub fn notice(mut self, notice: Option<&'a str>) -> Self {
        self.notice = notice;
        self
    }

    /// Hints for the focused field.
    pub fn for_focus(focus: Focus) -> Vec<KeyHint> {
        match focus {
            Focus::Question => vec![
                KeyHint::new("Enter", "send"),
                KeyHint::new("Ctrl+J", "newline"),
                KeyHint::new("Ctrl+Y", "copy sql"),
                KeyHint::new("Tab", "upload"),
                KeyHint::new("Esc", "quit"),
            ],
            Focus::Upload => vec![
                KeyHint::new("Enter", "upload"),
                KeyHint::new("PgUp/PgDn", "scroll"),
                KeyHint::new("Tab", "question"),
                KeyHint::new("Esc", "quit"),
            ],
        }
    }
}

impl Widget for FooterHints<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut left_spans = Vec::new();
        let mut right_spans = Vec::new();

        if let Some(notice) = self.notice {
            left_spans.push(Span::styled(
                notice.to_string(),
                Style::default().fg(self.theme.warning),
            ));
        }

        for (i, hint) in self.hints.iter().enumerate() {
            if i > 0 {
                right_spans.push(Span::styled(" │ ", Style::default().fg(self.theme.muted)));
            }
            right_spans.push(Span::styled("[", Style::default().fg(self.theme.muted)));
            right_spans.push(Span::styled(
                hint.key.as_str(),
                Style::default().fg(self.theme.primary),
            ));
            right_spans.push(Span::styled("] ", Style::default().fg(self.theme.muted)));
            right_spans.push(Span::styled(
                hint.action.as_str(),
                Style::default().fg(self.theme.subtext),
            ));
        }

        let left_width: usize = left_spans.iter().map(|s| s.content.width()).sum();
        let right_width: usize = right_spans.iter().map(|s| s.content.width()).sum();
        let total_width = area.width as usize;

        // Hints give way to the notice when both do not fit
        if left_width + right_width > total_width && !left_spans.is_empty() {
            right_spans.clear();
        } else {
            let padding = total_width.saturating_sub(left_width + right_width);
            if padding > 0 {
                left_spans.push(Span::raw(" ".repeat(padding)));
            }
        }

        left_spans.extend(right_spans);

        Paragraph::new(Line::from(left_spans))
            .style(Style::default().bg(self.theme.surface))
            .render(area, buf);
    }
}
