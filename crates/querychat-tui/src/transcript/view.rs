//! Scroll state for the transcript pane.

/// Lines scrolled per mouse wheel tick.
pub const SCROLL_SPEED: usize = 3;

/// Scroll position of the transcript pane.
///
/// The widget records the content and viewport sizes on every render, so
/// scrolling always clamps against what was last drawn.
#[derive(Debug, Clone)]
pub struct TranscriptView {
    /// First visible line (ignored while following).
    offset: usize,
    /// Whether to stay pinned to the newest entry.
    follow: bool,
    /// Largest valid offset at the last render.
    max_offset: usize,
    /// Viewport height at the last render.
    viewport: usize,
}

impl Default for TranscriptView {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptView {
    /// Create a view pinned to the bottom.
    pub fn new() -> Self {
        Self {
            offset: 0,
            follow: true,
            max_offset: 0,
            viewport: 0,
        }
    }

    /// Check if follow mode is enabled.
    pub fn is_following(&self) -> bool {
        self.follow
    }

    /// Offset to draw from, given the current content and viewport.
    pub fn resolve(&mut self, total_lines: usize, viewport: usize) -> usize {
        self.viewport = viewport;
        self.max_offset = total_lines.saturating_sub(viewport);
        if self.follow {
            self.offset = self.max_offset;
        } else {
            self.offset = self.offset.min(self.max_offset);
        }
        self.offset
    }

    /// Scroll up by `lines`. Disables follow mode.
    pub fn scroll_up(&mut self, lines: usize) {
        if self.follow {
            self.offset = self.max_offset;
            self.follow = false;
        }
        self.offset = self.offset.saturating_sub(lines);
    }

    /// Scroll down by `lines`. Reaching the bottom re-enables follow mode.
    pub fn scroll_down(&mut self, lines: usize) {
        if self.follow {
            return;
        }
        self.offset = (self.offset + lines).min(self.max_offset);
        if self.offset >= self.max_offset {
            self.follow = true;
        }
    }

    /// Scroll up by one viewport.
    pub fn page_up(&mut self) {
        self.scroll_up(self.viewport.saturating_sub(1).max(1));
    }

    /// Scroll down by one viewport.
    pub fn page_down(&mut self) {
        self.scroll_down(self.viewport.saturating_sub(1).max(1));
    }

    /// Jump to the first line. Disables follow mode.
    pub fn jump_to_start(&mut self) {
        self.follow = false;
        self.offset = 0;
    }

    /// Jump to the newest entry. Enables follow mode.
    pub fn jump_to_end(&mut self) {
        self.follow = true;
        self.offset = self.max_offset;
    }
}
