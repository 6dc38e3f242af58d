//! Application state and update logic for the querychat TUI.

use crate::event::{key_to_action, Action};
use crate::input::TextInputState;
use crate::theme::Theme;
use crate::transcript::{TranscriptView, SCROLL_SPEED};
use crossterm::event::KeyEvent;
use querychat_engine::{Completion, Controller, Request};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Notice shown when there is no query to copy.
pub const NO_QUERY_NOTICE: &str = "No query to copy";

/// Notice shown after a query was copied.
pub const COPIED_NOTICE: &str = "Copied query to clipboard";

/// Which input field receives typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Question,
    Upload,
}

impl Focus {
    /// The other field.
    pub fn toggle(self) -> Self {
        match self {
            Self::Question => Self::Upload,
            Self::Upload => Self::Question,
        }
    }
}

/// Main application state.
#[derive(Debug)]
pub struct App {
    /// Transcript and request bookkeeping.
    pub controller: Controller,
    /// Question being typed.
    pub question: TextInputState,
    /// Path of the file to upload. Kept after an upload.
    pub upload_path: TextInputState,
    /// Focused input field.
    pub focus: Focus,
    /// Transcript scroll state.
    pub view: TranscriptView,
    /// Color palette.
    pub theme: Theme,
    /// Backend URL shown in the transcript title.
    pub backend_url: String,
    /// Transient notice shown in the footer.
    pub notice: Option<String>,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Transcript length at the last check.
    seen_entries: usize,
}

impl App {
    /// Create a new app around a controller.
    pub fn new(controller: Controller, backend_url: impl Into<String>) -> Self {
        let seen_entries = controller.transcript().len();
        Self {
            controller,
            question: TextInputState::new(),
            upload_path: TextInputState::new(),
            focus: Focus::default(),
            view: TranscriptView::new(),
            theme: Theme::default(),
            backend_url: backend_url.into(),
            notice: None,
            should_quit: false,
            seen_entries,
        }
    }

    /// Use a different theme.
    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Handle a key press, returning a request to dispatch if one was made.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Request> {
        self.handle_action(key_to_action(key))
    }

    /// Handle an action, returning a request to dispatch if one was made.
    pub fn handle_action(&mut self, action: Action) -> Option<Request> {
        if action != Action::None {
            self.notice = None;
        }

        let request = match action {
            Action::Quit => {
                self.should_quit = true;
                None
            }
            Action::Submit => match self.focus {
                Focus::Question => self.submit_question(),
                Focus::Upload => self.submit_upload(),
            },
            Action::Upload => self.submit_upload(),
            Action::Newline => {
                if self.focus == Focus::Question {
                    self.question.insert('\n');
                }
                None
            }
            Action::SwitchField => {
                self.focus = self.focus.toggle();
                None
            }
            Action::Insert(c) => {
                self.focused_input().insert(c);
                None
            }
            Action::Backspace => {
                self.focused_input().backspace();
                None
            }
            Action::Delete => {
                self.focused_input().delete();
                None
            }
            Action::Left => {
                self.focused_input().move_left();
                None
            }
            Action::Right => {
                self.focused_input().move_right();
                None
            }
            Action::Home => {
                self.focused_input().move_home();
                None
            }
            Action::End => {
                self.focused_input().move_end();
                None
            }
            Action::HistoryPrev => {
                match self.focus {
                    Focus::Question => self.question.history_prev(),
                    Focus::Upload => self.view.scroll_up(1),
                }
                None
            }
            Action::HistoryNext => {
                match self.focus {
                    Focus::Question => self.question.history_next(),
                    Focus::Upload => self.view.scroll_down(1),
                }
                None
            }
            Action::ScrollUp => {
                self.view.scroll_up(SCROLL_SPEED);
                None
            }
            Action::ScrollDown => {
                self.view.scroll_down(SCROLL_SPEED);
                None
            }
            Action::PageUp => {
                self.view.page_up();
                None
            }
            Action::PageDown => {
                self.view.page_down();
                None
            }
            Action::ScrollTop => {
                self.view.jump_to_start();
                None
            }
            Action::ScrollBottom => {
                self.view.jump_to_end();
                None
            }
            Action::CopyQuery => {
                self.copy_last_query();
                None
            }
            Action::None => None,
        };

        self.follow_new_entries();
        request
    }

    /// Record a finished request.
    pub fn complete(&mut self, completion: Completion) {
        self.controller.complete(completion);
        self.follow_new_entries();
    }

    /// Number of replies still outstanding.
    pub fn in_flight(&self) -> usize {
        self.controller.in_flight()
    }

    fn submit_question(&mut self) -> Option<Request> {
        let mut text = self.question.content().to_string();
        let request = self.controller.send_question(&mut text)?;
        self.question.submit();
        Some(request)
    }

    fn submit_upload(&mut self) -> Option<Request> {
        let trimmed = self.upload_path.content().trim();
        let selection = (!trimmed.is_empty()).then(|| PathBuf::from(trimmed));
        self.controller.upload_file(selection.as_deref())
    }

    fn focused_input(&mut self) -> &mut TextInputState {
        match self.focus {
            Focus::Question => &mut self.question,
            Focus::Upload => &mut self.upload_path,
        }
    }

    /// Pin the view to the bottom whenever the transcript grew.
    fn follow_new_entries(&mut self) {
        let len = self.controller.transcript().len();
        if len != self.seen_entries {
            self.seen_entries = len;
            self.view.jump_to_end();
        }
    }

    fn copy_last_query(&mut self) {
        let Some(query) = self.controller.transcript().last_query().map(str::to_owned) else {
            self.notice = Some(NO_QUERY_NOTICE.to_string());
            return;
        };

        match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(query)) {
            Ok(()) => {
                debug!("query copied to clipboard");
                self.notice = Some(COPIED_NOTICE.to_string());
            }
            Err(e) => {
                warn!(error = %e, "clipboard unavailable");
                self.notice = Some(format!("Clipboard unavailable: {e}"));
            }
        }
    }
}
