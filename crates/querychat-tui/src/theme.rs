//! Catppuccin Mocha color palette for the TUI.

use ratatui::style::{Color, Modifier, Style};

/// Theme color palette.
#[derive(Debug, Clone)]
pub struct Theme {
    // Backgrounds
    pub base: Color,
    pub surface: Color,

    // Foregrounds
    pub text: Color,
    pub subtext: Color,
    pub muted: Color,

    // Accents
    pub primary: Color,
    pub warning: Color,

    // Transcript roles
    pub user: Color,
    pub assistant: Color,
    pub query: Color,

    // Borders
    pub border: Color,
    pub border_focused: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::mocha()
    }
}

impl Theme {
    /// Catppuccin Mocha theme (default dark theme).
    pub fn mocha() -> Self {
        Self {
            base: Color::Rgb(30, 30, 46),    // #1e1e2e
            surface: Color::Rgb(49, 50, 68), // #313244

            text: Color::Rgb(205, 214, 244),    // #cdd6f4
            subtext: Color::Rgb(166, 173, 200), // #a6adc8
            muted: Color::Rgb(108, 112, 134),   // #6c7086

            primary: Color::Rgb(180, 190, 254), // #b4befe (lavender)
            warning: Color::Rgb(249, 226, 175), // #f9e2af (yellow)

            user: Color::Rgb(250, 179, 135),      // #fab387 (peach)
            assistant: Color::Rgb(137, 180, 250), // #89b4fa (blue)
            query: Color::Rgb(148, 226, 213),     // #94e2d5 (teal)

            border: Color::Rgb(69, 71, 90),            // #45475a
            border_focused: Color::Rgb(180, 190, 254), // #b4befe (lavender)
        }
    }

    /// Terminal-default colors only, for `NO_COLOR`.
    pub fn mono() -> Self {
        Self {
            base: Color::Reset,
            surface: Color::Reset,
            text: Color::Reset,
            subtext: Color::Reset,
            muted: Color::DarkGray,
            primary: Color::Reset,
            warning: Color::Reset,
            user: Color::Reset,
            assistant: Color::Reset,
            query: Color::Reset,
            border: Color::Reset,
            border_focused: Color::Reset,
        }
    }

    /// Pick a theme from the environment, respecting `NO_COLOR`.
    pub fn from_env() -> Self {
        if std::env::var_os("NO_COLOR").is_some() {
            Self::mono()
        } else {
            Self::mocha()
        }
    }

    /// Style for table headers.
    pub fn header(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for query blocks.
    pub fn code(&self) -> Style {
        Style::default().fg(self.query).bg(self.surface)
    }
}
