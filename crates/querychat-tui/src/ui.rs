//! Screen layout for the querychat TUI.
//!
//! Regions:
//! 1. Transcript (top, expands)
//! 2. Question input (3-7 lines)
//! 3. Upload path input (3 lines)
//! 4. Footer hints (bottom, 1 line)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use crate::app::{App, Focus};
use crate::transcript::TranscriptPane;
use crate::widgets::{FooterHints, InputBar};

/// Smallest question box, borders included.
const QUESTION_MIN_HEIGHT: u16 = 3;
/// Largest question box, borders included.
const QUESTION_MAX_HEIGHT: u16 = 7;

/// Split the screen into transcript, question, upload and footer areas.
pub fn main_layout(area: Rect, question_lines: usize) -> [Rect; 4] {
    let question_height = u16::try_from(question_lines.saturating_add(2))
        .unwrap_or(QUESTION_MAX_HEIGHT)
        .clamp(QUESTION_MIN_HEIGHT, QUESTION_MAX_HEIGHT);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),                  // Transcript (expands)
            Constraint::Length(question_height), // Question
            Constraint::Length(3),               // Upload path
            Constraint::Length(1),               // Footer hints
        ])
        .split(area);

    [chunks[0], chunks[1], chunks[2], chunks[3]]
}

/// Draw the whole screen.
pub fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let question_lines = app.question.content().split('\n').count();
    let [transcript_area, question_area, upload_area, footer_area] =
        main_layout(frame.area(), question_lines);

    let title = format!(" querychat \u{00b7} {} ", app.backend_url);
    let pane = TranscriptPane::new(app.controller.transcript(), &app.theme)
        .title(&title)
        .waiting(app.controller.in_flight());
    frame.render_stateful_widget(pane, transcript_area, &mut app.view);

    let question = InputBar::new(&app.question, &app.theme)
        .title(" Question ")
        .placeholder("Ask a question about your data")
        .focused(app.focus == Focus::Question);
    frame.render_widget(question, question_area);

    let upload = InputBar::new(&app.upload_path, &app.theme)
        .title(" Upload file (path) ")
        .placeholder("path/to/data.csv")
        .focused(app.focus == Focus::Upload);
    frame.render_widget(upload, upload_area);

    let hints = FooterHints::for_focus(app.focus);
    let footer = FooterHints::new(&hints, &app.theme).notice(app.notice.as_deref());
    frame.render_widget(footer, footer_area);
}
