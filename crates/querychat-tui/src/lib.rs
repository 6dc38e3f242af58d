//! querychat-tui: Terminal UI for the querychat client
//!
//! This crate provides the interactive front end, including:
//! - The scrollable transcript pane
//! - Question and upload path inputs
//! - The event loop that dispatches requests and applies their replies

mod app;
mod event;
pub mod input;
#[cfg(test)]
pub mod test_utils;
mod text;
mod theme;
pub mod transcript;
mod ui;
pub mod widgets;

pub use app::{App, Focus};
pub use event::{Action, Event, EventHandler};
pub use querychat_engine;
pub use theme::Theme;

use crossterm::{
    cursor::Show as ShowCursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use querychat_engine::{
    spawn_request, ApiClient, ClientError, Completion, Config, Controller, RequestId, RequestKind,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Event loop tick rate; also bounds how late a finished reply is drawn.
const TICK_RATE_MS: u64 = 100;

/// A dispatched request and the task running it.
struct PendingRequest {
    id: RequestId,
    kind: RequestKind,
    handle: JoinHandle<Completion>,
}

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen, ShowCursor);
    }
}

/// Run the TUI application against the configured backend.
///
/// Sets up the terminal, runs the event loop, and restores the terminal on
/// exit. Requests still in flight when the user quits are aborted.
pub async fn run_tui(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let client = ApiClient::new(config)?;
    let controller = Controller::new(config.reply_ordering);
    let mut app = App::new(controller, config.base_url.clone()).with_theme(Theme::from_env());

    // Setup terminal with RAII guard for cleanup
    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut events = EventHandler::new(TICK_RATE_MS);
    info!(backend = %config.base_url, "tui started");

    let result = run_loop(&mut terminal, &mut app, &mut events, &client).await;

    // Restore cursor before guard drops
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
    client: &ApiClient,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut pending: Vec<PendingRequest> = Vec::new();

    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        if let Some(event) = events.next().await {
            let request = match event {
                Event::Key(key) => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_action(event::mouse_to_action(mouse)),
                // Redrawn at the top of the loop
                Event::Tick | Event::Resize(_, _) => None,
            };
            if let Some(request) = request {
                pending.push(PendingRequest {
                    id: request.id(),
                    kind: request.kind(),
                    handle: spawn_request(client, request),
                });
            }
        }

        drain_finished(app, &mut pending).await;

        if app.should_quit {
            let outstanding = pending.len();
            for request in pending {
                request.handle.abort();
            }
            info!(pending = outstanding, "tui stopped");
            break;
        }
    }

    Ok(())
}

/// Apply every finished request without blocking on the rest.
///
/// A task that ended without a completion still settles its request, so the
/// transcript never waits on it.
async fn drain_finished(app: &mut App, pending: &mut Vec<PendingRequest>) {
    let mut i = 0;
    while i < pending.len() {
        if !pending[i].handle.is_finished() {
            i += 1;
            continue;
        }
        let PendingRequest { id, kind, handle } = pending.remove(i);
        let completion = match handle.await {
            Ok(completion) => completion,
            Err(e) => {
                warn!(request = %id, error = %e, "request task did not complete");
                Completion::failed(id, kind, ClientError::Interrupted(e.to_string()))
            }
        };
        app.complete(completion);
    }
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Action;
    use crate::test_utils::{create_test_app, create_test_app_with_ordering};
    use querychat_engine::{
        AskReply, EntryKind, ReplyOrdering, Request, ASK_FAILED_TEXT, UPLOAD_FAILED_TEXT,
    };

    async fn until_finished(pending: &[PendingRequest]) {
        while !pending.iter().all(|p| p.handle.is_finished()) {
            tokio::task::yield_now().await;
        }
    }

    fn pending_for(request: &Request, handle: JoinHandle<Completion>) -> PendingRequest {
        PendingRequest {
            id: request.id(),
            kind: request.kind(),
            handle,
        }
    }

    /// A request task that ends without a completion.
    fn aborted() -> JoinHandle<Completion> {
        let handle = tokio::spawn(std::future::pending::<Completion>());
        handle.abort();
        handle
    }

    #[tokio::test]
    async fn test_aborted_request_settles() {
        let mut app = create_test_app();
        app.question.set("hello");
        let Some(request) = app.handle_action(Action::Submit) else {
            panic!("expected a request");
        };

        let mut pending = vec![pending_for(&request, aborted())];
        until_finished(&pending).await;
        drain_finished(&mut app, &mut pending).await;

        assert!(pending.is_empty());
        assert_eq!(app.in_flight(), 0);
        assert_eq!(
            app.controller.transcript().entries()[1].kind,
            EntryKind::AssistantMessage(ASK_FAILED_TEXT.into())
        );
    }

    #[tokio::test]
    async fn test_aborted_upload_releases_held_replies() {
        let mut app = create_test_app_with_ordering(ReplyOrdering::Sequential);
        app.upload_path.set("a.csv");
        let Some(upload) = app.handle_action(Action::Upload) else {
            panic!("expected an upload");
        };
        app.question.set("q");
        let Some(question) = app.handle_action(Action::Submit) else {
            panic!("expected a question");
        };

        let answer = Completion::Ask {
            id: question.id(),
            result: Ok(AskReply::Answered {
                text: "answer".into(),
                sql_query: None,
                result: None,
            }),
        };
        let mut pending = vec![
            pending_for(&upload, aborted()),
            pending_for(&question, tokio::spawn(async move { answer })),
        ];
        until_finished(&pending).await;
        drain_finished(&mut app, &mut pending).await;

        let texts: Vec<_> = app
            .controller
            .transcript()
            .kinds()
            .filter_map(EntryKind::text)
            .collect();
        assert_eq!(texts, vec!["q", UPLOAD_FAILED_TEXT, "answer"]);
        assert!(!app.controller.is_waiting());
    }

    #[test]
    fn test_tui_version() {
        let version = tui_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }
}
