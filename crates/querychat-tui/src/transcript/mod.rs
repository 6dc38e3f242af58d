//! Transcript pane module.
//!
//! The transcript pane fills the top of the screen, containing:
//! - Entries projected onto styled lines
//! - Scroll state that follows the newest entry

mod lines;
mod view;
mod widget;

pub use lines::{column_widths, entry_lines};
pub use view::{TranscriptView, SCROLL_SPEED};
pub use widget::{TranscriptPane, EMPTY_HINT};
