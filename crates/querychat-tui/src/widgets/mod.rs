//! UI widgets for the TUI.
//!
//! This module provides:
//! - [`InputBar`] - Bordered text field for the question and upload path
//! - [`FooterHints`] - Bottom keybinding hints and notices

mod footer_hints;
mod input_bar;

pub use footer_hints::{FooterHints, KeyHint};
pub use input_bar::InputBar;
