//! querychat-engine: Headless core of the querychat client
//!
//! This crate provides everything except the terminal, including:
//! - Configuration loading and validation
//! - The `/ask` and `/upload` wire contract and HTTP client
//! - Tabular results with an explicit column schema
//! - The append-only transcript and the interaction controller

pub mod client;
pub mod config;
pub mod controller;
pub mod protocol;
pub mod rowset;
pub mod transcript;

// Re-export commonly used types
pub use client::{ApiClient, ClientError};
pub use config::{Config, ConfigError, ReplyOrdering};
pub use controller::{
    execute, spawn_request, Completion, Controller, Request, RequestKind, ASK_FAILED_TEXT,
    NO_FILE_TEXT, UPLOAD_FAILED_TEXT,
};
pub use protocol::{AskReply, UploadReply};
pub use rowset::{Column, ResultSet, RowSet};
pub use transcript::{EntryKind, RequestId, Role, Transcript, TranscriptEntry, NO_RESULTS_TEXT};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
