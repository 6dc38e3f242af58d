//! The conversation transcript.
//!
//! An append-only, ordered log of typed entries. Entries are never edited
//! or removed once pushed; the UI is a projection of this model.

use chrono::{DateTime, Local, Utc};
use std::fmt;

use crate::rowset::RowSet;

/// Placeholder shown when a result has no rows to display.
pub const NO_RESULTS_TEXT: &str = "No detailed results to display.";

/// Sequence number assigned to each dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Who a message bubble belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The person typing.
    User,
    /// The backend.
    Assistant,
}

impl Role {
    /// Short label used in plain-text output.
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "you",
            Self::Assistant => "assistant",
        }
    }
}

/// The kind and payload of a transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// Text the user sent.
    UserMessage(String),
    /// Text from the backend, or a local notice.
    AssistantMessage(String),
    /// Literal SQL echoed back by the backend.
    QueryBlock(String),
    /// Tabular result.
    ResultTable(RowSet),
    /// A result was sent but had nothing to show.
    ResultEmpty,
}

impl EntryKind {
    /// The message role, for chat bubbles.
    pub fn role(&self) -> Option<Role> {
        match self {
            Self::UserMessage(_) => Some(Role::User),
            Self::AssistantMessage(_) => Some(Role::Assistant),
            _ => None,
        }
    }

    /// Text payload of a message or query block.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::UserMessage(text) | Self::AssistantMessage(text) | Self::QueryBlock(text) => {
                Some(text)
            }
            Self::ResultTable(_) | Self::ResultEmpty => None,
        }
    }
}

/// A single appended transcript unit.
#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    /// Sequential entry id.
    pub id: u64,
    /// The request this entry belongs to, if any.
    pub request: Option<RequestId>,
    /// When the entry was appended.
    pub timestamp: DateTime<Utc>,
    /// What the entry shows.
    pub kind: EntryKind,
}

impl TranscriptEntry {
    /// Timestamp formatted for display (HH:MM in local time).
    pub fn time_str(&self) -> String {
        let local: DateTime<Local> = self.timestamp.into();
        local.format("%H:%M").to_string()
    }
}

/// Append-only transcript.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    next_id: u64,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and return it.
    pub fn push(&mut self, kind: EntryKind, request: Option<RequestId>) -> &TranscriptEntry {
        self.next_id += 1;
        self.entries.push(TranscriptEntry {
            id: self.next_id,
            request,
            timestamp: Utc::now(),
            kind,
        });
        &self.entries[self.entries.len() - 1]
    }

    /// All entries in order.
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Kinds of all entries, in order.
    pub fn kinds(&self) -> impl Iterator<Item = &EntryKind> {
        self.entries.iter().map(|e| &e.kind)
    }

    /// Entries appended at or after `index`.
    pub fn since(&self, index: usize) -> &[TranscriptEntry] {
        &self.entries[index.min(self.entries.len())..]
    }

    /// The most recent query block, if any.
    pub fn last_query(&self) -> Option<&str> {
        self.entries.iter().rev().find_map(|e| match &e.kind {
            EntryKind::QueryBlock(sql) => Some(sql.as_str()),
            _ => None,
        })
    }

    /// Render the whole transcript as plain text.
    pub fn render_plain(&self) -> String {
        render_plain(&self.entries)
    }
}

/// Render entries as plain text, one block per entry.
pub fn render_plain(entries: &[TranscriptEntry]) -> String {
    let mut out = String::new();

    for entry in entries {
        match &entry.kind {
            EntryKind::UserMessage(text) => push_prefixed(&mut out, Role::User.label(), text),
            EntryKind::AssistantMessage(text) => {
                push_prefixed(&mut out, Role::Assistant.label(), text);
            }
            EntryKind::QueryBlock(sql) => push_prefixed(&mut out, "sql", sql),
            EntryKind::ResultTable(rows) => {
                out.push_str(&rows.header().join(" | "));
                out.push('\n');
                for row in rows.rows() {
                    out.push_str(&row.join(" | "));
                    out.push('\n');
                }
            }
            EntryKind::ResultEmpty => {
                out.push_str(NO_RESULTS_TEXT);
                out.push('\n');
            }
        }
    }

    out
}

fn push_prefixed(out: &mut String, label: &str, text: &str) {
    let indent = " ".repeat(label.len() + 2);
    for (i, line) in text.lines().enumerate() {
        if i == 0 {
            out.push_str(label);
            out.push_str(": ");
        } else {
            out.push_str(&indent);
        }
        out.push_str(line);
        out.push('\n');
    }
    if text.lines().next().is_none() {
        out.push_str(label);
        out.push_str(":\n");
    }
}
