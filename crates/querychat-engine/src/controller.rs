//! Interaction controller.
//!
//! Turns user intent (send a question, upload a file) into requests and
//! turns every possible outcome into transcript entries. The controller
//! never touches the network itself: it hands out [`Request`]s, and the
//! caller feeds the resulting [`Completion`]s back in. That keeps the whole
//! state machine testable without a server.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::client::{ApiClient, ClientError};
use crate::config::ReplyOrdering;
use crate::protocol::{AskReply, UploadReply};
use crate::rowset::ResultSet;
use crate::transcript::{EntryKind, RequestId, Transcript};

/// Shown when `/ask` fails in transport or parsing.
pub const ASK_FAILED_TEXT: &str = "Sorry, something went wrong.";

/// Shown when `/upload` fails in transport or parsing.
pub const UPLOAD_FAILED_TEXT: &str = "Sorry, something went wrong during file upload.";

/// Shown when an upload is triggered without a file.
pub const NO_FILE_TEXT: &str = "Please select a file to upload.";

/// A question ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskRequest {
    pub id: RequestId,
    pub question: String,
}

/// A file ready to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub id: RequestId,
    pub path: PathBuf,
}

/// A request handed out by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Ask(AskRequest),
    Upload(UploadRequest),
}

impl Request {
    /// Sequence number of the request.
    pub fn id(&self) -> RequestId {
        match self {
            Self::Ask(r) => r.id,
            Self::Upload(r) => r.id,
        }
    }

    /// Which endpoint the request targets.
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Ask(_) => RequestKind::Ask,
            Self::Upload(_) => RequestKind::Upload,
        }
    }
}

/// Endpoint of a request, kept alongside a dispatched task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Ask,
    Upload,
}

/// The outcome of a dispatched request.
#[derive(Debug)]
pub enum Completion {
    Ask {
        id: RequestId,
        result: Result<AskReply, ClientError>,
    },
    Upload {
        id: RequestId,
        result: Result<UploadReply, ClientError>,
    },
}

impl Completion {
    /// A completion for a request that produced no reply at all.
    pub fn failed(id: RequestId, kind: RequestKind, error: ClientError) -> Self {
        match kind {
            RequestKind::Ask => Self::Ask {
                id,
                result: Err(error),
            },
            RequestKind::Upload => Self::Upload {
                id,
                result: Err(error),
            },
        }
    }
}

/// Run a request against the backend.
pub async fn execute(client: &ApiClient, request: Request) -> Completion {
    match request {
        Request::Ask(AskRequest { id, question }) => Completion::Ask {
            id,
            result: client.ask(&question).await,
        },
        Request::Upload(UploadRequest { id, path }) => Completion::Upload {
            id,
            result: client.upload(&path).await,
        },
    }
}

/// Run a request on the tokio runtime without waiting for it.
pub fn spawn_request(client: &ApiClient, request: Request) -> JoinHandle<Completion> {
    let client = client.clone();
    tokio::spawn(async move { execute(&client, request).await })
}

/// Controller state: the transcript plus request bookkeeping.
#[derive(Debug)]
pub struct Controller {
    transcript: Transcript,
    ordering: ReplyOrdering,
    next_request: u64,
    /// Dispatched requests without a completion yet.
    outstanding: BTreeSet<RequestId>,
    /// Completed requests held back by sequential ordering.
    held: BTreeMap<RequestId, Vec<EntryKind>>,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(ReplyOrdering::default())
    }
}

impl Controller {
    /// Create a controller with an empty transcript.
    pub fn new(ordering: ReplyOrdering) -> Self {
        Self {
            transcript: Transcript::new(),
            ordering,
            next_request: 0,
            outstanding: BTreeSet::new(),
            held: BTreeMap::new(),
        }
    }

    /// The transcript built so far.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Number of dispatched requests still awaiting a completion.
    pub fn in_flight(&self) -> usize {
        self.outstanding.len()
    }

    /// Whether any request is awaiting a completion.
    pub fn is_waiting(&self) -> bool {
        !self.outstanding.is_empty()
    }

    /// Send the text in `input` as a question.
    ///
    /// Whitespace-only input is ignored: nothing is appended, nothing is
    /// returned and `input` is left as it was. Otherwise the text is echoed
    /// into the transcript and `input` is cleared before the request exists.
    pub fn send_question(&mut self, input: &mut String) -> Option<Request> {
        if input.trim().is_empty() {
            return None;
        }

        let question = std::mem::take(input);
        let id = self.allocate();
        self.transcript
            .push(EntryKind::UserMessage(question.clone()), Some(id));
        debug!(request = %id, "question queued");

        Some(Request::Ask(AskRequest { id, question }))
    }

    /// Upload the selected file, if there is one.
    pub fn upload_file(&mut self, selection: Option<&Path>) -> Option<Request> {
        let Some(path) = selection else {
            self.transcript
                .push(EntryKind::AssistantMessage(NO_FILE_TEXT.into()), None);
            return None;
        };

        let id = self.allocate();
        debug!(request = %id, file = %path.display(), "upload queued");

        Some(Request::Upload(UploadRequest {
            id,
            path: path.to_path_buf(),
        }))
    }

    /// Record the outcome of a dispatched request.
    pub fn complete(&mut self, completion: Completion) {
        match completion {
            Completion::Ask { id, result } => self.complete_ask(id, result),
            Completion::Upload { id, result } => self.complete_upload(id, result),
        }
    }

    /// Record the outcome of a question.
    pub fn complete_ask(&mut self, id: RequestId, result: Result<AskReply, ClientError>) {
        let entries = match result {
            Ok(reply) => ask_entries(reply),
            Err(e) => {
                error!(request = %id, error = %e, "question failed");
                vec![EntryKind::AssistantMessage(ASK_FAILED_TEXT.into())]
            }
        };
        self.settle(id, entries);
    }

    /// Record the outcome of an upload.
    pub fn complete_upload(&mut self, id: RequestId, result: Result<UploadReply, ClientError>) {
        let entries = match result {
            Ok(UploadReply::Failed { message }) => {
                vec![EntryKind::AssistantMessage(format!("Error: {message}"))]
            }
            Ok(UploadReply::Accepted { message }) => vec![EntryKind::AssistantMessage(message)],
            Err(e) => {
                error!(request = %id, error = %e, "upload failed");
                vec![EntryKind::AssistantMessage(UPLOAD_FAILED_TEXT.into())]
            }
        };
        self.settle(id, entries);
    }

    fn allocate(&mut self) -> RequestId {
        self.next_request += 1;
        let id = RequestId(self.next_request);
        self.outstanding.insert(id);
        id
    }

    fn settle(&mut self, id: RequestId, entries: Vec<EntryKind>) {
        if !self.outstanding.remove(&id) {
            warn!(request = %id, "completion for unknown request ignored");
            return;
        }

        match self.ordering {
            ReplyOrdering::Arrival => self.append(id, entries),
            ReplyOrdering::Sequential => {
                self.held.insert(id, entries);
                self.flush_held();
            }
        }
    }

    /// Append held completions whose predecessors have all completed.
    fn flush_held(&mut self) {
        while let Some(entry) = self.held.first_entry() {
            let ready = self
                .outstanding
                .first()
                .map_or(true, |oldest| oldest > entry.key());
            if !ready {
                break;
            }
            let id = *entry.key();
            let entries = entry.remove();
            self.append(id, entries);
        }
    }

    fn append(&mut self, id: RequestId, entries: Vec<EntryKind>) {
        for kind in entries {
            self.transcript.push(kind, Some(id));
        }
    }
}

/// Entries produced by a question reply, in display order.
pub fn ask_entries(reply: AskReply) -> Vec<EntryKind> {
    match reply {
        AskReply::Failed { message } => {
            vec![EntryKind::AssistantMessage(format!("Error: {message}"))]
        }
        AskReply::Answered {
            text,
            sql_query,
            result,
        } => {
            let mut entries = vec![EntryKind::AssistantMessage(text)];
            if let Some(sql) = sql_query {
                entries.push(EntryKind::QueryBlock(sql));
            }
            match result {
                Some(ResultSet::Table(rows)) => {
                    if !rows.is_uniform() {
                        warn!(
                            padded = rows.padded_cells(),
                            dropped = rows.extra_keys(),
                            "result records disagree with the column schema"
                        );
                    }
                    entries.push(EntryKind::ResultTable(rows));
                }
                Some(ResultSet::Empty) => entries.push(EntryKind::ResultEmpty),
                None => {}
            }
            entries
        }
    }
}
