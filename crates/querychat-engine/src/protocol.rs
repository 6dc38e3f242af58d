//! Wire contract for the `/ask` and `/upload` endpoints.
//!
//! Two variants of the `/ask` response exist in the wild: one answers with
//! `summary` and `full_result`, the other with `answer` only. Both are
//! accepted here and normalised into a single [`AskReply`] so nothing past
//! this module branches on optional fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rowset::{cell_text, ResultSet};

/// Text used when an answer carries neither `summary` nor `answer`.
pub const NO_SUMMARY_TEXT: &str = "No summary provided.";

/// Body of `POST /ask`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// The question text, as typed.
    pub question: String,
}

impl Question {
    /// Create a new question body.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }
}

/// Raw `/ask` response, before normalisation.
///
/// Every field is kept as a loose JSON value because the backend is not
/// strict about types.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAskResponse {
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub answer: Option<Value>,
    #[serde(default)]
    pub summary: Option<Value>,
    #[serde(default)]
    pub sql_query: Option<Value>,
    #[serde(default)]
    pub full_result: Option<Value>,
}

/// Raw `/upload` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawUploadResponse {
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
}

/// Canonical `/ask` reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskReply {
    /// The backend reported an application-level error.
    Failed {
        /// Error text from the backend.
        message: String,
    },
    /// The backend answered the question.
    Answered {
        /// Human-readable answer.
        text: String,
        /// The SQL the backend ran or suggests.
        sql_query: Option<String>,
        /// Detailed rows, if the backend sent any.
        result: Option<ResultSet>,
    },
}

impl From<RawAskResponse> for AskReply {
    fn from(raw: RawAskResponse) -> Self {
        if let Some(error) = truthy(raw.error.as_ref()) {
            return Self::Failed {
                message: cell_text(error),
            };
        }

        let text = truthy(raw.summary.as_ref())
            .or_else(|| truthy(raw.answer.as_ref()))
            .map_or_else(|| NO_SUMMARY_TEXT.to_string(), cell_text);

        Self::Answered {
            text,
            sql_query: truthy(raw.sql_query.as_ref()).map(cell_text),
            result: truthy(raw.full_result.as_ref()).map(ResultSet::from_value),
        }
    }
}

/// Canonical `/upload` reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadReply {
    /// The backend rejected the file.
    Failed {
        /// Error text from the backend.
        message: String,
    },
    /// The backend accepted the file.
    Accepted {
        /// Confirmation text, empty when the backend sent none.
        message: String,
    },
}

impl From<RawUploadResponse> for UploadReply {
    fn from(raw: RawUploadResponse) -> Self {
        if let Some(error) = truthy(raw.error.as_ref()) {
            return Self::Failed {
                message: cell_text(error),
            };
        }

        Self::Accepted {
            message: raw.message.as_ref().map(cell_text).unwrap_or_default(),
        }
    }
}

/// Whether a JSON value counts as present.
///
/// `null`, `false`, zero and the empty string are absent. Arrays and
/// objects are present even when empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn truthy(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| is_truthy(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ask(value: Value) -> AskReply {
        serde_json::from_value::<RawAskResponse>(value).unwrap().into()
    }

    fn upload(value: Value) -> UploadReply {
        serde_json::from_value::<RawUploadResponse>(value).unwrap().into()
    }

    #[test]
    fn test_question_serialization() {
        let body = serde_json::to_string(&Question::new("How many rows?")).unwrap();
        assert_eq!(body, r#"{"question":"How many rows?"}"#);
    }

    #[test]
    fn test_error_wins_over_answer() {
        let reply = ask(json!({"error": "bad query", "summary": "ignored"}));
        assert_eq!(
            reply,
            AskReply::Failed {
                message: "bad query".into()
            }
        );
    }

    #[test]
    fn test_empty_error_is_not_an_error() {
        let reply = ask(json!({"error": "", "answer": "42"}));
        assert!(matches!(reply, AskReply::Answered { ref text, .. } if text == "42"));
    }

    #[test]
    fn test_summary_preferred_over_answer() {
        let reply = ask(json!({"summary": "3 rows found", "answer": "three"}));
        assert!(matches!(reply, AskReply::Answered { ref text, .. } if text == "3 rows found"));
    }

    #[test]
    fn test_answer_variant() {
        let reply = ask(json!({"answer": "Total stock is 120", "sql_query": "SELECT SUM(Stock) FROM t"}));
        assert_eq!(
            reply,
            AskReply::Answered {
                text: "Total stock is 120".into(),
                sql_query: Some("SELECT SUM(Stock) FROM t".into()),
                result: None,
            }
        );
    }

    #[test]
    fn test_fallback_text() {
        let reply = ask(json!({"sql_query": ""}));
        assert_eq!(
            reply,
            AskReply::Answered {
                text: NO_SUMMARY_TEXT.into(),
                sql_query: None,
                result: None,
            }
        );
    }

    #[test]
    fn test_empty_full_result_is_present() {
        let reply = ask(json!({"summary": "nothing", "full_result": []}));
        assert!(matches!(
            reply,
            AskReply::Answered {
                result: Some(ResultSet::Empty),
                ..
            }
        ));
    }

    #[test]
    fn test_null_full_result_is_absent() {
        let reply = ask(json!({"summary": "nothing", "full_result": null}));
        assert!(matches!(reply, AskReply::Answered { result: None, .. }));
    }

    #[test]
    fn test_upload_replies() {
        assert_eq!(
            upload(json!({"error": "Unsupported file format"})),
            UploadReply::Failed {
                message: "Unsupported file format".into()
            }
        );
        assert_eq!(
            upload(json!({"message": "Successfully uploaded and parsed sales.csv"})),
            UploadReply::Accepted {
                message: "Successfully uploaded and parsed sales.csv".into()
            }
        );
        assert_eq!(
            upload(json!({})),
            UploadReply::Accepted {
                message: String::new()
            }
        );
    }

    #[test]
    fn test_null_upload_message_is_empty() {
        assert_eq!(
            upload(json!({"message": null})),
            UploadReply::Accepted {
                message: String::new()
            }
        );
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!(-1)));
    }
}
