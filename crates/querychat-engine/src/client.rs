//! HTTP client for the querychat backend.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

use crate::config::Config;
use crate::protocol::{AskReply, Question, RawAskResponse, RawUploadResponse, UploadReply};

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

/// Client for the `/ask` and `/upload` endpoints.
///
/// Cheap to clone; clones share one connection pool. No request timeout is
/// configured, so an unanswered request waits until the transport gives up.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    ask_url: String,
    upload_url: String,
}

impl ApiClient {
    /// Create a client for the backend described by `config`.
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let http = Client::builder().build().map_err(ClientError::Http)?;
        Ok(Self {
            http,
            ask_url: config.ask_url(),
            upload_url: config.upload_url(),
        })
    }

    /// Send a question.
    ///
    /// The HTTP status is not used to classify the reply: the backend
    /// reports application errors as `{"error": ...}` bodies with 4xx/5xx
    /// statuses, and those are returned as [`AskReply::Failed`].
    pub async fn ask(&self, question: &str) -> Result<AskReply, ClientError> {
        debug!(url = %self.ask_url, "sending question");
        let response = self
            .http
            .post(&self.ask_url)
            .json(&Question::new(question))
            .send()
            .await
            .map_err(ClientError::Http)?;

        let raw: RawAskResponse = read_json_object(response).await?;
        Ok(raw.into())
    }

    /// Upload a file as multipart form data.
    ///
    /// The file is sent as-is; the backend decides what it accepts.
    pub async fn upload(&self, path: &Path) -> Result<UploadReply, ClientError> {
        let bytes = tokio::fs::read(path).await.map_err(ClientError::Io)?;
        let file_name = path
            .file_name()
            .map_or_else(|| path.to_string_lossy(), |n| n.to_string_lossy())
            .into_owned();

        debug!(url = %self.upload_url, file = %file_name, size = bytes.len(), "uploading file");
        let form = Form::new().part(UPLOAD_FIELD, Part::bytes(bytes).file_name(file_name));

        let response = self
            .http
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(ClientError::Http)?;

        let raw: RawUploadResponse = read_json_object(response).await?;
        Ok(raw.into())
    }
}

/// Read a response body that must be a JSON object.
async fn read_json_object<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(ClientError::Http)?;
    let value: Value = serde_json::from_slice(&bytes).map_err(ClientError::Decode)?;

    if !value.is_object() {
        return Err(ClientError::NotAnObject);
    }
    debug!(%status, "received reply");

    serde_json::from_value(value).map_err(ClientError::Decode)
}

/// Transport and parse failures.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request could not be sent or the body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// The body was not valid JSON.
    #[error("Decode error: {0}")]
    Decode(#[source] serde_json::Error),

    /// The body was JSON but not an object.
    #[error("Response body is not a JSON object")]
    NotAnObject,

    /// The file to upload could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The task running the request ended without producing a reply.
    #[error("Request interrupted: {0}")]
    Interrupted(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rowset::ResultSet;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        let config = Config {
            base_url: server.uri(),
            ..Config::default()
        };
        ApiClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_ask_sends_json_question() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/ask"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"question": "  How many rows? "})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "summary": "3 rows found",
                "sql_query": "SELECT * FROM t",
                "full_result": [{"a": 1, "b": 2}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client_for(&server).ask("  How many rows? ").await.unwrap();

        let AskReply::Answered {
            text,
            sql_query,
            result,
        } = reply
        else {
            panic!("expected an answer");
        };
        assert_eq!(text, "3 rows found");
        assert_eq!(sql_query.as_deref(), Some("SELECT * FROM t"));
        assert!(matches!(result, Some(ResultSet::Table(_))));
    }

    #[tokio::test]
    async fn test_ask_error_body_on_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/ask"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "Please upload a file first."})),
            )
            .mount(&server)
            .await;

        let reply = client_for(&server).ask("anything").await.unwrap();
        assert_eq!(
            reply,
            AskReply::Failed {
                message: "Please upload a file first.".into()
            }
        );
    }

    #[tokio::test]
    async fn test_ask_non_json_body_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/ask"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).ask("anything").await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn test_ask_non_object_body_is_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/ask"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
            .mount(&server)
            .await;

        let err = client_for(&server).ask("anything").await.unwrap_err();
        assert!(matches!(err, ClientError::NotAnObject));
    }

    #[tokio::test]
    async fn test_ask_connection_refused_is_http_error() {
        let config = Config {
            // Port 9 (discard) is not expected to accept HTTP connections
            base_url: "http://127.0.0.1:9".into(),
            ..Config::default()
        };
        let client = ApiClient::new(&config).unwrap();

        let err = client.ask("anything").await.unwrap_err();
        assert!(matches!(err, ClientError::Http(_)));
    }

    #[tokio::test]
    async fn test_upload_sends_multipart_file() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("sales.csv");
        std::fs::write(&file, "Region,Sales\nNorth,12000\n").unwrap();

        Mock::given(method("POST"))
            .and(path("/upload"))
            .and(|request: &Request| {
                let content_type = request
                    .headers
                    .get("content-type")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default();
                let body = String::from_utf8_lossy(&request.body);
                content_type.starts_with("multipart/form-data")
                    && body.contains(r#"name="file"; filename="sales.csv""#)
                    && body.contains("North,12000")
            })
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Successfully uploaded and parsed sales.csv"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client_for(&server).upload(&file).await.unwrap();
        assert_eq!(
            reply,
            UploadReply::Accepted {
                message: "Successfully uploaded and parsed sales.csv".into()
            }
        );
    }

    #[tokio::test]
    async fn test_upload_rejected_by_backend() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, "hello").unwrap();

        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "Unsupported file format"})),
            )
            .mount(&server)
            .await;

        let reply = client_for(&server).upload(&file).await.unwrap();
        assert_eq!(
            reply,
            UploadReply::Failed {
                message: "Unsupported file format".into()
            }
        );
    }

    #[tokio::test]
    async fn test_upload_missing_file_is_io_error() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        let err = client_for(&server)
            .upload(&dir.path().join("missing.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Io(_)));
    }
}
