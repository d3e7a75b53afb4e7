use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::session::RecognitionMode;

/// One upload to the OCR endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrRequest {
    pub file_name: String,
    pub content: Vec<u8>,
    pub mime: &'static str,
    pub mode: RecognitionMode,
}

/// Successful reply body. The server sends `"result": null` when the model
/// produced nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OcrReply {
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    /// Non-2xx reply; `message` is the server's `detail` when it sent one.
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("could not reach the OCR server: {0}")]
    Transport(#[from] reqwest::Error),
    /// 2xx reply whose body is not the expected JSON.
    #[error("the OCR server sent an unreadable reply: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("recognition task failed: {0}")]
    Task(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

impl OcrError {
    /// Build the error for a non-success status, preferring a string `detail`
    /// from the JSON body. Validation errors carry a list there; those fall
    /// back to the generic message.
    pub fn from_response(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.detail)
            .and_then(|d| match d {
                serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
                _ => None,
            });
        let message = detail.unwrap_or_else(|| format!("OCR server returned HTTP {status}"));
        OcrError::Server { status, message }
    }
}

/// Something that turns an image upload into recognized text.
#[async_trait]
pub trait RecognitionBackend: Send + Sync {
    async fn recognize(&self, request: OcrRequest) -> Result<OcrReply, OcrError>;
}

/// `POST {endpoint}` with a multipart body of `file` and `mode`.
pub struct HttpRecognizer {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRecognizer {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn build_form(request: OcrRequest) -> Result<Form, OcrError> {
    let part = Part::bytes(request.content)
        .file_name(request.file_name)
        .mime_str(request.mime)?;
    Ok(Form::new()
        .part("file", part)
        .text("mode", request.mode.wire_value()))
}

#[async_trait]
impl RecognitionBackend for HttpRecognizer {
    async fn recognize(&self, request: OcrRequest) -> Result<OcrReply, OcrError> {
        log::info!(
            "Uploading {} ({} bytes, mode={}) to {}",
            request.file_name,
            request.content.len(),
            request.mode.wire_value(),
            self.endpoint
        );

        let form = build_form(request)?;
        let resp = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(OcrError::from_response(status.as_u16(), &text));
        }

        let body = resp.text().await?;
        serde_json::from_str::<OcrReply>(&body).map_err(OcrError::Decode)
    }
}
