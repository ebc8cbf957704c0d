//! Minimal Gemini REST client.

use std::error::Error as StdError;
use std::fmt;

use serde_json::Value;
use tracing::debug;

use super::{GenerateContentRequest, GenerateContentResponse};
use crate::utils::url::{model_method_url, stream_url};

#[derive(Debug)]
pub enum ApiError {
    Http(reqwest::Error),
    Status { status: u16, message: String },
    Decode(serde_json::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Http(err) => write!(f, "{err}"),
            ApiError::Status { status, message } => write!(f, "{message} (HTTP {status})"),
            ApiError::Decode(err) => write!(f, "Unexpected response from API: {err}"),
        }
    }
}

impl StdError for ApiError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ApiError::Http(err) => Some(err),
            ApiError::Decode(err) => Some(err),
            ApiError::Status { .. } => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Http(err)
    }
}

#[derive(Clone, Debug)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// A POST to `streamGenerateContent?alt=sse`, ready to send.
    pub fn stream_request(&self, request: &GenerateContentRequest) -> reqwest::RequestBuilder {
        self.http
            .post(stream_url(&self.base_url, &self.model))
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(request)
    }

    pub async fn generate(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ApiError> {
        let url = model_method_url(&self.base_url, &self.model, "generateContent");
        debug!(model = %self.model, "generateContent request");
        let response = self
            .http
            .post(url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: summarize_api_error(&body),
            });
        }
        serde_json::from_str(&body).map_err(ApiError::Decode)
    }

    /// Run a request and return the first candidate's text, trimmed.
    pub async fn generate_text(&self, request: &GenerateContentRequest) -> Result<String, ApiError> {
        let response = self.generate(request).await?;
        if let Some(reason) = response.block_reason() {
            debug!(reason, "prompt blocked");
        }
        Ok(response.text().trim().to_string())
    }
}

fn extract_error_summary(value: &Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value.get("error").and_then(|v| match v {
                Value::String(s) => Some(s.to_string()),
                _ => None,
            })
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary.map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// One-line description of an error body.
///
/// JSON bodies use `error.message` when present; anything else is collapsed
/// to a single line.
pub fn summarize_api_error(error_text: &str) -> String {
    let trimmed = error_text.trim();
    if trimmed.is_empty() {
        return "Empty response from API".to_string();
    }

    // Gemini sometimes wraps the error object in an array.
    let parsed = serde_json::from_str::<Value>(trimmed).ok().map(|value| match value {
        Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
        other => other,
    });

    if let Some(summary) = parsed.as_ref().and_then(extract_error_summary) {
        if !summary.is_empty() {
            return summary;
        }
    }

    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}
