//! HTTP client for the Granola API.
//!
//! Every endpoint is a `POST` with a JSON body, authenticated with the desktop
//! app's bearer token. One attempt per request; failures go to the caller.

use super::models::{MeetingDetail, MeetingSummary, TranscriptSegment};
use super::pagination::{PageFetcher, Paginator, PAGE_SIZE};
use super::MeetingSource;
use crate::auth::Token;
use crate::config::Config;
use crate::error::{GranolaError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

const DOCUMENTS_ENDPOINT: &str = "get-documents";
const TRANSCRIPT_ENDPOINT: &str = "get-document-transcript";

/// `get-documents` returns either a bare list or `{"docs": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DocumentsResponse {
    List(Vec<Value>),
    Wrapped {
        #[serde(default)]
        docs: Vec<Value>,
    },
}

impl DocumentsResponse {
    fn into_docs(self) -> Vec<Value> {
        match self {
            Self::List(docs) | Self::Wrapped { docs } => docs,
        }
    }
}

/// Granola API client. Holds the token it was built with.
pub struct GranolaClient {
    client: reqwest::blocking::Client,
    base_url: String,
    token: Token,
    timeout: Duration,
    page_size: usize,
}

impl GranolaClient {
    pub fn new(token: Token, config: &Config) -> Result<Self> {
        let timeout = config.timeout();
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("granola-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GranolaError::Network(format!("Cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base().to_string(),
            token,
            timeout,
            page_size: PAGE_SIZE,
        })
    }

    /// POST `body` to `endpoint` and decode the JSON response.
    fn post<T: DeserializeOwned>(&self, endpoint: &str, body: &Value) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!(%url, %body, "POST");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.token.secret())
            .json(body)
            .send()
            .map_err(|e| self.transport_error(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(error_for_status(status.as_u16(), &text, endpoint));
        }

        response
            .json()
            .map_err(|e| self.transport_error(endpoint, e))
    }

    fn transport_error(&self, endpoint: &str, err: reqwest::Error) -> GranolaError {
        if err.is_timeout() {
            GranolaError::Network(format!(
                "{} timed out after {}s",
                endpoint,
                self.timeout.as_secs()
            ))
        } else if err.is_decode() {
            GranolaError::Network(format!("{} returned an unexpected body: {}", endpoint, err))
        } else {
            GranolaError::Network(format!("{} failed: {}", endpoint, err))
        }
    }

    /// One page of raw documents.
    pub fn fetch_documents(&self, offset: usize, limit: usize) -> Result<Vec<Value>> {
        let response: DocumentsResponse = self.post(
            DOCUMENTS_ENDPOINT,
            &json!({ "limit": limit, "offset": offset }),
        )?;
        Ok(response.into_docs())
    }

    /// Transcript segments of one document.
    pub fn fetch_transcript(&self, document_id: &str) -> Result<Vec<TranscriptSegment>> {
        let value: Value = self.post(TRANSCRIPT_ENDPOINT, &json!({ "document_id": document_id }))?;
        parse_transcript(value)
    }
}

impl PageFetcher for GranolaClient {
    fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<Value>> {
        self.fetch_documents(offset, limit)
    }
}

impl MeetingSource for GranolaClient {
    fn meetings(&self) -> Box<dyn Iterator<Item = Result<MeetingSummary>> + '_> {
        Box::new(Paginator::new(self, self.page_size))
    }

    fn fetch_detail(&self, summary: &MeetingSummary) -> Result<MeetingDetail> {
        let transcript = self.fetch_transcript(&summary.id)?;
        Ok(MeetingDetail::new(summary.clone(), transcript))
    }
}

/// Map a non-success HTTP status to an error kind.
pub fn error_for_status(status: u16, body: &str, endpoint: &str) -> GranolaError {
    match status {
        401 | 403 => GranolaError::AuthRejected { status },
        404 => GranolaError::NotFound(format!("{} returned 404", endpoint)),
        _ => {
            let body: String = body.chars().take(200).collect();
            GranolaError::Network(format!("{} returned HTTP {}: {}", endpoint, status, body))
        }
    }
}

/// A transcript response is a list of segments; `null` means no transcript.
fn parse_transcript(value: Value) -> Result<Vec<TranscriptSegment>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(_) => serde_json::from_value(value).map_err(|e| {
            GranolaError::Network(format!("{} returned malformed segments: {}", TRANSCRIPT_ENDPOINT, e))
        }),
        other => Err(GranolaError::Network(format!(
            "{} returned unexpected JSON: {}",
            TRANSCRIPT_ENDPOINT,
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
