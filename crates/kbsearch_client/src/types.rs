//! Wire shapes of the search backend and the gateway error type.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SearchBody<'a> {
    pub query: &'a str,
    pub top_k: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<std::collections::BTreeMap<&'static str, &'a str>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SearchResponse {
    pub response: String,
    #[serde(default)]
    pub results: Vec<WireResult>,
    #[serde(default)]
    pub response_time_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WireResult {
    pub id: String,
    pub document_id: u64,
    pub filename: String,
    pub application: Option<String>,
    pub issue: Option<String>,
    pub ingredient: Option<String>,
    pub customer: Option<String>,
    pub trial_id: Option<String>,
    pub sheet_name: Option<String>,
    #[serde(default)]
    pub content_preview: String,
    #[serde(default)]
    pub score: f64,
    pub reranker_score: Option<f64>,
    pub blob_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WireHistoryItem {
    pub id: u64,
    pub query: String,
    #[serde(default)]
    pub results_count: u32,
    pub top_result_score: Option<f64>,
    pub response_time_ms: Option<u64>,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WireFacets {
    #[serde(default)]
    pub applications: Vec<String>,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DownloadUrlResponse {
    pub download_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct GatewayError {
    pub kind: FailureKind,
    pub message: String,
    /// `detail` field of the backend's error body, when it sent one.
    pub detail: Option<String>,
}

impl GatewayError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: Option<String>) -> Self {
        self.detail = detail;
        self
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == FailureKind::Unauthorized
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    Unauthorized,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64 },
    Decode,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Unauthorized => write!(f, "unauthorized"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes } => {
                write!(f, "response larger than {max_bytes} bytes")
            }
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
