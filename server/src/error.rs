use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Failure talking to an upstream endpoint. Never retried here; callers
/// either propagate (roster building) or swallow to a zero-value result
/// (per-member enrichment).
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream returned status {status} for {url}")]
    Http { status: u16, url: String },

    #[error("pagination cursor repeated for {url}")]
    PaginationLoop { url: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid upstream url {url}: {reason}")]
    BadUrl { url: String, reason: String },
}

/// Search-level failures surfaced to the caller as one JSON error body.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("no community id found in input")]
    InvalidIdentifier,

    #[error("community {0} does not exist")]
    CommunityNotFound(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl SearchError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidIdentifier => StatusCode::UNPROCESSABLE_ENTITY,
            Self::CommunityNotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
