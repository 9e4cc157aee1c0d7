use std::fmt::Write as _;

use axum::Json;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::Deserialize;

use crate::error::SearchError;
use crate::services::search::run_search;
use crate::state::{AppState, ObservabilitySnapshot};

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    input: String,
    #[serde(default)]
    refresh: Option<String>,
}

fn parse_flag(value: Option<&str>) -> bool {
    value
        .map(|raw| {
            matches!(
                raw.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
        .unwrap_or(false)
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, SearchError> {
    let input = query.input.trim();
    if input.is_empty() {
        return Err(SearchError::InvalidIdentifier);
    }
    let refresh = parse_flag(query.refresh.as_deref());
    let stored = run_search(&state, input, refresh).await?;
    Ok(json_bytes_response((*stored.json).clone(), "no-store", None))
}

/// Serve the pre-serialized last result, no re-serialization per request.
pub async fn last_search(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let stored = { state.last_search.read().await.clone() };
    let Some(stored) = stored else {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "no completed search yet"})),
        )
            .into_response();
    };

    let etag = search_etag(stored.seq());
    if if_none_match_matches(&headers, &etag) {
        return not_modified_response("no-cache", Some(etag.as_str()));
    }
    json_bytes_response((*stored.json).clone(), "no-cache", Some(etag.as_str()))
}

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let last_search_seq = state.last_search.read().await.as_ref().map(|s| s.seq());
    let observability = state.observability.snapshot();
    Json(serde_json::json!({
        "status": "ok",
        "last_search_seq": last_search_seq,
        "observability": {
            "searches_total": observability.searches_total,
            "search_failures_total": observability.search_failures_total,
            "cached_result_hits_total": observability.cached_result_hits_total,
            "stale_runs_discarded_total": observability.stale_runs_discarded_total,
            "members_enumerated_total": observability.members_enumerated_total,
            "members_enriched_total": observability.members_enriched_total,
            "enrich_zeroed_total": observability.enrich_zeroed_total,
            "creator_batches_total": observability.creator_batches_total,
            "creator_batch_failures_total": observability.creator_batch_failures_total,
        }
    }))
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let last_search_available = state.last_search.read().await.is_some();
    let observability = state.observability.snapshot();
    let body = render_prometheus_metrics(last_search_available, observability);

    (
        [
            (header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-store"),
        ],
        body,
    )
}

fn render_prometheus_metrics(
    last_search_available: bool,
    observability: ObservabilitySnapshot,
) -> String {
    let mut body = String::new();
    let _ = writeln!(
        body,
        "# HELP midas_last_search_available Whether a completed search is cached (1 or 0)."
    );
    let _ = writeln!(body, "# TYPE midas_last_search_available gauge");
    let _ = writeln!(
        body,
        "midas_last_search_available {}",
        u8::from(last_search_available)
    );

    let counters = [
        (
            "midas_searches_total",
            "Total search runs requested.",
            observability.searches_total,
        ),
        (
            "midas_search_failures_total",
            "Total search runs that surfaced an error.",
            observability.search_failures_total,
        ),
        (
            "midas_cached_result_hits_total",
            "Total searches answered from the last-search cache.",
            observability.cached_result_hits_total,
        ),
        (
            "midas_stale_runs_discarded_total",
            "Total completed runs discarded because a newer run superseded them.",
            observability.stale_runs_discarded_total,
        ),
        (
            "midas_members_enumerated_total",
            "Total members enumerated across all searches.",
            observability.members_enumerated_total,
        ),
        (
            "midas_members_enriched_total",
            "Total members run through the wealth estimator.",
            observability.members_enriched_total,
        ),
        (
            "midas_enrich_zeroed_total",
            "Total members scored zero because their estimate failed.",
            observability.enrich_zeroed_total,
        ),
        (
            "midas_creator_batches_total",
            "Total creator batch lookups issued.",
            observability.creator_batches_total,
        ),
        (
            "midas_creator_batch_failures_total",
            "Total creator batch lookups that failed and were swallowed.",
            observability.creator_batch_failures_total,
        ),
    ];
    for (name, help, value) in counters {
        let _ = writeln!(body, "# HELP {name} {help}");
        let _ = writeln!(body, "# TYPE {name} counter");
        let _ = writeln!(body, "{name} {value}");
    }

    body
}

fn search_etag(seq: u64) -> String {
    format!("\"search-{seq}\"")
}

fn json_bytes_response(body: Bytes, cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = Response::new(Body::from(body));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn not_modified_response(cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = StatusCode::NOT_MODIFIED.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn normalize_etag(candidate: &str) -> &str {
    candidate.strip_prefix("W/").unwrap_or(candidate).trim()
}

fn if_none_match_matches(headers: &HeaderMap, etag: &str) -> bool {
    let Some(value) = headers.get(header::IF_NONE_MATCH) else {
        return false;
    };
    let Ok(raw) = value.to_str() else {
        return false;
    };

    raw.split(',').any(|candidate| {
        let candidate = candidate.trim();
        candidate == "*" || normalize_etag(candidate) == normalize_etag(etag)
    })
}
