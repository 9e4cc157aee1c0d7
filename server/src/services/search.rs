use std::sync::Arc;
use std::sync::atomic::Ordering;

use bytes::Bytes;
use chrono::Utc;
use midas_shared::{SearchResult, extract_community_id, rank_by_value};
use serde::Serialize;
use tracing::{info, warn};

use crate::config;
use crate::error::SearchError;
use crate::roblox::{groups, thumbnails};
use crate::services::enricher::{self, GroupConfig};
use crate::services::roster;
use crate::state::{AppState, SearchEvent, StoredSearch};

/// Run one search end to end. `refresh` bypasses the last-search cache and
/// forces full recomputation.
pub async fn run_search(
    state: &AppState,
    raw_input: &str,
    refresh: bool,
) -> Result<StoredSearch, SearchError> {
    state.observability.record_search();

    let Some(community_id) = extract_community_id(raw_input) else {
        state.observability.record_search_failure();
        return Err(SearchError::InvalidIdentifier);
    };

    if !refresh {
        let cached = { state.last_search.read().await.clone() };
        if let Some(stored) = cached
            && stored.community_id == community_id
            && stored.input == raw_input
        {
            state.observability.record_cached_result_hit();
            return Ok(stored);
        }
    }

    let seq = state.next_seq.fetch_add(1, Ordering::Relaxed) + 1;
    match execute_run(state, &community_id, raw_input, seq).await {
        Ok(stored) => Ok(stored),
        Err(e) => {
            state.observability.record_search_failure();
            Err(e)
        }
    }
}

async fn execute_run(
    state: &AppState,
    community_id: &str,
    raw_input: &str,
    seq: u64,
) -> Result<StoredSearch, SearchError> {
    emit_progress(state, seq, "validating", None, None);
    let exists =
        groups::community_exists(&state.http_client, &state.endpoints, community_id).await?;
    if !exists {
        return Err(SearchError::CommunityNotFound(community_id.to_string()));
    }

    emit_progress(state, seq, "enumerating", None, None);
    let full_roster =
        roster::enumerate_members(&state.http_client, &state.endpoints, community_id).await?;
    let member_count = full_roster.len();
    state
        .observability
        .record_members_enumerated(member_count as u64);

    let cap = config::member_cap();
    let mut to_enrich = full_roster;
    if to_enrich.len() > cap {
        info!(
            member_count,
            cap, "roster exceeds enrichment cap, ranking the first members only"
        );
        to_enrich.truncate(cap);
    }

    emit_progress(state, seq, "enriching", Some(to_enrich.len()), Some(member_count));
    let mut enriched = enricher::enrich_roster(
        state,
        to_enrich,
        GroupConfig::from_env(),
        config::value_threshold(),
    )
    .await;

    rank_by_value(&mut enriched);

    emit_progress(
        state,
        seq,
        "resolving-avatars",
        Some(enriched.len()),
        Some(member_count),
    );
    let user_ids: Vec<u64> = enriched.iter().map(|member| member.user_id).collect();
    match thumbnails::fetch_avatar_thumbs(&state.http_client, &state.endpoints, &user_ids).await {
        Ok(thumbs) => {
            for member in &mut enriched {
                member.avatar_url = thumbs.get(&member.user_id).cloned();
            }
        }
        Err(e) => warn!(error = %e, "avatar lookup failed, serving results without avatars"),
    }

    let result = Arc::new(SearchResult {
        community_id: community_id.to_string(),
        input: raw_input.to_string(),
        seq,
        member_count,
        members: enriched,
        searched_at: Utc::now(),
    });
    let stored = StoredSearch::new(community_id.to_string(), raw_input.to_string(), result);

    publish(state, stored.clone()).await;
    Ok(stored)
}

/// Last-writer-wins on the shared last-search slot: once a newer run has been
/// triggered or has published, a stale run's result is discarded instead of
/// clobbering it. The stale run's caller still receives its own result.
pub(crate) async fn publish(state: &AppState, stored: StoredSearch) {
    let seq = stored.seq();
    let json = Arc::clone(&stored.json);

    let superseded = state.next_seq.load(Ordering::Relaxed) > seq;
    {
        let mut slot = state.last_search.write().await;
        if superseded || slot.as_ref().is_some_and(|current| current.seq() > seq) {
            state.observability.record_stale_run_discarded();
            info!(seq, "discarding stale search result, newer run triggered");
            return;
        }
        *slot = Some(stored);
    }
    let _ = state.event_tx.send(SearchEvent::Completed { seq, json });
}

#[derive(Serialize)]
struct ProgressPayload<'a> {
    seq: u64,
    phase: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    enriching: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    member_count: Option<usize>,
}

fn emit_progress(
    state: &AppState,
    seq: u64,
    phase: &str,
    enriching: Option<usize>,
    member_count: Option<usize>,
) {
    let payload = ProgressPayload {
        seq,
        phase,
        enriching,
        member_count,
    };
    match serde_json::to_vec(&payload) {
        Ok(json) => {
            let _ = state.event_tx.send(SearchEvent::Progress {
                seq,
                json: Arc::new(Bytes::from(json)),
            });
        }
        Err(e) => warn!(seq, phase, error = %e, "failed to serialize progress event"),
    }
}
