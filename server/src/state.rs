use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use midas_shared::SearchResult;
use tokio::sync::{RwLock, broadcast};
use tracing::warn;

use crate::config::{
    self, progress_buffer, upstream_connect_timeout, upstream_http_timeout,
};

/// Base URLs of the upstream APIs. Production values come from `config`;
/// tests point every base at a local mock server.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub groups: String,
    pub inventory: String,
    pub catalog: String,
    pub thumbnails: String,
    pub aggregate: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            groups: config::ROBLOX_GROUPS_URL.to_string(),
            inventory: config::ROBLOX_INVENTORY_URL.to_string(),
            catalog: config::ROBLOX_CATALOG_URL.to_string(),
            thumbnails: config::ROBLOX_THUMBNAILS_URL.to_string(),
            aggregate: config::AGGREGATE_API_URL.to_string(),
        }
    }
}

/// Pre-serialized search event: serialized once per run, shared by all SSE
/// subscribers via Arc.
#[derive(Debug, Clone)]
pub enum SearchEvent {
    Progress { seq: u64, json: Arc<Bytes> },
    Completed { seq: u64, json: Arc<Bytes> },
}

/// Last completed search, kept both typed (repeat-search reuse) and
/// pre-serialized (the `last` endpoint and SSE replay).
#[derive(Debug, Clone)]
pub struct StoredSearch {
    pub community_id: String,
    pub input: String,
    pub result: Arc<SearchResult>,
    pub json: Arc<Bytes>,
}

impl StoredSearch {
    pub fn new(community_id: String, input: String, result: Arc<SearchResult>) -> Self {
        let json = serde_json::to_vec(result.as_ref())
            .map(Bytes::from)
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to pre-serialize search result");
                Bytes::from_static(b"{}")
            });
        Self {
            community_id,
            input,
            result,
            json: Arc::new(json),
        }
    }

    pub fn seq(&self) -> u64 {
        self.result.seq
    }
}

#[derive(Clone)]
pub struct AppState {
    pub http_client: reqwest::Client,
    pub endpoints: Arc<Endpoints>,
    /// Run-token source; each search run takes the next value.
    pub next_seq: Arc<AtomicU64>,
    pub last_search: Arc<RwLock<Option<StoredSearch>>>,
    pub event_tx: broadcast::Sender<SearchEvent>,
    pub observability: Arc<ObservabilityCounters>,
}

#[derive(Debug, Default)]
pub struct ObservabilityCounters {
    searches_total: AtomicU64,
    search_failures_total: AtomicU64,
    cached_result_hits_total: AtomicU64,
    stale_runs_discarded_total: AtomicU64,
    members_enumerated_total: AtomicU64,
    members_enriched_total: AtomicU64,
    enrich_zeroed_total: AtomicU64,
    creator_batches_total: AtomicU64,
    creator_batch_failures_total: AtomicU64,
}

#[derive(Debug, Clone, Copy)]
pub struct ObservabilitySnapshot {
    pub searches_total: u64,
    pub search_failures_total: u64,
    pub cached_result_hits_total: u64,
    pub stale_runs_discarded_total: u64,
    pub members_enumerated_total: u64,
    pub members_enriched_total: u64,
    pub enrich_zeroed_total: u64,
    pub creator_batches_total: u64,
    pub creator_batch_failures_total: u64,
}

impl ObservabilityCounters {
    pub fn snapshot(&self) -> ObservabilitySnapshot {
        ObservabilitySnapshot {
            searches_total: self.searches_total.load(Ordering::Relaxed),
            search_failures_total: self.search_failures_total.load(Ordering::Relaxed),
            cached_result_hits_total: self.cached_result_hits_total.load(Ordering::Relaxed),
            stale_runs_discarded_total: self.stale_runs_discarded_total.load(Ordering::Relaxed),
            members_enumerated_total: self.members_enumerated_total.load(Ordering::Relaxed),
            members_enriched_total: self.members_enriched_total.load(Ordering::Relaxed),
            enrich_zeroed_total: self.enrich_zeroed_total.load(Ordering::Relaxed),
            creator_batches_total: self.creator_batches_total.load(Ordering::Relaxed),
            creator_batch_failures_total: self
                .creator_batch_failures_total
                .load(Ordering::Relaxed),
        }
    }

    pub fn record_search(&self) {
        self.searches_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_search_failure(&self) {
        self.search_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cached_result_hit(&self) {
        self.cached_result_hits_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale_run_discarded(&self) {
        self.stale_runs_discarded_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_members_enumerated(&self, count: u64) {
        self.members_enumerated_total
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_member_enriched(&self) {
        self.members_enriched_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_enrich_zeroed(&self) {
        self.enrich_zeroed_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_creator_batch(&self) {
        self.creator_batches_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_creator_batch_failure(&self) {
        self.creator_batch_failures_total
            .fetch_add(1, Ordering::Relaxed);
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_endpoints(Endpoints::default())
    }

    pub fn with_endpoints(endpoints: Endpoints) -> Self {
        let (event_tx, _) = broadcast::channel(progress_buffer());
        let request_timeout = upstream_http_timeout();
        let connect_timeout = upstream_connect_timeout();
        let http_client = reqwest::Client::builder()
            .user_agent("midas/0.1")
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .or_else(|e| {
                warn!(
                    error = %e,
                    "failed to build configured HTTP client, retrying without custom user-agent"
                );
                reqwest::Client::builder()
                    .timeout(request_timeout)
                    .connect_timeout(connect_timeout)
                    .build()
            })
            .unwrap_or_else(|e| {
                panic!("failed to build timeout-configured HTTP client: {e}");
            });
        Self {
            http_client,
            endpoints: Arc::new(endpoints),
            next_seq: Arc::new(AtomicU64::new(0)),
            last_search: Arc::new(RwLock::new(None)),
            event_tx,
            observability: Arc::new(ObservabilityCounters::default()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
