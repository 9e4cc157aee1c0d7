use std::collections::{HashMap, HashSet};

use dashmap::DashMap;
use midas_shared::{CollectibleItem, CreatorInfo, ValueSource, WealthBreakdown};
use tokio::sync::Mutex;
use tracing::warn;

use crate::config::{
    self, ASSET_BATCH_GET_LIMIT, ASSET_BATCH_POST_LIMIT, FIRST_PARTY_CREATOR_ID,
    FIRST_PARTY_CREATOR_NAME,
};
use crate::error::UpstreamError;
use crate::roblox::{aggregate, catalog, inventory};
use crate::state::AppState;

/// Creator metadata cache scoped to one enrichment run. Reads of populated
/// entries are lock-free; population is serialized behind `resolve_gate` so
/// concurrent member tasks never issue duplicate batch lookups for the same
/// asset ids.
pub struct CreatorCache {
    entries: DashMap<String, CreatorInfo>,
    resolve_gate: Mutex<()>,
}

impl CreatorCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            resolve_gate: Mutex::new(()),
        }
    }

    /// Resolve creators for `asset_ids`. Misses go through the two-tier
    /// batched lookup: the primary GET endpoint, then the POST details
    /// endpoint for ids still unresolved. A failed batch leaves its ids
    /// unresolved (and those assets excluded from totals) instead of failing
    /// the member.
    pub async fn resolve(
        &self,
        state: &AppState,
        asset_ids: &[String],
    ) -> HashMap<String, CreatorInfo> {
        if asset_ids.iter().any(|id| !self.entries.contains_key(id)) {
            let _gate = self.resolve_gate.lock().await;
            // Re-check under the gate: another member task may have resolved
            // these ids while we waited.
            let misses: Vec<String> = asset_ids
                .iter()
                .filter(|id| !self.entries.contains_key(*id))
                .cloned()
                .collect();

            for chunk in misses.chunks(ASSET_BATCH_GET_LIMIT) {
                state.observability.record_creator_batch();
                match catalog::fetch_creators_get(&state.http_client, &state.endpoints, chunk)
                    .await
                {
                    Ok(resolved) => {
                        for (id, info) in resolved {
                            self.entries.insert(id, info);
                        }
                    }
                    Err(e) => {
                        state.observability.record_creator_batch_failure();
                        warn!(
                            error = %e,
                            batch = chunk.len(),
                            "asset batch lookup failed, deferring to details endpoint"
                        );
                    }
                }
            }

            let unresolved: Vec<String> = misses
                .into_iter()
                .filter(|id| !self.entries.contains_key(id))
                .collect();
            for chunk in unresolved.chunks(ASSET_BATCH_POST_LIMIT) {
                state.observability.record_creator_batch();
                match catalog::fetch_creators_post(&state.http_client, &state.endpoints, chunk)
                    .await
                {
                    Ok(resolved) => {
                        for (id, info) in resolved {
                            self.entries.insert(id, info);
                        }
                    }
                    Err(e) => {
                        state.observability.record_creator_batch_failure();
                        warn!(
                            error = %e,
                            batch = chunk.len(),
                            "asset details lookup failed, leaving assets unresolved"
                        );
                    }
                }
            }
        }

        asset_ids
            .iter()
            .filter_map(|id| {
                self.entries
                    .get(id)
                    .map(|entry| (id.clone(), entry.value().clone()))
            })
            .collect()
    }
}

impl Default for CreatorCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Estimate one member's wealth. Never fails past this boundary: any upstream
/// error collapses to a zero-value breakdown, so one member can't sink the
/// batch it runs in.
pub async fn estimate_member_wealth(
    state: &AppState,
    creators: &CreatorCache,
    user_id: u64,
    value_threshold: i64,
) -> WealthBreakdown {
    match try_estimate(state, creators, user_id, value_threshold).await {
        Ok(breakdown) => breakdown,
        Err(e) => {
            state.observability.record_enrich_zeroed();
            warn!(user_id, error = %e, "wealth estimate failed, scoring member as zero");
            WealthBreakdown::zero()
        }
    }
}

async fn try_estimate(
    state: &AppState,
    creators: &CreatorCache,
    user_id: u64,
    value_threshold: i64,
) -> Result<WealthBreakdown, UpstreamError> {
    // A positive precomputed total short-circuits the inventory walk; zero,
    // unindexed, or a failed aggregator all fall through to full computation.
    if config::aggregate_shortcut_enabled() {
        match aggregate::fetch_aggregate_value(&state.http_client, &state.endpoints, user_id).await
        {
            Ok(Some(total)) if total > 0 => return Ok(WealthBreakdown::from_aggregate(total)),
            Ok(_) => {}
            Err(e) => {
                warn!(user_id, error = %e, "aggregate lookup failed, computing from inventory");
            }
        }
    }

    let items =
        inventory::fetch_collectibles(&state.http_client, &state.endpoints, user_id).await?;
    let candidates: Vec<CollectibleItem> = items
        .into_iter()
        .filter(|item| item.recent_value >= value_threshold)
        .collect();
    if candidates.is_empty() {
        return Ok(WealthBreakdown::zero());
    }

    let mut distinct = Vec::new();
    let mut seen = HashSet::new();
    for item in &candidates {
        if seen.insert(item.asset_id.as_str()) {
            distinct.push(item.asset_id.clone());
        }
    }
    let resolved = creators.resolve(state, &distinct).await;

    let mut total_value = 0;
    let mut qualifying_items = Vec::new();
    for item in candidates {
        let Some(creator) = resolved.get(&item.asset_id) else {
            continue;
        };
        if creator.is_first_party(FIRST_PARTY_CREATOR_ID, FIRST_PARTY_CREATOR_NAME) {
            total_value += item.recent_value;
            qualifying_items.push(item);
        }
    }

    Ok(WealthBreakdown {
        total_value,
        qualifying_item_count: qualifying_items.len(),
        qualifying_items,
        source: ValueSource::Inventory,
    })
}
