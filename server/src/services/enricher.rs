use std::future::Future;
use std::time::Duration;

use futures::future::join_all;
use midas_shared::{EnrichedMember, Member};

use crate::config;
use crate::services::wealth::{self, CreatorCache};
use crate::state::AppState;

/// Shape of a grouped fan-out: at most `group_size` calls in flight, with an
/// optional stagger between call starts within a group.
#[derive(Debug, Clone, Copy)]
pub struct GroupConfig {
    pub group_size: usize,
    pub inter_call_delay: Duration,
}

impl GroupConfig {
    pub fn from_env() -> Self {
        Self {
            group_size: config::enrich_group_size(),
            inter_call_delay: config::enrich_call_delay(),
        }
    }
}

/// Apply `f` to every item in fixed-size groups: calls within a group run
/// concurrently, and the next group starts only once the previous group has
/// fully finished, capping simultaneous upstream requests at `group_size`.
/// Output order always matches input order, not completion order.
pub async fn map_grouped<T, U, F, Fut>(items: Vec<T>, cfg: GroupConfig, f: F) -> Vec<U>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = U>,
{
    let group_size = cfg.group_size.max(1);
    let mut out = Vec::with_capacity(items.len());
    let mut remaining = items.into_iter();

    loop {
        let group: Vec<T> = remaining.by_ref().take(group_size).collect();
        if group.is_empty() {
            break;
        }
        let calls = group.into_iter().enumerate().map(|(offset, item)| {
            let delay = cfg.inter_call_delay * offset as u32;
            let call = f(item);
            async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                call.await
            }
        });
        out.extend(join_all(calls).await);
    }

    out
}

/// Estimate wealth for every member of the (already capped) roster under the
/// group-concurrency bound. Per-member failures surface as zero-value rows
/// and never affect siblings.
pub async fn enrich_roster(
    state: &AppState,
    members: Vec<Member>,
    cfg: GroupConfig,
    value_threshold: i64,
) -> Vec<EnrichedMember> {
    let cache = CreatorCache::new();
    let cache = &cache;
    map_grouped(members, cfg, |member| async move {
        let breakdown =
            wealth::estimate_member_wealth(state, cache, member.user_id, value_threshold).await;
        state.observability.record_member_enriched();
        EnrichedMember::new(member, breakdown)
    })
    .await
}
