use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::member::EnrichedMember;

/// The completed outcome of one search run.
///
/// `members` is sorted descending by `total_value` (stable; ties keep
/// enumeration order) and may be shorter than `member_count` when the
/// enrichment cap truncated the roster: the cap excludes members from the
/// ranking, not from the roster count shown to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub community_id: String,
    pub input: String,
    /// Monotonic run token; newer runs carry larger values.
    pub seq: u64,
    pub member_count: usize,
    pub members: Vec<EnrichedMember>,
    pub searched_at: DateTime<Utc>,
}

/// Stable descending sort by total value; ties keep their current order.
pub fn rank_by_value(members: &mut [EnrichedMember]) {
    members.sort_by(|a, b| b.total_value.cmp(&a.total_value));
}

/// Compact value rendering for list views: 1.5K, 2.3M, plain below 1000.
pub fn format_value(value: i64) -> String {
    if value >= 1_000_000 {
        format!("{:.1}M", value as f64 / 1_000_000.0)
    } else if value >= 1_000 {
        format!("{:.1}K", value as f64 / 1_000.0)
    } else {
        value.to_string()
    }
}
