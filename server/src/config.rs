use std::time::Duration;

pub const ROBLOX_GROUPS_URL: &str = "https://groups.roblox.com";
pub const ROBLOX_INVENTORY_URL: &str = "https://inventory.roblox.com";
pub const ROBLOX_CATALOG_URL: &str = "https://catalog.roblox.com";
pub const ROBLOX_THUMBNAILS_URL: &str = "https://thumbnails.roblox.com";
pub const AGGREGATE_API_URL: &str = "https://api.rolimons.com";

/// The platform operator's own creator identity; items by anyone else are
/// player-traded and excluded from totals.
pub const FIRST_PARTY_CREATOR_ID: &str = "1";
pub const FIRST_PARTY_CREATOR_NAME: &str = "Roblox";

pub const DEFAULT_VALUE_THRESHOLD: i64 = 10_000;
pub const DEFAULT_ENRICH_GROUP_SIZE: usize = 12;
pub const DEFAULT_ENRICH_CALL_DELAY_MS: u64 = 0;
pub const DEFAULT_MEMBER_CAP: usize = 50;

/// Runaway-pagination bound per endpoint.
pub const MAX_PAGES_PER_ENDPOINT: usize = 10;
pub const PAGE_LIMIT: usize = 100;
pub const ASSET_BATCH_GET_LIMIT: usize = 50;
pub const ASSET_BATCH_POST_LIMIT: usize = 60;
pub const AVATAR_BATCH_LIMIT: usize = 100;

pub const SSE_KEEPALIVE_SECS: u64 = 15;
pub const DEFAULT_PROGRESS_BUFFER: usize = 256;
pub const DEFAULT_UPSTREAM_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS: u64 = 3;
pub const SERVER_PORT: u16 = 3000;

/// Prefer the aggregator's precomputed total over the inventory-derived
/// computation when it reports a positive value. On by default; disable to
/// force the full-fidelity inventory path.
pub fn aggregate_shortcut_enabled() -> bool {
    std::env::var("VALUE_AGGREGATE_SHORTCUT")
        .map(|value| {
            let normalized = value.trim().to_ascii_lowercase();
            matches!(normalized.as_str(), "1" | "true" | "yes" | "on")
        })
        .unwrap_or(true)
}

pub fn value_threshold() -> i64 {
    std::env::var("VALUE_THRESHOLD")
        .ok()
        .and_then(|value| value.parse::<i64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_VALUE_THRESHOLD)
}

pub fn enrich_group_size() -> usize {
    std::env::var("ENRICH_GROUP_SIZE")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_ENRICH_GROUP_SIZE)
}

pub fn enrich_call_delay() -> Duration {
    std::env::var("ENRICH_CALL_DELAY_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or_else(|| Duration::from_millis(DEFAULT_ENRICH_CALL_DELAY_MS))
}

pub fn member_cap() -> usize {
    std::env::var("MEMBER_CAP")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_MEMBER_CAP)
}

pub fn progress_buffer() -> usize {
    std::env::var("PROGRESS_BROADCAST_BUFFER")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_PROGRESS_BUFFER)
}

pub fn upstream_http_timeout() -> Duration {
    std::env::var("UPSTREAM_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_UPSTREAM_HTTP_TIMEOUT_SECS))
}

pub fn upstream_connect_timeout() -> Duration {
    std::env::var("UPSTREAM_CONNECT_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS))
}
