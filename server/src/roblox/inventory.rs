use midas_shared::CollectibleItem;
use serde::Deserialize;

use crate::config::{MAX_PAGES_PER_ENDPOINT, PAGE_LIMIT};
use crate::error::UpstreamError;
use crate::state::Endpoints;

use super::paging::fetch_all_pages;
use super::parse_url;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCollectible {
    asset_id: u64,
    #[serde(default, alias = "assetName")]
    name: Option<String>,
    // Two spellings observed across API revisions.
    #[serde(default, alias = "recentAverageSalePrice")]
    recent_average_price: Option<i64>,
}

impl From<RawCollectible> for CollectibleItem {
    fn from(raw: RawCollectible) -> Self {
        let asset_id = raw.asset_id.to_string();
        let name = raw
            .name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("Asset {asset_id}"));
        Self {
            asset_id,
            name,
            recent_value: raw.recent_average_price.unwrap_or(0),
        }
    }
}

/// Every collectible the user owns, across all pages of the listing.
pub async fn fetch_collectibles(
    client: &reqwest::Client,
    endpoints: &Endpoints,
    user_id: u64,
) -> Result<Vec<CollectibleItem>, UpstreamError> {
    let mut url = parse_url(&format!(
        "{}/v1/users/{}/assets/collectibles",
        endpoints.inventory, user_id
    ))?;
    url.query_pairs_mut()
        .append_pair("limit", &PAGE_LIMIT.to_string());
    let raw = fetch_all_pages::<RawCollectible>(client, url, MAX_PAGES_PER_ENDPOINT).await?;
    Ok(raw.into_iter().map(CollectibleItem::from).collect())
}
