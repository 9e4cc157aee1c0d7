use std::collections::HashMap;

use midas_shared::{CreatorInfo, CreatorType};
use serde::{Deserialize, Serialize};

use crate::error::UpstreamError;
use crate::state::Endpoints;

use super::{get_json, parse_url, post_json};

// The two catalog tiers disagree on creator field names; aliases fold every
// observed spelling into one raw shape.
#[derive(Debug, Default, Deserialize)]
struct RawCreator {
    #[serde(default, alias = "creatorTargetId", alias = "Id")]
    id: Option<u64>,
    #[serde(default, alias = "Name")]
    name: Option<String>,
    #[serde(default, rename = "type", alias = "creatorType", alias = "Type")]
    kind: Option<String>,
}

impl From<RawCreator> for CreatorInfo {
    fn from(raw: RawCreator) -> Self {
        Self {
            creator_id: raw.id.map(|id| id.to_string()).unwrap_or_default(),
            creator_name: raw.name.unwrap_or_default(),
            creator_type: raw
                .kind
                .as_deref()
                .map(CreatorType::parse)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawCatalogAsset {
    #[serde(default, alias = "assetId")]
    id: Option<u64>,
    #[serde(default, alias = "Creator", alias = "itemCreator")]
    creator: Option<RawCreator>,
}

// Both tiers answer either a bare array or a `{data: [...]}` wrapper.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogResponse {
    Wrapped {
        #[serde(default)]
        data: Vec<RawCatalogAsset>,
    },
    Bare(Vec<RawCatalogAsset>),
}

impl CatalogResponse {
    fn into_assets(self) -> Vec<RawCatalogAsset> {
        match self {
            Self::Wrapped { data } => data,
            Self::Bare(assets) => assets,
        }
    }
}

fn collect_creators(assets: Vec<RawCatalogAsset>) -> HashMap<String, CreatorInfo> {
    let mut creators = HashMap::new();
    for asset in assets {
        let Some(id) = asset.id else { continue };
        let creator = asset.creator.unwrap_or_default();
        creators.insert(id.to_string(), CreatorInfo::from(creator));
    }
    creators
}

/// Primary tier: one batched GET lookup. Callers chunk ids to
/// [`crate::config::ASSET_BATCH_GET_LIMIT`].
pub async fn fetch_creators_get(
    client: &reqwest::Client,
    endpoints: &Endpoints,
    asset_ids: &[String],
) -> Result<HashMap<String, CreatorInfo>, UpstreamError> {
    let mut url = parse_url(&format!("{}/v1/assets", endpoints.catalog))?;
    url.query_pairs_mut()
        .append_pair("assetIds", &asset_ids.join(","));
    let resp: CatalogResponse = get_json(client, url).await?;
    Ok(collect_creators(resp.into_assets()))
}

#[derive(Debug, Serialize)]
struct DetailsRequest<'a> {
    items: Vec<DetailsRequestItem<'a>>,
}

#[derive(Debug, Serialize)]
struct DetailsRequestItem<'a> {
    #[serde(rename = "itemType")]
    item_type: &'a str,
    id: u64,
}

/// Secondary tier: one batched POST details lookup with a different payload
/// shape. Callers chunk ids to [`crate::config::ASSET_BATCH_POST_LIMIT`].
pub async fn fetch_creators_post(
    client: &reqwest::Client,
    endpoints: &Endpoints,
    asset_ids: &[String],
) -> Result<HashMap<String, CreatorInfo>, UpstreamError> {
    let url = parse_url(&format!("{}/v1/catalog/items/details", endpoints.catalog))?;
    let items = asset_ids
        .iter()
        .filter_map(|id| id.parse::<u64>().ok())
        .map(|id| DetailsRequestItem {
            item_type: "Asset",
            id,
        })
        .collect();
    let resp: CatalogResponse = post_json(client, url, &DetailsRequest { items }).await?;
    Ok(collect_creators(resp.into_assets()))
}
