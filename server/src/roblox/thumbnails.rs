use std::collections::HashMap;

use serde::Deserialize;

use crate::config::AVATAR_BATCH_LIMIT;
use crate::error::UpstreamError;
use crate::state::Endpoints;

use super::{get_json, parse_url};

#[derive(Debug, Deserialize)]
struct ThumbnailResponse {
    #[serde(default)]
    data: Vec<RawThumbnail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawThumbnail {
    target_id: u64,
    #[serde(default)]
    image_url: Option<String>,
}

/// Avatar headshot URLs for `user_ids`, batched under the endpoint's id cap.
/// Users the upstream has no image for are simply absent from the map.
pub async fn fetch_avatar_thumbs(
    client: &reqwest::Client,
    endpoints: &Endpoints,
    user_ids: &[u64],
) -> Result<HashMap<u64, String>, UpstreamError> {
    let mut thumbs = HashMap::new();
    for chunk in user_ids.chunks(AVATAR_BATCH_LIMIT) {
        let ids = chunk
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let mut url = parse_url(&format!(
            "{}/v1/users/avatar-headshot",
            endpoints.thumbnails
        ))?;
        url.query_pairs_mut()
            .append_pair("userIds", &ids)
            .append_pair("size", "48x48")
            .append_pair("format", "Png")
            .append_pair("isCircular", "true");
        let resp: ThumbnailResponse = get_json(client, url).await?;
        for thumb in resp.data {
            if let Some(image_url) = thumb.image_url {
                thumbs.insert(thumb.target_id, image_url);
            }
        }
    }
    Ok(thumbs)
}
