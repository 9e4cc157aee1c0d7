use std::collections::HashMap;

use serde::Deserialize;

use crate::error::UpstreamError;
use crate::state::Endpoints;

use super::{get_json, parse_url};

#[derive(Debug, Deserialize)]
struct PlayerInfoResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    playerinfo: HashMap<String, PlayerInfo>,
}

#[derive(Debug, Deserialize)]
struct PlayerInfo {
    #[serde(default)]
    value: Option<i64>,
}

/// The reputation aggregator's precomputed total for one user, if it has
/// indexed them. `None` means "not indexed", not a failure.
pub async fn fetch_aggregate_value(
    client: &reqwest::Client,
    endpoints: &Endpoints,
    user_id: u64,
) -> Result<Option<i64>, UpstreamError> {
    let url = parse_url(&format!(
        "{}/players/v1/playerinfo/{}",
        endpoints.aggregate, user_id
    ))?;
    let resp: PlayerInfoResponse = get_json(client, url).await?;
    if !resp.success {
        return Ok(None);
    }
    Ok(resp
        .playerinfo
        .get(&user_id.to_string())
        .and_then(|info| info.value))
}
