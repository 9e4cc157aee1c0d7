pub mod aggregate;
pub mod catalog;
pub mod groups;
pub mod inventory;
pub mod paging;
pub mod thumbnails;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::UpstreamError;

pub(crate) fn parse_url(raw: &str) -> Result<reqwest::Url, UpstreamError> {
    reqwest::Url::parse(raw).map_err(|e| UpstreamError::BadUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: reqwest::Url,
) -> Result<T, UpstreamError> {
    let url_str = url.to_string();
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|source| UpstreamError::Transport {
            url: url_str.clone(),
            source,
        })?;
    let status = resp.status();
    if !status.is_success() {
        return Err(UpstreamError::Http {
            status: status.as_u16(),
            url: url_str,
        });
    }
    resp.json::<T>()
        .await
        .map_err(|source| UpstreamError::Decode {
            url: url_str,
            source,
        })
}

pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
    client: &reqwest::Client,
    url: reqwest::Url,
    body: &B,
) -> Result<T, UpstreamError> {
    let url_str = url.to_string();
    let resp = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|source| UpstreamError::Transport {
            url: url_str.clone(),
            source,
        })?;
    let status = resp.status();
    if !status.is_success() {
        return Err(UpstreamError::Http {
            status: status.as_u16(),
            url: url_str,
        });
    }
    resp.json::<T>()
        .await
        .map_err(|source| UpstreamError::Decode {
            url: url_str,
            source,
        })
}
