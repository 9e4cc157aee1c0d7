use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::UpstreamError;

use super::get_json;

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Page<T> {
    #[serde(default)]
    data: Vec<T>,
    #[serde(rename = "nextPageCursor")]
    next_page_cursor: Option<String>,
}

/// Follow an opaque-cursor paged endpoint to completion, accumulating every
/// page's `data` array in order.
///
/// The `cursor` query parameter is appended only once a cursor is in hand.
/// Iteration stops when the response carries no next cursor, errors with
/// [`UpstreamError::PaginationLoop`] if the upstream hands back the cursor it
/// was just given, and stops early (keeping what was accumulated) once
/// `max_pages` pages have been fetched.
pub async fn fetch_all_pages<T: DeserializeOwned>(
    client: &reqwest::Client,
    base: reqwest::Url,
    max_pages: usize,
) -> Result<Vec<T>, UpstreamError> {
    let mut items = Vec::new();
    let mut cursor = String::new();
    let mut pages = 0usize;

    loop {
        let mut url = base.clone();
        if !cursor.is_empty() {
            url.query_pairs_mut().append_pair("cursor", &cursor);
        }

        let page: Page<T> = get_json(client, url).await?;
        items.extend(page.data);
        pages += 1;

        let next = page.next_page_cursor.unwrap_or_default();
        if next.is_empty() {
            break;
        }
        if next == cursor {
            return Err(UpstreamError::PaginationLoop {
                url: base.to_string(),
            });
        }
        if pages >= max_pages {
            warn!(url = %base, pages, "page cap reached, stopping pagination early");
            break;
        }
        cursor = next;
    }

    Ok(items)
}
