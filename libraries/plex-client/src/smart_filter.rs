//! Smart-collection filters.
//!
//! Plex has no structured filter object. A smart collection's filter lives in
//! the query string of a section listing URI such as
//! `/library/sections/1/all?type=1&genre=action`, and that URI is echoed back
//! in the collection's free-text `content` field. The client treats the query
//! as opaque and only guarantees that it is prefixed with exactly one `?`.

use crate::client::decode;
use crate::collections::Collections;
use crate::error::{PlexClientError, Result};
use crate::types::{Collection, MediaContainer, MediaContainerResponse, MediaItem};
use reqwest::Method;
use tracing::debug;
use url::Url;

/// Prefix `query` with exactly one `?`.
pub fn normalize_filter_query(query: &str) -> String {
    format!("?{}", query.trim_start_matches('?'))
}

/// Full listing URI for a filter: `{base}/library/sections/{id}/all?{query}`.
pub fn build_filter_uri(base_url: &str, section_id: u32, query: &str) -> String {
    format!(
        "{}{}",
        base_url.trim_end_matches('/'),
        section_listing_path(section_id, query)
    )
}

pub(crate) fn section_listing_path(section_id: u32, query: &str) -> String {
    format!(
        "/library/sections/{}/all{}",
        section_id,
        normalize_filter_query(query)
    )
}

/// Query component of a filter URI as stored in a collection's `content`.
///
/// Accepts absolute (`http://`, `server://`) and server-relative URIs.
pub fn filter_query_from_content(content: &str) -> Option<String> {
    Url::parse(content)
        .or_else(|_| Url::parse("http://localhost").and_then(|base| base.join(content)))
        .ok()?;

    Some(raw_query(content))
}

/// Query text after the first `?` and before any `#`, exactly as written.
///
/// `Url::query` re-encodes operators like `>>=`, which Plex filters rely on.
fn raw_query(uri: &str) -> String {
    let query = uri.split_once('?').map(|(_, q)| q).unwrap_or_default();
    let query = query.split_once('#').map(|(q, _)| q).unwrap_or(query);
    format!("?{}", query)
}

/// The filter query of a smart collection, prefixed with `?`.
///
/// Fails with `NotSmart` for regular collections and with
/// `FilterUnavailable` when the server left `content` out, which some
/// servers do for smart collections.
pub fn extract_filter(collection: &Collection) -> Result<String> {
    if !collection.is_smart() {
        return Err(PlexClientError::NotSmart(collection.rating_key.clone()));
    }

    collection
        .content
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .and_then(filter_query_from_content)
        .ok_or_else(|| PlexClientError::FilterUnavailable(collection.rating_key.clone()))
}

/// Section ID and query of a listing URI like `.../library/sections/3/all?x=y`.
///
/// Returns `None` when the URI does not have that shape.
pub fn parse_filter_uri(uri: &str) -> Option<(u32, String)> {
    let url = Url::parse(uri).ok()?;
    let mut segments = url.path_segments()?;
    segments.find(|s| *s == "sections")?;
    let section_id = segments.next()?.parse().ok()?;
    Some((section_id, raw_query(uri)))
}

impl Collections<'_> {
    /// Items of `section_id` matched by `filter_query`.
    pub(crate) async fn filtered_items(
        &self,
        section_id: u32,
        filter_query: &str,
    ) -> Result<Vec<MediaItem>> {
        let url = self
            .client
            .endpoint(&section_listing_path(section_id, filter_query))?;
        let response = self.client.request(&self.scope, Method::GET, url).await?;
        let listing: MediaContainerResponse<MediaContainer<MediaItem>> =
            decode(&response, "section listing")?;
        Ok(listing.media_container.metadata)
    }

    /// Whether `filter_query` matches at least one item in `section_id`.
    ///
    /// An empty match is `Ok(false)`, not an error.
    pub async fn test_filter(&self, section_id: u32, filter_query: &str) -> Result<bool> {
        let items = self.filtered_items(section_id, filter_query).await?;
        debug!(
            section_id,
            filter = %normalize_filter_query(filter_query),
            matches = items.len(),
            "Tested smart filter"
        );
        Ok(!items.is_empty())
    }

    /// Run `test_filter` and turn an empty match into `FilterNoResults`.
    pub(crate) async fn require_filter_matches(
        &self,
        section_id: u32,
        filter_query: &str,
    ) -> Result<()> {
        if self.test_filter(section_id, filter_query).await? {
            Ok(())
        } else {
            Err(PlexClientError::FilterNoResults {
                section_id,
                filter: normalize_filter_query(filter_query),
            })
        }
    }

    /// Listing URI for a filter against this client's server.
    pub fn build_filter_uri(&self, section_id: u32, filter_query: &str) -> String {
        build_filter_uri(self.client.url(), section_id, filter_query)
    }
}
