//! Collection lifecycle operations.

use crate::client::{decode, CallScope, PlexClient};
use crate::error::{PlexClientError, Result};
use crate::smart_filter::{normalize_filter_query, parse_filter_uri};
use crate::transport::TransportResponse;
use crate::types::{
    Collection, CollectionMode, CollectionSort, CollectionVisibility, ManageContainer,
    MediaContainer, MediaContainerResponse, MediaType,
};
use reqwest::Method;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

const COLLECTIONS_ROOT: &str = "/library/collections";
const COLLECTIONS_PATH: &str = "/library/collections/";

/// A collection named by rating key, or one the caller already fetched.
///
/// Passing a fetched [`Collection`] lets kind checks (smart vs. regular)
/// run locally without a detail read.
#[derive(Debug, Clone, Copy)]
pub enum CollectionRef<'c> {
    Id(&'c str),
    Loaded(&'c Collection),
}

impl CollectionRef<'_> {
    pub fn id(&self) -> &str {
        match self {
            CollectionRef::Id(id) => id,
            CollectionRef::Loaded(collection) => &collection.rating_key,
        }
    }
}

impl<'c> From<&'c str> for CollectionRef<'c> {
    fn from(id: &'c str) -> Self {
        CollectionRef::Id(id)
    }
}

impl<'c> From<&'c String> for CollectionRef<'c> {
    fn from(id: &'c String) -> Self {
        CollectionRef::Id(id)
    }
}

impl<'c> From<&'c Collection> for CollectionRef<'c> {
    fn from(collection: &'c Collection) -> Self {
        CollectionRef::Loaded(collection)
    }
}

/// Collection operations for one [`PlexClient`].
///
/// Obtained from [`PlexClient::collections`]. Every round trip honours the
/// handle's cancellation token and deadline; an operation interrupted between
/// round trips stops where it is and nothing is rolled back.
#[derive(Debug, Clone)]
pub struct Collections<'a> {
    pub(crate) client: &'a PlexClient,
    pub(crate) scope: CallScope,
}

impl<'a> Collections<'a> {
    pub(crate) fn new(client: &'a PlexClient) -> Self {
        Self {
            client,
            scope: CallScope::default(),
        }
    }

    /// Abort remaining round trips once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.scope.cancel = Some(token);
        self
    }

    /// Abort remaining round trips once `deadline` passes.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.scope.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    async fn settle(&self) -> Result<()> {
        self.scope.settle(self.client.config().settle_delay()).await
    }

    /// `/library/collections/{id}/{rest...}` with the ID escaped as a single
    /// path segment.
    pub(crate) fn collection_url(&self, collection_id: &str, rest: &[&str]) -> Result<Url> {
        let mut segments = Vec::with_capacity(rest.len() + 1);
        segments.push(collection_id);
        segments.extend_from_slice(rest);
        self.client.path_endpoint(COLLECTIONS_ROOT, &segments)
    }

    /// The collection behind `target`, fetching it when only an ID was given.
    pub(crate) async fn resolve(&self, target: CollectionRef<'_>) -> Result<Collection> {
        match target {
            CollectionRef::Id(id) => self.get(id).await,
            CollectionRef::Loaded(collection) => Ok(collection.clone()),
        }
    }

    /// List all collections in a library section.
    pub async fn list(&self, section_id: u32) -> Result<Vec<Collection>> {
        let url = self
            .client
            .endpoint(&format!("/library/sections/{}/collections", section_id))?;
        debug!(url = %url, section_id, "Listing collections");

        let response = self.client.request(&self.scope, Method::GET, url).await?;
        let listing: MediaContainerResponse<MediaContainer<Collection>> =
            decode(&response, "collection listing")?;

        debug!(
            section_id,
            collections = listing.media_container.metadata.len(),
            "Listed collections"
        );
        Ok(listing.media_container.metadata)
    }

    /// Get a single collection by rating key.
    pub async fn get(&self, collection_id: &str) -> Result<Collection> {
        let url = self.collection_url(collection_id, &[])?;
        debug!(url = %url, collection_id = %collection_id, "Fetching collection");

        let response = self.client.request(&self.scope, Method::GET, url).await?;
        let detail: MediaContainerResponse<MediaContainer<Collection>> =
            decode(&response, "collection")?;
        let container = detail.media_container;

        let mut collection = container
            .metadata
            .into_iter()
            .next()
            .ok_or_else(|| PlexClientError::NotFound {
                entity: "collection",
                id: collection_id.to_string(),
            })?;

        if collection.content.is_none() {
            collection.content = container.content;
        }

        Ok(collection)
    }

    /// Create a regular movie collection holding `item_ids`.
    ///
    /// An empty list creates an empty collection.
    pub async fn create<S: AsRef<str>>(
        &self,
        section_id: u32,
        title: &str,
        item_ids: &[S],
    ) -> Result<Collection> {
        self.create_with_type(section_id, title, MediaType::default(), item_ids)
            .await
    }

    /// Create a regular collection of the given media type.
    pub async fn create_with_type<S: AsRef<str>>(
        &self,
        section_id: u32,
        title: &str,
        media_type: MediaType,
        item_ids: &[S],
    ) -> Result<Collection> {
        let item_ids: Vec<String> = item_ids.iter().map(|s| s.as_ref().to_string()).collect();
        let uri = self.client.metadata_uri(&self.scope, &item_ids).await?;

        debug!(
            section_id,
            title = %title,
            items = item_ids.len(),
            "Creating collection"
        );
        self.post_collection(section_id, title, media_type, false, &uri)
            .await
    }

    /// Create a smart collection after checking that the filter matches
    /// something in the section.
    pub async fn create_smart(
        &self,
        section_id: u32,
        title: &str,
        smart_type: MediaType,
        filter_query: &str,
    ) -> Result<Collection> {
        let filter_query = normalize_filter_query(filter_query);
        self.require_filter_matches(section_id, &filter_query).await?;

        let uri = self.build_filter_uri(section_id, &filter_query);
        debug!(
            section_id,
            title = %title,
            filter = %filter_query,
            "Creating smart collection"
        );
        self.post_collection(section_id, title, smart_type, true, &uri)
            .await
    }

    async fn post_collection(
        &self,
        section_id: u32,
        title: &str,
        media_type: MediaType,
        smart: bool,
        uri: &str,
    ) -> Result<Collection> {
        let mut url = self.client.endpoint(COLLECTIONS_ROOT)?;
        url.query_pairs_mut()
            .append_pair("type", &media_type.code().to_string())
            .append_pair("title", title)
            .append_pair("smart", if smart { "1" } else { "0" })
            .append_pair("sectionId", &section_id.to_string())
            .append_pair("uri", uri);

        let response = self.client.request(&self.scope, Method::POST, url).await?;
        let collection_id = resolve_created_identity(&response)?;

        info!(
            collection_id = %collection_id,
            title = %title,
            smart,
            "Collection created"
        );

        self.settle().await?;
        self.get(&collection_id).await
    }

    /// Delete a collection.
    pub async fn delete(&self, collection_id: &str) -> Result<()> {
        let url = self.collection_url(collection_id, &[])?;
        debug!(url = %url, collection_id = %collection_id, "Deleting collection");

        self.client.request(&self.scope, Method::DELETE, url).await?;
        info!(collection_id = %collection_id, "Collection deleted");

        self.settle().await
    }

    /// Set how the collection is shown in its section.
    ///
    /// Accepts a [`CollectionMode`] or its label; unknown labels send the
    /// default mode.
    pub async fn update_mode(
        &self,
        collection_id: &str,
        mode: impl Into<CollectionMode>,
    ) -> Result<()> {
        let mode = mode.into();
        self.put_pref(collection_id, "collectionMode", mode.code()).await?;
        debug!(collection_id = %collection_id, mode = %mode, "Updated collection mode");
        Ok(())
    }

    /// Set the ordering of the collection's children.
    ///
    /// Accepts a [`CollectionSort`] or its label; unknown labels send the
    /// release order.
    pub async fn update_sort(
        &self,
        collection_id: &str,
        sort: impl Into<CollectionSort>,
    ) -> Result<()> {
        let sort = sort.into();
        self.put_pref(collection_id, "collectionSort", sort.code()).await?;
        debug!(collection_id = %collection_id, sort = %sort, "Updated collection sort");
        Ok(())
    }

    async fn put_pref(&self, collection_id: &str, name: &str, code: i8) -> Result<()> {
        let mut url = self.collection_url(collection_id, &["prefs"])?;
        url.query_pairs_mut().append_pair(name, &code.to_string());

        self.client.request(&self.scope, Method::PUT, url).await?;
        Ok(())
    }

    /// Read hub visibility. Lives under the section's hub management
    /// resource, not under the collection.
    pub async fn get_visibility(
        &self,
        section_id: u32,
        collection_id: &str,
    ) -> Result<CollectionVisibility> {
        let mut url = self
            .client
            .endpoint(&format!("/hubs/sections/{}/manage", section_id))?;
        url.query_pairs_mut()
            .append_pair("metadataItemId", collection_id);

        let response = self.client.request(&self.scope, Method::GET, url).await?;
        let manage: MediaContainerResponse<ManageContainer> =
            decode(&response, "hub management")?;

        manage
            .media_container
            .directory
            .first()
            .map(CollectionVisibility::from)
            .ok_or_else(|| PlexClientError::NotFound {
                entity: "visibility",
                id: collection_id.to_string(),
            })
    }

    /// Write hub visibility.
    pub async fn set_visibility(
        &self,
        section_id: u32,
        collection_id: &str,
        visibility: CollectionVisibility,
    ) -> Result<()> {
        let mut url = self
            .client
            .endpoint(&format!("/hubs/sections/{}/manage", section_id))?;
        url.query_pairs_mut()
            .append_pair("metadataItemId", collection_id)
            .append_pair("promotedToRecommended", flag(visibility.library))
            .append_pair("promotedToOwnHome", flag(visibility.home))
            .append_pair("promotedToSharedHome", flag(visibility.shared));

        self.client.request(&self.scope, Method::POST, url).await?;
        info!(
            collection_id = %collection_id,
            library = visibility.library,
            home = visibility.home,
            shared = visibility.shared,
            "Updated collection visibility"
        );
        Ok(())
    }

    /// Replace a smart collection's filter.
    ///
    /// When `filter_uri` has the shape `.../library/sections/{id}/all?...`
    /// the filter is tested against that section first; other shapes are
    /// sent without testing.
    pub async fn update_smart_filter<'c>(
        &self,
        target: impl Into<CollectionRef<'c>>,
        filter_uri: &str,
    ) -> Result<()> {
        let collection = self.resolve(target.into()).await?;
        if !collection.is_smart() {
            return Err(PlexClientError::Capability {
                collection_id: collection.rating_key,
                reason: "only smart collections have a filter",
            });
        }

        match parse_filter_uri(filter_uri) {
            Some((section_id, query)) => self.require_filter_matches(section_id, &query).await?,
            None => debug!(filter_uri = %filter_uri, "Filter URI not testable, sending as-is"),
        }

        let mut url = self.collection_url(&collection.rating_key, &["items"])?;
        url.query_pairs_mut().append_pair("uri", filter_uri);

        self.client.request(&self.scope, Method::PUT, url).await?;
        info!(collection_id = %collection.rating_key, "Updated smart filter");
        Ok(())
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// Rating key of a freshly created collection, from the `Location` header or
/// else from the response body.
pub(crate) fn resolve_created_identity(response: &TransportResponse) -> Result<String> {
    if let Some(id) = response.location().and_then(id_from_location) {
        return Ok(id);
    }

    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Err(PlexClientError::IdentityUnresolved(
            "no usable Location header and empty body".into(),
        ));
    }

    let created: MediaContainerResponse<MediaContainer<Collection>> =
        serde_json::from_slice(&response.body)
            .map_err(|e| PlexClientError::IdentityUnresolved(format!("unreadable body: {}", e)))?;

    created
        .media_container
        .metadata
        .into_iter()
        .next()
        .map(|c| c.rating_key)
        .ok_or_else(|| PlexClientError::IdentityUnresolved("body lists no collection".into()))
}

/// `42` from `/library/collections/42` or `http://host/library/collections/42?x`.
fn id_from_location(location: &str) -> Option<String> {
    let (_, rest) = location.split_once(COLLECTIONS_PATH)?;
    let id = rest
        .split(['/', '?', '#'])
        .next()
        .filter(|id| !id.is_empty())?;
    Some(id.to_string())
}
