//! Collection membership reconciliation.
//!
//! Smart collections are never edited directly. For regular collections the
//! reconciler reads the current membership, computes the change locally and
//! then either calls the per-item endpoints or, on servers without them,
//! recreates the collection with the new membership. The choice is made by
//! [`select_strategy`] from static [`ServerCapabilities`].
//!
//! Nothing here coordinates concurrent writers. Two concurrent adds to the
//! same collection can both read the same membership; on the recreate path the
//! last writer wins.

use crate::client::{decode, expect_success};
use crate::collections::{CollectionRef, Collections};
use crate::config::ServerCapabilities;
use crate::error::{PlexClientError, Result};
use crate::smart_filter::{extract_filter, parse_filter_uri};
use crate::types::{Collection, MediaContainer, MediaContainerResponse, MediaItem};
use reqwest::{Method, StatusCode};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// A membership edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipOp {
    Add,
    Remove,
    Move,
}

/// How an edit is applied to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStrategy {
    /// Per-item endpoints under `/library/collections/{id}/items`
    Native,
    /// Create a replacement collection with the new membership, then delete
    /// the original
    Recreate,
}

/// Pick the strategy for `op` given what the server supports.
///
/// Moves only exist as a native endpoint.
pub fn select_strategy(capabilities: &ServerCapabilities, op: MembershipOp) -> MutationStrategy {
    let native = match op {
        MembershipOp::Add => capabilities.native_item_add,
        MembershipOp::Remove => capabilities.native_item_remove,
        MembershipOp::Move => true,
    };

    if native {
        MutationStrategy::Native
    } else {
        MutationStrategy::Recreate
    }
}

/// Result of planning an add or remove against the current membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipDiff {
    /// IDs that actually change state, in request order for adds and
    /// membership order for removes
    pub changed: Vec<String>,
    /// Full membership after the edit
    pub membership: Vec<String>,
}

impl MembershipDiff {
    pub fn is_noop(&self) -> bool {
        self.changed.is_empty()
    }
}

/// Union keeping `current` order and appending new unique IDs.
pub fn plan_add<S: AsRef<str>>(current: &[String], requested: &[S]) -> MembershipDiff {
    let mut seen: HashSet<&str> = current.iter().map(String::as_str).collect();
    let mut membership = current.to_vec();
    let mut changed = Vec::new();

    for id in requested {
        let id = id.as_ref();
        if seen.insert(id) {
            membership.push(id.to_string());
            changed.push(id.to_string());
        }
    }

    MembershipDiff {
        changed,
        membership,
    }
}

/// Difference; requested IDs that are absent are ignored.
pub fn plan_remove<S: AsRef<str>>(current: &[String], requested: &[S]) -> MembershipDiff {
    let requested: HashSet<&str> = requested.iter().map(|id| id.as_ref()).collect();
    let (changed, membership): (Vec<String>, Vec<String>) = current
        .iter()
        .cloned()
        .partition(|id| requested.contains(id.as_str()));

    MembershipDiff {
        changed,
        membership,
    }
}

/// What a membership edit did.
#[derive(Debug, Clone)]
pub enum MembershipOutcome {
    /// Nothing to change; no mutation was sent
    Unchanged,
    /// Applied through per-item endpoints
    Updated { changed: Vec<String> },
    /// Applied by recreation; `collection` is the replacement
    Recreated {
        collection: Collection,
        changed: Vec<String>,
    },
}

impl MembershipOutcome {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, MembershipOutcome::Unchanged)
    }
}

fn reject_smart(collection: &Collection, reason: &'static str) -> Result<()> {
    if collection.is_smart() {
        return Err(PlexClientError::Capability {
            collection_id: collection.rating_key.clone(),
            reason,
        });
    }
    Ok(())
}

impl Collections<'_> {
    /// Current members of a collection, in server order.
    ///
    /// Smart collections are read by running their filter against the
    /// section. When the server does not expose the filter the children
    /// listing is used instead.
    pub async fn items(&self, collection_id: &str) -> Result<Vec<MediaItem>> {
        let collection = self.get(collection_id).await?;
        self.members_of(&collection).await
    }

    /// Rating keys of [`Collections::items`].
    pub async fn item_keys(&self, collection_id: &str) -> Result<Vec<String>> {
        let items = self.items(collection_id).await?;
        Ok(items.into_iter().map(|item| item.rating_key).collect())
    }

    pub(crate) async fn members_of(&self, collection: &Collection) -> Result<Vec<MediaItem>> {
        if collection.is_smart() {
            let section = collection
                .content
                .as_deref()
                .and_then(parse_filter_uri)
                .map(|(section, _)| section)
                .or(collection.section_id);

            match (extract_filter(collection), section) {
                (Ok(query), Some(section_id)) => {
                    return self.filtered_items(section_id, &query).await;
                }
                (Err(PlexClientError::FilterUnavailable(_)), _) | (Ok(_), None) => {
                    warn!(
                        collection_id = %collection.rating_key,
                        "Smart filter not available, reading children instead"
                    );
                }
                (Err(e), _) => return Err(e),
            }
        }

        self.children(&collection.rating_key).await
    }

    async fn children(&self, collection_id: &str) -> Result<Vec<MediaItem>> {
        let url = self.collection_url(collection_id, &["children"])?;
        let response = self.client.request(&self.scope, Method::GET, url).await?;
        let listing: MediaContainerResponse<MediaContainer<MediaItem>> =
            decode(&response, "collection children")?;
        Ok(listing.media_container.metadata)
    }

    async fn member_keys(&self, collection: &Collection) -> Result<Vec<String>> {
        let items = self.members_of(collection).await?;
        Ok(items.into_iter().map(|item| item.rating_key).collect())
    }

    /// Add items to a regular collection.
    ///
    /// IDs already present are skipped; when nothing is new no mutation is
    /// sent. Changes may take a moment to show up in later reads.
    pub async fn add_items<'c, S: AsRef<str>>(
        &self,
        target: impl Into<CollectionRef<'c>>,
        item_ids: &[S],
    ) -> Result<MembershipOutcome> {
        let collection = self.resolve(target.into()).await?;
        reject_smart(&collection, "cannot add items to a smart collection")?;

        if item_ids.is_empty() {
            return Ok(MembershipOutcome::Unchanged);
        }

        let current = self.member_keys(&collection).await?;
        let diff = plan_add(&current, item_ids);
        if diff.is_noop() {
            debug!(collection_id = %collection.rating_key, "All items already present");
            return Ok(MembershipOutcome::Unchanged);
        }

        match select_strategy(&self.client.config().capabilities, MembershipOp::Add) {
            MutationStrategy::Native => {
                let uri = self
                    .client
                    .metadata_uri(&self.scope, &diff.membership)
                    .await?;
                let mut url = self.collection_url(&collection.rating_key, &["items"])?;
                url.query_pairs_mut().append_pair("uri", &uri);

                self.client.request(&self.scope, Method::PUT, url).await?;
                info!(
                    collection_id = %collection.rating_key,
                    added = diff.changed.len(),
                    "Added items to collection"
                );
                Ok(MembershipOutcome::Updated {
                    changed: diff.changed,
                })
            }
            MutationStrategy::Recreate => self.recreate(&collection, diff).await,
        }
    }

    /// Remove items from a regular collection.
    ///
    /// IDs that are not members are ignored; when none are members no
    /// mutation is sent. A 404 for an individual item means it is already
    /// gone and is not an error.
    pub async fn remove_items<'c, S: AsRef<str>>(
        &self,
        target: impl Into<CollectionRef<'c>>,
        item_ids: &[S],
    ) -> Result<MembershipOutcome> {
        let collection = self.resolve(target.into()).await?;
        reject_smart(&collection, "cannot remove items from a smart collection")?;

        if item_ids.is_empty() {
            return Ok(MembershipOutcome::Unchanged);
        }

        let current = self.member_keys(&collection).await?;
        let diff = plan_remove(&current, item_ids);
        if diff.is_noop() {
            debug!(collection_id = %collection.rating_key, "No requested items are members");
            return Ok(MembershipOutcome::Unchanged);
        }

        match select_strategy(&self.client.config().capabilities, MembershipOp::Remove) {
            MutationStrategy::Native => {
                for item_id in &diff.changed {
                    self.delete_item(&collection.rating_key, item_id).await?;
                }
                info!(
                    collection_id = %collection.rating_key,
                    removed = diff.changed.len(),
                    "Removed items from collection"
                );
                Ok(MembershipOutcome::Updated {
                    changed: diff.changed,
                })
            }
            MutationStrategy::Recreate => self.recreate(&collection, diff).await,
        }
    }

    async fn delete_item(&self, collection_id: &str, item_id: &str) -> Result<()> {
        let url = self.collection_url(collection_id, &["items", item_id])?;
        let response = self.client.send(&self.scope, Method::DELETE, url).await?;

        if response.status == StatusCode::NOT_FOUND {
            warn!(
                collection_id = %collection_id,
                item_id = %item_id,
                "Item already absent from collection"
            );
            return Ok(());
        }

        expect_success(response)?;
        Ok(())
    }

    /// Move `item_id` to follow `after`, or to the head when `after` is
    /// `None` or empty.
    pub async fn move_item<'c>(
        &self,
        target: impl Into<CollectionRef<'c>>,
        item_id: &str,
        after: Option<&str>,
    ) -> Result<()> {
        let collection = self.resolve(target.into()).await?;
        reject_smart(&collection, "smart collection order is filter-derived")?;

        let mut url = self.collection_url(&collection.rating_key, &["items", item_id, "move"])?;
        if let Some(anchor) = after.filter(|a| !a.is_empty()) {
            url.query_pairs_mut().append_pair("after", anchor);
        }

        self.client.request(&self.scope, Method::PUT, url).await?;
        debug!(
            collection_id = %collection.rating_key,
            item_id = %item_id,
            after = ?after,
            "Moved collection item"
        );
        Ok(())
    }

    /// Replace `collection` with a new one holding `diff.membership`.
    async fn recreate(
        &self,
        collection: &Collection,
        diff: MembershipDiff,
    ) -> Result<MembershipOutcome> {
        let section_id = collection.section_id.ok_or_else(|| {
            PlexClientError::ParseError(format!(
                "collection {} has no librarySectionID",
                collection.rating_key
            ))
        })?;
        let media_type = collection.media_type().unwrap_or_default();

        debug!(
            collection_id = %collection.rating_key,
            members = diff.membership.len(),
            "Recreating collection"
        );
        let replacement = self
            .create_with_type(section_id, &collection.title, media_type, &diff.membership)
            .await?;

        // The server may fold a same-titled create into the existing collection
        if replacement.rating_key != collection.rating_key {
            self.delete(&collection.rating_key).await?;
        }

        info!(
            old_collection_id = %collection.rating_key,
            collection_id = %replacement.rating_key,
            changed = diff.changed.len(),
            "Collection recreated"
        );
        Ok(MembershipOutcome::Recreated {
            collection: replacement,
            changed: diff.changed,
        })
    }
}
