//! Plex Collections Client
//!
//! Client library for managing collections on a Plex Media Server.
//!
//! # Features
//!
//! - **Lifecycle**: list, get, create (regular and smart), delete
//! - **Membership**: add, remove and reorder items, using per-item endpoints
//!   or whole-collection recreation depending on server capabilities
//! - **Smart filters**: validate a filter against its section before
//!   committing it, read it back from a smart collection
//! - **Presentation**: collection mode, sort order and hub visibility
//!
//! # Example
//!
//! ```ignore
//! use plex_client::{MediaType, PlexClient, PlexConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PlexClient::new(PlexConfig::load()?)?;
//!     let collections = client.collections();
//!
//!     // Regular collection
//!     let favourites = collections.create(1, "Favourites", &["1234", "5678"]).await?;
//!     collections.add_items(&favourites, &["9876"]).await?;
//!
//!     // Smart collection, rejected if the filter matches nothing
//!     let action = collections
//!         .create_smart(1, "Action", MediaType::Movie, "type=1&genre=action")
//!         .await?;
//!     println!("{} has {} items", action.title, collections.items(&action.rating_key).await?.len());
//!
//!     Ok(())
//! }
//! ```

mod client;
mod collections;
mod config;
mod error;
mod membership;
mod smart_filter;
mod transport;
mod types;

// Re-export main types
pub use client::PlexClient;
pub use collections::{CollectionRef, Collections};
pub use config::{PlexConfig, ServerCapabilities};
pub use error::{PlexClientError, Result};
pub use membership::{
    plan_add, plan_remove, select_strategy, MembershipDiff, MembershipOp, MembershipOutcome,
    MutationStrategy,
};
pub use smart_filter::{
    build_filter_uri, extract_filter, filter_query_from_content, normalize_filter_query,
    parse_filter_uri,
};
pub use transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};
pub use types::{
    Collection, CollectionMode, CollectionSort, CollectionVisibility, MediaContainer,
    MediaContainerResponse, MediaItem, MediaType, ServerIdentity, WireValue,
};

// Cancellation tokens accepted by `Collections::with_cancellation`
pub use tokio_util::sync::CancellationToken;
