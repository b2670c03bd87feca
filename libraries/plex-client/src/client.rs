//! Main Plex client.

use crate::collections::Collections;
use crate::config::PlexConfig;
use crate::error::{PlexClientError, Result};
use crate::transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};
use crate::types::{MediaContainerResponse, ServerIdentity};
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::future::{pending, Future};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

/// Plugin root of item URIs addressed to this server.
const LIBRARY_PLUGIN: &str = "com.plexapp.plugins.library";

/// Client for a single Plex Media Server.
///
/// The client holds only immutable configuration plus a lazily resolved
/// machine identifier, so it can be cloned and shared across tasks.
///
/// # Example
///
/// ```ignore
/// use plex_client::{PlexClient, PlexConfig};
///
/// let config = PlexConfig::new("http://192.168.1.10:32400").with_token("token");
/// let client = PlexClient::new(config)?;
///
/// for collection in client.collections().list(1).await? {
///     println!("{} ({})", collection.title, collection.rating_key);
/// }
/// ```
#[derive(Clone)]
pub struct PlexClient {
    transport: Arc<dyn Transport>,
    config: Arc<PlexConfig>,
    machine_identifier: Arc<OnceCell<String>>,
}

impl std::fmt::Debug for PlexClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlexClient")
            .field("url", &self.config.url)
            .finish_non_exhaustive()
    }
}

impl PlexClient {
    /// Create a new client with the given configuration.
    pub fn new(config: PlexConfig) -> Result<Self> {
        let config = normalize(config)?;
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::from_parts(config, Arc::new(transport)))
    }

    /// Create a client that sends requests through a custom transport.
    pub fn with_transport(config: PlexConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let config = normalize(config)?;
        Ok(Self::from_parts(config, transport))
    }

    fn from_parts(config: PlexConfig, transport: Arc<dyn Transport>) -> Self {
        let machine_identifier = match &config.machine_identifier {
            Some(id) => OnceCell::new_with(Some(id.clone())),
            None => OnceCell::new(),
        };

        Self {
            transport,
            config: Arc::new(config),
            machine_identifier: Arc::new(machine_identifier),
        }
    }

    /// Get the server URL.
    pub fn url(&self) -> &str {
        &self.config.url
    }

    pub fn config(&self) -> &PlexConfig {
        &self.config
    }

    /// Collection operations against this server.
    pub fn collections(&self) -> Collections<'_> {
        Collections::new(self)
    }

    /// Fetch the server's identity.
    ///
    /// This does not require authentication.
    pub async fn server_identity(&self) -> Result<ServerIdentity> {
        self.identity(&CallScope::default()).await
    }

    async fn identity(&self, scope: &CallScope) -> Result<ServerIdentity> {
        let url = self.endpoint("/identity")?;
        let response = self.request(scope, Method::GET, url).await?;
        let identity: MediaContainerResponse<ServerIdentity> = decode(&response, "identity")?;
        let identity = identity.media_container;

        info!(
            machine_identifier = %identity.machine_identifier,
            version = ?identity.version,
            "Connected to server"
        );

        Ok(identity)
    }

    /// The machine identifier, from config or resolved once via `/identity`.
    pub(crate) async fn machine_identifier(&self, scope: &CallScope) -> Result<String> {
        self.machine_identifier
            .get_or_try_init(|| async {
                let identity = self.identity(scope).await?;
                Ok::<_, PlexClientError>(identity.machine_identifier)
            })
            .await
            .cloned()
    }

    /// URI addressing library items, as accepted by the `uri=` parameter.
    ///
    /// An empty list addresses the bare metadata root.
    pub(crate) async fn metadata_uri(&self, scope: &CallScope, item_ids: &[String]) -> Result<String> {
        if item_ids.is_empty() {
            return Ok(format!("{}/library/metadata", self.config.url));
        }

        let machine = self.machine_identifier(scope).await?;
        Ok(format!(
            "server://{}/{}/library/metadata/{}",
            machine,
            LIBRARY_PLUGIN,
            item_ids.join(",")
        ))
    }

    /// Absolute URL for a server path (which may carry a query string).
    pub(crate) fn endpoint(&self, path_and_query: &str) -> Result<Url> {
        let raw = format!("{}{}", self.config.url, path_and_query);
        Url::parse(&raw).map_err(|e| PlexClientError::InvalidUrl(format!("{}: {}", raw, e)))
    }

    /// `base` followed by `segments`, each percent-encoded as one path segment.
    pub(crate) fn path_endpoint(&self, base: &str, segments: &[&str]) -> Result<Url> {
        let mut url = self.endpoint(base)?;
        url.path_segments_mut()
            .map_err(|()| PlexClientError::InvalidUrl("server URL cannot take a path".into()))?
            .extend(segments);
        Ok(url)
    }

    /// Send a request and return the raw response whatever its status.
    pub(crate) async fn send(
        &self,
        scope: &CallScope,
        method: Method,
        url: Url,
    ) -> Result<TransportResponse> {
        debug!(method = %method, url = %url, "Round trip");
        scope
            .run(self.transport.send(TransportRequest::new(method, url)))
            .await
    }

    /// Send a request and fail on any non-success status.
    pub(crate) async fn request(
        &self,
        scope: &CallScope,
        method: Method,
        url: Url,
    ) -> Result<TransportResponse> {
        let response = self.send(scope, method, url).await?;
        expect_success(response)
    }
}

fn normalize(config: PlexConfig) -> Result<PlexConfig> {
    config.validate()?;

    let url = config.url.trim_end_matches('/').to_string();
    Url::parse(&url).map_err(|e| PlexClientError::InvalidUrl(e.to_string()))?;

    Ok(PlexConfig { url, ..config })
}

/// Turn a non-2xx response into a `ServerError`.
pub(crate) fn expect_success(response: TransportResponse) -> Result<TransportResponse> {
    if response.status.is_success() {
        Ok(response)
    } else {
        Err(PlexClientError::ServerError {
            status: response.status.as_u16(),
            message: response.text(),
        })
    }
}

/// Decode a JSON body.
pub(crate) fn decode<T: DeserializeOwned>(response: &TransportResponse, what: &str) -> Result<T> {
    serde_json::from_slice(&response.body)
        .map_err(|e| PlexClientError::ParseError(format!("Failed to parse {} response: {}", what, e)))
}

/// Cancellation and deadline applied to every round trip of one operation.
#[derive(Debug, Clone, Default)]
pub(crate) struct CallScope {
    pub(crate) cancel: Option<CancellationToken>,
    pub(crate) deadline: Option<Instant>,
}

impl CallScope {
    /// Fail if the caller already gave up.
    pub(crate) fn check(&self) -> Result<()> {
        if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
            return Err(PlexClientError::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(PlexClientError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Drive `fut` unless cancellation or the deadline wins first.
    pub(crate) async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check()?;

        let cancelled = async {
            match &self.cancel {
                Some(token) => token.cancelled().await,
                None => pending::<()>().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            () = cancelled => Err(PlexClientError::Cancelled),
            () = expired => Err(PlexClientError::DeadlineExceeded),
            result = fut => result,
        }
    }

    /// Settling wait; returns early with an error on cancellation.
    pub(crate) async fn settle(&self, delay: Duration) -> Result<()> {
        if delay.is_zero() {
            return self.check();
        }
        debug!(delay_ms = delay.as_millis() as u64, "Waiting for server to settle");
        self.run(async {
            tokio::time::sleep(delay).await;
            Ok(())
        })
        .await
    }
}
