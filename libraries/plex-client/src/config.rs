//! Client configuration.

use crate::error::{PlexClientError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for connecting to a Plex Media Server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlexConfig {
    /// Base URL of the server (e.g., "http://192.168.1.10:32400")
    pub url: String,

    /// `X-Plex-Token` sent with every request
    #[serde(default)]
    pub token: Option<String>,

    /// Server machine identifier used in `server://` item URIs.
    /// Fetched from `/identity` on first use when unset.
    #[serde(default)]
    pub machine_identifier: Option<String>,

    #[serde(default = "default_client_identifier")]
    pub client_identifier: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Wait after a mutating call before the confirmatory read
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    #[serde(default)]
    pub capabilities: ServerCapabilities,
}

/// Which per-item membership endpoints the server supports.
///
/// When an endpoint is unavailable the membership reconciler falls back to
/// recreating the whole collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerCapabilities {
    /// `PUT /library/collections/{id}/items?uri=...`
    #[serde(default = "default_enabled")]
    pub native_item_add: bool,

    /// `DELETE /library/collections/{id}/items/{itemID}`
    #[serde(default = "default_enabled")]
    pub native_item_remove: bool,
}

impl Default for ServerCapabilities {
    fn default() -> Self {
        Self {
            native_item_add: default_enabled(),
            native_item_remove: default_enabled(),
        }
    }
}

impl ServerCapabilities {
    /// Capabilities of servers that only accept whole-collection writes.
    pub fn recreate_only() -> Self {
        Self {
            native_item_add: false,
            native_item_remove: false,
        }
    }
}

impl PlexConfig {
    /// Create a new config with just the URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: None,
            machine_identifier: None,
            client_identifier: default_client_identifier(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            settle_delay_ms: default_settle_delay_ms(),
            capabilities: ServerCapabilities::default(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_machine_identifier(mut self, machine_identifier: impl Into<String>) -> Self {
        self.machine_identifier = Some(machine_identifier.into());
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_capabilities(mut self, capabilities: ServerCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        let mut settings = config::Config::builder();

        // Load from config file if it exists
        let config_path = PathBuf::from("plex.toml");
        if config_path.exists() {
            settings = settings.add_source(config::File::from(config_path));
        }

        // Override with environment variables (PLEX_URL, PLEX_CAPABILITIES__NATIVE_ITEM_ADD)
        settings = settings.add_source(
            config::Environment::with_prefix("PLEX")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings
            .build()
            .map_err(|e| PlexClientError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| PlexClientError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(PlexClientError::InvalidUrl("URL cannot be empty".into()));
        }

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(PlexClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        if self.token.as_deref().is_some_and(str::is_empty) {
            return Err(PlexClientError::Config(
                "token is set but empty (check PLEX_TOKEN)".into(),
            ));
        }

        Ok(())
    }
}

// Default values
fn default_client_identifier() -> String {
    format!("plex-client-{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_settle_delay_ms() -> u64 {
    2000
}

fn default_enabled() -> bool {
    true
}
