//! Error types for the Plex collections client.

use thiserror::Error;

/// Errors that can occur when managing collections on a Plex server.
#[derive(Error, Debug)]
pub enum PlexClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server is offline or unreachable
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),

    /// A non-reqwest transport failed before a response was received
    #[error("Transport error: {0}")]
    Transport(String),

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// A read that should yield one entity yielded none
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The collection's kind does not support the requested operation
    #[error("Collection {collection_id} does not support this operation: {reason}")]
    Capability {
        collection_id: String,
        reason: &'static str,
    },

    /// A smart filter was requested from a regular collection
    #[error("Collection {0} is not a smart collection")]
    NotSmart(String),

    /// The server did not expose the smart filter for this collection
    #[error("Smart filter not exposed for collection {0}")]
    FilterUnavailable(String),

    /// Smart filter matched nothing in its section
    #[error("Smart filter matched no items in section {section_id}: {filter}")]
    FilterNoResults { section_id: u32, filter: String },

    /// Creation succeeded but the new collection's identity could not be read
    #[error("Could not resolve created collection identity: {0}")]
    IdentityUnresolved(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Invalid server URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller cancelled the operation
    #[error("Operation cancelled")]
    Cancelled,

    /// Caller-supplied deadline passed
    #[error("Operation deadline exceeded")]
    DeadlineExceeded,
}

impl PlexClientError {
    /// HTTP status carried by a server rejection, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ServerError { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Failures worth retrying later: nothing reached the server, or the
    /// server answered with a 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request(_)
            | Self::ServerUnreachable(_)
            | Self::Transport(_)
            | Self::DeadlineExceeded => true,
            Self::ServerError { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Failures the caller should fix by changing its input.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Capability { .. }
                | Self::NotSmart(_)
                | Self::FilterNoResults { .. }
                | Self::InvalidUrl(_)
                | Self::Config(_)
        )
    }

    /// The server may now hold state the client could not observe.
    pub fn is_inconsistent_state(&self) -> bool {
        matches!(self, Self::IdentityUnresolved(_))
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, PlexClientError>;
