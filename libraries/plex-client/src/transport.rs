//! HTTP transport boundary.
//!
//! A [`Transport`] sends one request and hands back the raw status, headers
//! and body. It only fails when no response was received; interpreting the
//! status code is left to the caller.

use crate::config::PlexConfig;
use crate::error::{PlexClientError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, LOCATION};
use reqwest::{Client, Method, StatusCode};
use tracing::debug;
use url::Url;

/// A single outgoing request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl TransportRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
        }
    }
}

/// The raw answer to a [`TransportRequest`].
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// The `Location` header, if present and readable.
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends requests to the server.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
    default_headers: HeaderMap,
}

impl ReqwestTransport {
    /// Build a transport from the client configuration.
    pub fn new(config: &PlexConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(format!("PlexClient/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.insert("X-Plex-Product", HeaderValue::from_static("plex-client"));
        default_headers.insert(
            "X-Plex-Client-Identifier",
            header_value(&config.client_identifier)?,
        );
        if let Some(token) = &config.token {
            let mut value = header_value(token)?;
            value.set_sensitive(true);
            default_headers.insert("X-Plex-Token", value);
        }

        Ok(Self {
            http,
            default_headers,
        })
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| PlexClientError::Config(format!("invalid header value: {}", e)))
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        debug!(method = %request.method, url = %request.url, "Sending request");

        let mut headers = self.default_headers.clone();
        headers.extend(request.headers);

        let response = self
            .http
            .request(request.method, request.url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    PlexClientError::ServerUnreachable(e.to_string())
                } else {
                    PlexClientError::Request(e)
                }
            })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
