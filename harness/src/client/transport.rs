//! Single-request transport primitive.
//!
//! A [`Transport`] sends exactly one request and turns the response into an
//! [`Envelope`]. Retrying is layered on top by [`super::RetryingTransport`].

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use thiserror::Error;

use super::envelope::{Body, Envelope};

/// HTTP methods used by the Books endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Network-level failures. Application errors (4xx/5xx) are never mapped
/// here; they come back as ordinary envelopes.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request did not complete within the configured timeout
    #[error("{method} {url} timed out after {timeout:?}")]
    Timeout {
        method: Method,
        url: String,
        timeout: Duration,
    },

    /// Connection could not be established (refused, DNS, TLS)
    #[error("{method} {url} could not connect: {source}")]
    Connect {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Any other failure while sending or reading the response
    #[error("{method} {url} failed: {source}")]
    Request {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The request URL could not be built
    #[error("invalid request URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl TransportError {
    /// Whether a retry has a chance of succeeding.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        !matches!(self, Self::InvalidUrl { .. })
    }

    fn from_reqwest(
        method: Method,
        url: &str,
        timeout: Duration,
        source: reqwest::Error,
    ) -> Self {
        let url = url.to_string();
        if source.is_timeout() {
            Self::Timeout {
                method,
                url,
                timeout,
            }
        } else if source.is_connect() {
            Self::Connect {
                method,
                url,
                source,
            }
        } else if source.is_builder() {
            Self::InvalidUrl {
                url,
                reason: source.to_string(),
            }
        } else {
            Self::Request {
                method,
                url,
                source,
            }
        }
    }
}

/// Sends one request and captures the response.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` once.
    ///
    /// # Errors
    /// Returns a [`TransportError`] when no HTTP response was obtained.
    async fn send(&self, request: &ApiRequest) -> Result<Envelope, TransportError>;
}

/// [`Transport`] backed by `reqwest`.
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Create a transport with JSON default headers and the given timeout.
    ///
    /// # Errors
    /// Returns an error if the underlying client cannot be built (e.g. TLS
    /// backend initialisation fails).
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, timeout })
    }

    /// Create a transport around a custom `reqwest::Client` (for testing with custom config).
    #[must_use]
    pub const fn with_client(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    async fn exchange(&self, request: &ApiRequest) -> Result<Envelope, reqwest::Error> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, &request.url)
            .timeout(self.timeout);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let started = Instant::now();
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let text = response.text().await?;
        let elapsed = started.elapsed();

        Ok(Envelope {
            status,
            headers,
            body: Body::decode(text),
            elapsed,
        })
    }
}

fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
        })
        .collect()
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<Envelope, TransportError> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");

        match self.exchange(request).await {
            Ok(envelope) => {
                if envelope.status >= 400 {
                    tracing::warn!(
                        method = %request.method,
                        url = %request.url,
                        status = envelope.status,
                        body_kind = envelope.body.kind(),
                        "request returned error status"
                    );
                } else {
                    tracing::debug!(
                        method = %request.method,
                        url = %request.url,
                        status = envelope.status,
                        elapsed = ?envelope.elapsed,
                        "request succeeded"
                    );
                }
                Ok(envelope)
            }
            Err(source) => {
                let err =
                    TransportError::from_reqwest(request.method, &request.url, self.timeout, source);
                tracing::error!(error = %err, "transport failure");
                Err(err)
            }
        }
    }
}
