//! Books API client.
//!
//! One operation per endpoint. Payloads and ids are sent exactly as given:
//! the service's own validation is what the harness is testing.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use super::envelope::Envelope;
use super::retry::{RetryPolicy, RetryingTransport};
use super::transport::{ApiRequest, Method, ReqwestTransport, Transport, TransportError};
use crate::config::Config;

/// Identifier placed in the `{id}` path segment.
///
/// Raw ids exist so negative tests can send non-numeric values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookId {
    Numeric(i64),
    Raw(String),
}

impl BookId {
    /// Path segment for this id. Raw ids are percent-encoded so they stay
    /// a single segment.
    #[must_use]
    pub fn path_segment(&self) -> String {
        match self {
            Self::Numeric(id) => id.to_string(),
            Self::Raw(raw) => urlencoding::encode(raw).into_owned(),
        }
    }
}

impl From<i64> for BookId {
    fn from(id: i64) -> Self {
        Self::Numeric(id)
    }
}

impl From<&str> for BookId {
    fn from(raw: &str) -> Self {
        Self::Raw(raw.to_string())
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Raw(raw) => write!(f, "{raw:?}"),
        }
    }
}

/// Operations on the Books endpoints.
///
/// Every operation returns the captured envelope, including 4xx/5xx
/// responses. Only network-level failures are errors.
#[async_trait]
pub trait BooksApi: Send + Sync {
    /// `GET /Books`
    async fn list_books(&self) -> Result<Envelope, TransportError>;

    /// `GET /Books/{id}`
    async fn get_book(&self, id: &BookId) -> Result<Envelope, TransportError>;

    /// `POST /Books`
    async fn create_book(&self, payload: &Value) -> Result<Envelope, TransportError>;

    /// `PUT /Books/{id}`
    async fn update_book(&self, id: &BookId, payload: &Value)
        -> Result<Envelope, TransportError>;

    /// `DELETE /Books/{id}`
    async fn delete_book(&self, id: &BookId) -> Result<Envelope, TransportError>;
}

/// HTTP implementation of [`BooksApi`] over any [`Transport`].
pub struct HttpBooksClient<T = RetryingTransport<ReqwestTransport>> {
    transport: T,
    books_url: String,
}

impl HttpBooksClient {
    /// Build the production client: reqwest transport with the configured
    /// timeout, wrapped in the configured retry policy.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let transport = ReqwestTransport::new(config.api.timeout())?;
        let retrying = RetryingTransport::new(transport, config.retry.policy());
        tracing::info!(
            endpoint = %config.api.books_url(),
            timeout = ?config.api.timeout(),
            max_attempts = config.retry.max_attempts,
            "books client initialised"
        );
        Ok(Self::with_transport(retrying, config.api.books_url()))
    }

    /// Client for an arbitrary base URL with default version and retry policy.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        timeout: std::time::Duration,
        policy: RetryPolicy,
    ) -> Result<Self, reqwest::Error> {
        let transport = RetryingTransport::new(ReqwestTransport::new(timeout)?, policy);
        Ok(Self::with_transport(
            transport,
            format!("{}/api/v1/Books", base_url.trim_end_matches('/')),
        ))
    }
}

impl<T: Transport> HttpBooksClient<T> {
    /// Create a client with a custom transport (for testing with custom config).
    pub fn with_transport(transport: T, books_url: impl Into<String>) -> Self {
        Self {
            transport,
            books_url: books_url.into(),
        }
    }

    #[must_use]
    pub fn books_url(&self) -> &str {
        &self.books_url
    }

    fn book_url(&self, id: &BookId) -> String {
        format!("{}/{}", self.books_url, id.path_segment())
    }
}

#[async_trait]
impl<T: Transport> BooksApi for HttpBooksClient<T> {
    async fn list_books(&self) -> Result<Envelope, TransportError> {
        tracing::info!("retrieving all books");
        self.transport
            .send(&ApiRequest::new(Method::Get, self.books_url.as_str()))
            .await
    }

    async fn get_book(&self, id: &BookId) -> Result<Envelope, TransportError> {
        tracing::info!(%id, "retrieving book");
        self.transport
            .send(&ApiRequest::new(Method::Get, self.book_url(id)))
            .await
    }

    async fn create_book(&self, payload: &Value) -> Result<Envelope, TransportError> {
        let title = payload
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("<none>");
        tracing::info!(title = %truncate(title, 60), "creating book");
        self.transport
            .send(&ApiRequest::new(Method::Post, self.books_url.as_str()).with_json(payload.clone()))
            .await
    }

    async fn update_book(
        &self,
        id: &BookId,
        payload: &Value,
    ) -> Result<Envelope, TransportError> {
        tracing::info!(%id, "updating book");
        self.transport
            .send(&ApiRequest::new(Method::Put, self.book_url(id)).with_json(payload.clone()))
            .await
    }

    async fn delete_book(&self, id: &BookId) -> Result<Envelope, TransportError> {
        tracing::info!(%id, "deleting book");
        self.transport
            .send(&ApiRequest::new(Method::Delete, self.book_url(id)))
            .await
    }
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        value.to_string()
    } else {
        let head: String = value.chars().take(max_chars).collect();
        format!("{head}...")
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::missing_const_for_fn,
    clippy::must_use_candidate
)]
pub mod mock {
    //! Mock implementation for unit testing.

    use super::{BookId, BooksApi, Envelope, TransportError};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// A call recorded by [`MockBooksClient`].
    #[derive(Debug, Clone, PartialEq)]
    pub enum BooksCall {
        List,
        Get(BookId),
        Create(Value),
        Update(BookId, Value),
        Delete(BookId),
    }

    /// Mock implementation of `BooksApi` for unit tests.
    ///
    /// Queue responses with `push_response`/`push_error`; they are handed out
    /// in order regardless of which operation is called. When the queue is
    /// empty every call answers with an empty 404 envelope.
    pub struct MockBooksClient {
        responses: Mutex<VecDeque<Result<Envelope, TransportError>>>,
        calls: Mutex<Vec<BooksCall>>,
    }

    impl MockBooksClient {
        pub fn new() -> Self {
            Self {
                responses: Mutex::new(VecDeque::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Queue an envelope for the next call.
        pub fn push_response(&self, envelope: Envelope) {
            self.responses.lock().unwrap().push_back(Ok(envelope));
        }

        /// Queue a transport failure for the next call.
        pub fn push_error(&self, error: TransportError) {
            self.responses.lock().unwrap().push_back(Err(error));
        }

        /// All calls made so far, in order.
        pub fn calls(&self) -> Vec<BooksCall> {
            self.calls.lock().unwrap().clone()
        }

        fn next(&self, call: BooksCall) -> Result<Envelope, TransportError> {
            self.calls.lock().unwrap().push(call);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Envelope::empty(404)))
        }
    }

    impl Default for MockBooksClient {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl BooksApi for MockBooksClient {
        async fn list_books(&self) -> Result<Envelope, TransportError> {
            self.next(BooksCall::List)
        }

        async fn get_book(&self, id: &BookId) -> Result<Envelope, TransportError> {
            self.next(BooksCall::Get(id.clone()))
        }

        async fn create_book(&self, payload: &Value) -> Result<Envelope, TransportError> {
            self.next(BooksCall::Create(payload.clone()))
        }

        async fn update_book(
            &self,
            id: &BookId,
            payload: &Value,
        ) -> Result<Envelope, TransportError> {
            self.next(BooksCall::Update(id.clone(), payload.clone()))
        }

        async fn delete_book(&self, id: &BookId) -> Result<Envelope, TransportError> {
            self.next(BooksCall::Delete(id.clone()))
        }
    }
}
