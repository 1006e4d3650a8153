//! Books API client module.
//!
//! Provides the HTTP client used by the test suite to call the Books
//! endpoints.
//!
//! # Architecture
//!
//! The module separates sending from retrying:
//!
//! - [`Transport`] - Sends one request and captures an [`Envelope`]
//! - [`ReqwestTransport`] - Real HTTP implementation using reqwest
//! - [`RetryingTransport`] - Decorator applying a [`RetryPolicy`] around any transport
//! - [`BooksApi`] - Trait defining the five Books operations
//! - [`HttpBooksClient`] - Implementation of `BooksApi` over a transport
//! - [`mock::MockBooksClient`] - Mock for unit tests (behind `test-utils` feature)
//!
//! # Testing Patterns
//!
//! ## Unit Tests (Mock Implementation)
//!
//! ```ignore
//! use books_harness::client::{mock::MockBooksClient, Envelope};
//!
//! let mock = MockBooksClient::new();
//! mock.push_response(Envelope::json(200, json!([])));
//! let outcome = Runner::new(&mock, &config).run_case(Case::GetAllBooks, 0).await;
//! ```
//!
//! ## Integration Tests (HTTP Stubbing)
//!
//! ```ignore
//! let server = MockHttpServer::start().await;
//! server.expect_get("/api/v1/Books/1").respond_with_json(book_json(1)).mount().await;
//!
//! let client = HttpBooksClient::new(&server.url(), Duration::from_secs(1), RetryPolicy::none())?;
//! let envelope = client.get_book(&BookId::from(1)).await?;
//! assert_eq!(envelope.status, 200);
//! ```

mod books;
mod envelope;
mod retry;
mod transport;

pub use books::{BookId, BooksApi, HttpBooksClient};
pub use envelope::{Body, Envelope};
pub use retry::{RetryPolicy, RetryingTransport};
pub use transport::{ApiRequest, Method, ReqwestTransport, Transport, TransportError};

#[cfg(any(test, feature = "test-utils"))]
pub use books::mock;
