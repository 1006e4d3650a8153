//! Common test utilities for integration tests.
//!
//! - [`http_mock::MockHttpServer`] - Declarative HTTP stubs for the Books routes
//! - [`live`] - Shared runtime that `#[live_api_test]` bodies run on
//! - [`book_json`] - A well-formed book as the service returns it
//!
//! # Live Tests
//!
//! Tests marked `#[live_api_test]` call the real service. They are skipped
//! unless `BOOKS_LIVE_TESTS` is set; tests marked `writes` also need
//! `BOOKS_LIVE_WRITES`:
//!
//! ```text
//! BOOKS_LIVE_TESTS=1 BOOKS_LIVE_WRITES=1 cargo test -p books-harness --test live_api_tests
//! ```
//!
//! `BOOKS_API__BASE_URL` points them at another deployment.

#![allow(dead_code)]

pub mod http_mock;
pub mod live;

use serde_json::{json, Value};

/// A book in the shape the service returns.
pub fn book_json(id: i64) -> Value {
    json!({
        "id": id,
        "title": format!("Book {id}"),
        "description": "Lorem lorem lorem. Lorem lorem lorem.",
        "pageCount": id * 100,
        "excerpt": "Lorem lorem lorem. Lorem lorem lorem.",
        "publishDate": "2025-10-07T12:28:53.1234567+00:00"
    })
}
