//! HTTP mock server helpers for testing the Books client.
//!
//! A thin wrapper around `wiremock` for declarative HTTP stubbing.
//!
//! # Quick Start
//!
//! ```ignore
//! use crate::common::http_mock::MockHttpServer;
//!
//! #[tokio::test]
//! async fn test_list_books() {
//!     let server = MockHttpServer::start().await;
//!
//!     server
//!         .expect_get("/api/v1/Books")
//!         .respond_with_json(json!([]))
//!         .expect_times(1)
//!         .mount()
//!         .await;
//!
//!     // Point the client at server.url()
//! }
//! ```
//!
//! # Patterns
//!
//! - **Success response**: `.respond_with_json(value)`
//! - **Error response**: `.respond_with_status(503)`, optionally `.with_json_response(value)`
//! - **Timeout simulation**: `.respond_with_delay(Duration::from_secs(30))`
//! - **Flaky endpoint**: mount a stub with `.up_to_times(n)` before the steady-state stub
//! - **Request verification**: `.expect_times(1)`, checked by `verify()` or on drop

use std::time::Duration;

use serde_json::Value;
pub use wiremock::matchers::{body_json, header, method, path};
pub use wiremock::MockServer as WiremockServer;
pub use wiremock::{Mock, ResponseTemplate};

pub struct MockHttpServer {
    server: WiremockServer,
}

impl MockHttpServer {
    pub async fn start() -> Self {
        Self {
            server: WiremockServer::start().await,
        }
    }

    /// Base URL of the server, e.g. `http://127.0.0.1:54321`.
    pub fn url(&self) -> String {
        self.server.uri()
    }

    pub fn inner(&self) -> &WiremockServer {
        &self.server
    }

    pub fn expect_get(&self, route: &str) -> StubBuilder<'_> {
        StubBuilder::new(self, "GET", route)
    }

    pub fn expect_post(&self, route: &str) -> StubBuilder<'_> {
        StubBuilder::new(self, "POST", route)
    }

    pub fn expect_put(&self, route: &str) -> StubBuilder<'_> {
        StubBuilder::new(self, "PUT", route)
    }

    pub fn expect_delete(&self, route: &str) -> StubBuilder<'_> {
        StubBuilder::new(self, "DELETE", route)
    }

    /// Panics if any stub's `expect_times` was not met.
    pub async fn verify(&self) {
        self.server.verify().await;
    }

    /// Every request the server has seen, in order.
    pub async fn received_requests(&self) -> Vec<wiremock::Request> {
        self.server.received_requests().await.unwrap_or_default()
    }
}

/// One stubbed route, mounted with [`StubBuilder::mount`].
pub struct StubBuilder<'a> {
    server: &'a MockHttpServer,
    method: &'static str,
    route: String,
    headers: Vec<(String, String)>,
    request_body: Option<Value>,
    status: u16,
    response_body: Option<Value>,
    delay: Option<Duration>,
    times: Option<u64>,
    up_to: Option<u64>,
}

impl<'a> StubBuilder<'a> {
    fn new(server: &'a MockHttpServer, method: &'static str, route: &str) -> Self {
        Self {
            server,
            method,
            route: route.to_string(),
            headers: Vec::new(),
            request_body: None,
            status: 200,
            response_body: None,
            delay: None,
            times: None,
            up_to: None,
        }
    }

    /// Only match requests carrying this header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Only match requests whose JSON body equals `body`.
    pub fn with_body_json(mut self, body: Value) -> Self {
        self.request_body = Some(body);
        self
    }

    pub fn respond_with_json(mut self, body: Value) -> Self {
        self.status = 200;
        self.response_body = Some(body);
        self
    }

    pub fn respond_with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// JSON body for a non-200 response set with `respond_with_status`.
    pub fn with_json_response(mut self, body: Value) -> Self {
        self.response_body = Some(body);
        self
    }

    pub fn respond_with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Require exactly `n` matching requests.
    pub fn expect_times(mut self, n: u64) -> Self {
        self.times = Some(n);
        self
    }

    /// Stop matching after `n` requests so a later stub takes over.
    pub fn up_to_times(mut self, n: u64) -> Self {
        self.up_to = Some(n);
        self
    }

    pub async fn mount(self) {
        let mut builder = Mock::given(method(self.method)).and(path(self.route.as_str()));
        for (name, value) in &self.headers {
            builder = builder.and(header(name.as_str(), value.as_str()));
        }
        if let Some(body) = self.request_body {
            builder = builder.and(body_json(body));
        }

        let mut template = ResponseTemplate::new(self.status);
        if let Some(body) = self.response_body {
            template = template.set_body_json(body);
        }
        if let Some(delay) = self.delay {
            template = template.set_delay(delay);
        }

        let mut mock = builder.respond_with(template);
        if let Some(n) = self.up_to {
            mock = mock.up_to_n_times(n);
        }
        if let Some(n) = self.times {
            mock = mock.expect(n);
        }
        mock.mount(self.server.inner()).await;
    }
}
