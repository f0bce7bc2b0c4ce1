//! Mock HTTP server for end-to-end transport tests.
//!
//! Wraps wiremock with the response shapes the graph API uses.

use std::time::Duration;

use serde_json::Value;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A wiremock server standing in for the graph API.
pub struct MockGraphServer {
    server: MockServer,
}

fn json_response(status: u16, body: Value) -> ResponseTemplate {
    ResponseTemplate::new(status)
        .set_body_json(body)
        .insert_header("content-type", "application/json")
}

impl MockGraphServer {
    /// Start a new mock server.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL of the server, ending in `/`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("{}/", self.server.uri())
    }

    /// The underlying wiremock server for advanced configuration.
    #[must_use]
    pub const fn inner(&self) -> &MockServer {
        &self.server
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Response Setup
    // ─────────────────────────────────────────────────────────────────────────

    /// Answer GET `request_path` with a JSON document.
    pub async fn expect_json(&self, request_path: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(json_response(200, body))
            .mount(&self.server)
            .await;
    }

    /// Answer GET `request_path` with a JSON document exactly `times` times.
    pub async fn expect_json_times(&self, request_path: &str, body: Value, times: u64) {
        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(json_response(200, body))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Answer GET `request_path` only when `param` has `value`.
    pub async fn expect_with_query(&self, request_path: &str, param: &str, value: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(request_path))
            .and(query_param(param, value))
            .respond_with(json_response(200, body))
            .mount(&self.server)
            .await;
    }

    /// Answer with a non-success status and a JSON body.
    pub async fn expect_status(&self, request_path: &str, status: u16, body: Value) {
        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(json_response(status, body))
            .mount(&self.server)
            .await;
    }

    /// Answer with a non-success status and a plain-text body.
    pub async fn expect_text(&self, request_path: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Answer after `delay`.
    pub async fn expect_delayed(&self, request_path: &str, delay: Duration, body: Value) {
        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(json_response(200, body).set_delay(delay))
            .mount(&self.server)
            .await;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Verification
    // ─────────────────────────────────────────────────────────────────────────

    /// Every request received so far.
    pub async fn received_requests(&self) -> Vec<wiremock::Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Assert the total number of requests received.
    ///
    /// # Panics
    ///
    /// Panics if the count doesn't match.
    pub async fn assert_request_count(&self, expected: usize) {
        let received = self.received_requests().await;
        assert_eq!(
            received.len(),
            expected,
            "expected {expected} requests but received {}",
            received.len()
        );
    }

    /// Assert at least one request hit `request_path`.
    ///
    /// # Panics
    ///
    /// Panics if no matching request was found.
    pub async fn assert_received(&self, request_path: &str) {
        let received = self.received_requests().await;
        assert!(
            received.iter().any(|r| r.url.path() == request_path),
            "no request received to path '{request_path}'. Received: {:?}",
            received.iter().map(|r| r.url.path()).collect::<Vec<_>>()
        );
    }
}
