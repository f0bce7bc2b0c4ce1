//! In-process transport that answers from canned documents.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use fbg_core::{GraphTransport, HttpErrorInfo, Session, SessionBuilder, TransportError};
use parking_lot::Mutex;
use serde_json::Value;
use url::Url;

use crate::fixtures::{TEST_BASE_URL, TEST_TOKEN};

#[derive(Debug, Clone)]
enum Canned {
    Json(Value),
    Fail(TransportError),
}

#[derive(Debug, Default)]
struct Inner {
    responses: Mutex<HashMap<String, Canned>>,
    requests: Mutex<Vec<Url>>,
    calls: AtomicUsize,
    delay: Mutex<Option<Duration>>,
}

/// A [`GraphTransport`] keyed by URL path.
///
/// Clones share responses and counters, so a test can keep one handle while
/// the session owns another. Unknown paths fail with a 404 status.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Inner>,
}

impl MockTransport {
    /// Create a transport with no responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests for `path` with `body`.
    #[must_use]
    pub fn with_json(self, path: &str, body: Value) -> Self {
        self.set_json(path, body);
        self
    }

    /// Fail requests for `path` with a connection error.
    #[must_use]
    pub fn with_failure(self, path: &str, message: &str) -> Self {
        self.set_failure(
            path,
            TransportError::Http(HttpErrorInfo {
                message: message.to_string(),
                status_code: None,
                is_timeout: false,
                is_connect: true,
            }),
        );
        self
    }

    /// Delay every response.
    #[must_use]
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.inner.delay.lock() = Some(delay);
        self
    }

    /// Replace the response for `path`.
    pub fn set_json(&self, path: &str, body: Value) {
        self.inner
            .responses
            .lock()
            .insert(path.to_string(), Canned::Json(body));
    }

    /// Replace the response for `path` with a transport failure.
    pub fn set_failure(&self, path: &str, err: TransportError) {
        self.inner
            .responses
            .lock()
            .insert(path.to_string(), Canned::Fail(err));
    }

    /// Total requests served.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    /// Requests served for `path`.
    #[must_use]
    pub fn calls_to(&self, path: &str) -> usize {
        self.inner
            .requests
            .lock()
            .iter()
            .filter(|url| url.path() == path)
            .count()
    }

    /// Every URL requested, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<Url> {
        self.inner.requests.lock().clone()
    }

    /// A session over this transport with the test base URL and token.
    ///
    /// # Panics
    ///
    /// Panics if the fixture base URL is rejected, which would be a bug in
    /// the fixtures.
    #[must_use]
    pub fn session(&self) -> Session {
        SessionBuilder::with_shared_transport(Arc::new(self.clone()))
            .base_url(TEST_BASE_URL)
            .access_token(TEST_TOKEN)
            .build()
            .expect("fixture session configuration is valid")
    }
}

#[async_trait]
impl GraphTransport for MockTransport {
    async fn get_json(&self, url: &Url) -> Result<Value, TransportError> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.requests.lock().push(url.clone());

        let delay = *self.inner.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let canned = self.inner.responses.lock().get(url.path()).cloned();
        match canned {
            Some(Canned::Json(body)) => Ok(body),
            Some(Canned::Fail(err)) => Err(err),
            None => Err(TransportError::Status {
                status: 404,
                body: format!("no mock response for {}", url.path()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn answers_by_path_and_counts() {
        let transport = MockTransport::new().with_json("/me", json!({"id": "1"}));
        let url = Url::parse("https://graph.example.com/me?access_token=t").unwrap();

        assert_eq!(transport.get_json(&url).await.unwrap(), json!({"id": "1"}));
        assert_eq!(transport.call_count(), 1);
        assert_eq!(transport.calls_to("/me"), 1);
        assert_eq!(transport.requests()[0], url);
    }

    #[tokio::test]
    async fn unknown_paths_and_failures_are_errors() {
        let transport = MockTransport::new().with_failure("/down", "refused");
        let missing = Url::parse("https://graph.example.com/nope").unwrap();
        let down = Url::parse("https://graph.example.com/down").unwrap();

        assert!(matches!(
            transport.get_json(&missing).await,
            Err(TransportError::Status { status: 404, .. })
        ));
        assert!(matches!(
            transport.get_json(&down).await,
            Err(TransportError::Http(info)) if info.is_connect
        ));
    }

    #[test]
    fn session_uses_fixture_credentials() {
        let session = MockTransport::new().session();
        assert_eq!(session.access_token(), TEST_TOKEN);
        assert_eq!(session.base_url().as_str(), TEST_BASE_URL);
    }
}
