//! Sessions: the shared handle every entity and connection is bound to.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::entity::GraphEntity;
use crate::error::{GraphError, GraphResult, ServerError};
use crate::mapper::materialize;
use crate::registry::{Polymorphic, type_tag_of};
use crate::transport::{ACCESS_TOKEN_PARAM, GraphTransport, redact_url};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://graph.facebook.com/";

const ASYNC_ERROR_CAPACITY: usize = 64;

/// A cheaply clonable handle over the API root, credential and transport.
///
/// Entities and connections hold clones of the same handle; dropping them never
/// tears the session down while the application still holds it.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    base_url: Url,
    access_token: String,
    transport: Arc<dyn GraphTransport>,
    async_errors: broadcast::Sender<GraphError>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.inner.base_url.as_str())
            .field("access_token", &"<redacted>")
            .field("transport", &self.inner.transport)
            .finish()
    }
}

/// Builder for [`Session`].
#[derive(Debug)]
pub struct SessionBuilder {
    transport: Arc<dyn GraphTransport>,
    base_url: String,
    access_token: Option<String>,
}

impl SessionBuilder {
    /// Create a builder around a transport.
    #[must_use]
    pub fn new(transport: impl GraphTransport + 'static) -> Self {
        Self::with_shared_transport(Arc::new(transport))
    }

    /// Create a builder around an already shared transport.
    #[must_use]
    pub fn with_shared_transport(transport: Arc<dyn GraphTransport>) -> Self {
        Self {
            transport,
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: None,
        }
    }

    /// Override the API root.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the access credential embedded in every request URL.
    #[must_use]
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Build the session.
    pub fn build(self) -> GraphResult<Session> {
        let access_token = self
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| GraphError::Config("an access token is required".into()))?;

        let mut raw = self.base_url;
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = Url::parse(&raw)
            .map_err(|err| GraphError::Config(format!("invalid base URL `{raw}`: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(GraphError::Config(format!(
                "base URL `{raw}` cannot carry path segments"
            )));
        }

        let (async_errors, _) = broadcast::channel(ASYNC_ERROR_CAPACITY);
        Ok(Session {
            inner: Arc::new(SessionInner {
                base_url,
                access_token,
                transport: self.transport,
                async_errors,
            }),
        })
    }
}

impl Session {
    /// Start building a session over `transport`.
    #[must_use]
    pub fn builder(transport: impl GraphTransport + 'static) -> SessionBuilder {
        SessionBuilder::new(transport)
    }

    /// The API root, always ending in `/`.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// The access credential.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.inner.access_token
    }

    /// Whether both handles refer to the same session.
    #[must_use]
    pub fn same_session(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// `{base}{source_id}/{relation}?access_token=...`
    pub fn connection_url(&self, source_id: &str, relation: &str) -> GraphResult<Url> {
        let mut url = self.with_segments(&[source_id, relation])?;
        url.query_pairs_mut()
            .append_pair(ACCESS_TOKEN_PARAM, self.access_token());
        Ok(url)
    }

    /// `{base}{id}?access_token=...`, plus `&metadata=1` when
    /// `include_connections` is set.
    pub fn entity_url(&self, id: &str, include_connections: bool) -> GraphResult<Url> {
        let mut url = self.with_segments(&[id])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair(ACCESS_TOKEN_PARAM, self.access_token());
            if include_connections {
                query.append_pair("metadata", "1");
            }
        }
        Ok(url)
    }

    /// `{base}?ids=a,b&access_token=...&metadata=1`
    pub fn ids_url(&self, ids: &[&str]) -> GraphResult<Url> {
        if ids.is_empty() {
            return Err(GraphError::InvalidUrl("at least one id is required".into()));
        }
        let mut url = self.inner.base_url.clone();
        url.query_pairs_mut()
            .append_pair("ids", &ids.join(","))
            .append_pair(ACCESS_TOKEN_PARAM, self.access_token())
            .append_pair("metadata", "1");
        Ok(url)
    }

    fn with_segments(&self, segments: &[&str]) -> GraphResult<Url> {
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(GraphError::InvalidUrl(format!(
                "empty path segment in {segments:?}"
            )));
        }
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| GraphError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Fetch one document. A body carrying an `error` object becomes
    /// [`GraphError::ServerReported`].
    #[instrument(skip(self, url), fields(url = %redact_url(url)))]
    pub async fn fetch(&self, url: &Url) -> GraphResult<Value> {
        let body = self.inner.transport.get_json(url).await?;
        if let Some(err) = ServerError::detect(&body) {
            warn!(error_type = %err.error_type, message = %err.message, "server reported an error");
            return Err(err.into());
        }
        debug!("fetched graph document");
        Ok(body)
    }

    /// Fetch an entity by id, with its connection metadata, and materialize it as `T`.
    pub async fn request<T: GraphEntity>(&self, id: &str) -> GraphResult<T> {
        self.request_with::<T>(id, true).await
    }

    /// Like [`request`](Self::request); `include_connections: false` omits
    /// the `metadata=1` query parameter.
    pub async fn request_with<T: GraphEntity>(
        &self,
        id: &str,
        include_connections: bool,
    ) -> GraphResult<T> {
        let url = self.entity_url(id, include_connections)?;
        let body = self.fetch(&url).await?;
        materialize::<T>(&body, self, false)
    }

    /// Fetch several entities of one type in a single request.
    ///
    /// Results follow the order of `ids`; ids absent from the response are skipped.
    pub async fn request_many<T: GraphEntity>(&self, ids: &[&str]) -> GraphResult<Vec<T>> {
        let url = self.ids_url(ids)?;
        let body = self.fetch(&url).await?;
        ids.iter()
            .filter_map(|id| body.get(*id).filter(|node| !node.is_null()))
            .map(|node| materialize::<T>(node, self, false))
            .collect()
    }

    /// Fetch an entity whose concrete type is chosen by the server's `type` tag.
    pub async fn request_any<E: Polymorphic>(&self, id: &str) -> GraphResult<E> {
        let url = self.entity_url(id, true)?;
        let body = self.fetch(&url).await?;
        let tag = type_tag_of(&body);
        if tag.is_empty() {
            return Err(GraphError::UnmatchedTypeDefinition(
                "retrieved object did not specify a type".into(),
            ));
        }
        E::materialize_by_tag(tag, &body, self, false)?.ok_or_else(|| {
            GraphError::UnmatchedTypeDefinition(format!("specified type '{tag}' was not found"))
        })
    }

    /// Subscribe to failures of detached (spawned) operations.
    #[must_use]
    pub fn subscribe_async_errors(&self) -> broadcast::Receiver<GraphError> {
        self.inner.async_errors.subscribe()
    }

    /// Route a failure from a detached operation to subscribers.
    pub(crate) fn report_async_error(&self, err: GraphError) {
        match self.inner.async_errors.send(err) {
            Ok(receivers) => debug!(receivers, "reported asynchronous graph error"),
            Err(broadcast::error::SendError(err)) => {
                warn!(error = %err, "asynchronous graph error dropped: no subscriber");
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;

    use super::*;
    use crate::error::TransportError;

    /// In-module transport: answers by URL path, counts calls.
    #[derive(Debug, Default)]
    pub(crate) struct StubTransport {
        pub(crate) bodies: Mutex<HashMap<String, Value>>,
        pub(crate) calls: AtomicUsize,
    }

    impl StubTransport {
        pub(crate) fn with(path: &str, body: Value) -> Self {
            let stub = Self::default();
            stub.bodies.lock().insert(path.to_string(), body);
            stub
        }
    }

    #[async_trait]
    impl GraphTransport for StubTransport {
        async fn get_json(&self, url: &Url) -> Result<Value, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.bodies
                .lock()
                .get(url.path())
                .cloned()
                .ok_or_else(|| TransportError::Status {
                    status: 404,
                    body: url.path().to_string(),
                })
        }
    }

    pub(crate) fn session() -> Session {
        stub_session(Arc::new(StubTransport::default()))
    }

    pub(crate) fn stub_session(stub: Arc<StubTransport>) -> Session {
        SessionBuilder::with_shared_transport(stub)
            .base_url("https://graph.example.com")
            .access_token("token-123")
            .build()
            .unwrap()
    }

    #[test]
    fn builder_requires_a_token() {
        let err = Session::builder(StubTransport::default()).build().unwrap_err();
        assert!(matches!(err, GraphError::Config(_)));
    }

    #[test]
    fn builder_rejects_bad_base_url() {
        let err = Session::builder(StubTransport::default())
            .base_url("not a url")
            .access_token("t")
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphError::Config(_)));
    }

    #[test]
    fn connection_url_embeds_source_relation_and_token() {
        let url = session().connection_url("123", "friends").unwrap();
        assert_eq!(
            url.as_str(),
            "https://graph.example.com/123/friends?access_token=token-123"
        );
    }

    #[test]
    fn entity_url_requests_metadata() {
        let url = session().entity_url("me", true).unwrap();
        assert_eq!(
            url.as_str(),
            "https://graph.example.com/me?access_token=token-123&metadata=1"
        );
        assert!(session().entity_url("", true).is_err());
    }

    #[test]
    fn entity_url_can_skip_metadata() {
        let url = session().entity_url("me", false).unwrap();
        assert_eq!(
            url.as_str(),
            "https://graph.example.com/me?access_token=token-123"
        );
    }

    #[test]
    fn debug_output_hides_the_token() {
        let shown = format!("{:?}", session());
        assert!(!shown.contains("token-123"));
    }

    #[tokio::test]
    async fn fetch_translates_error_bodies() {
        let session = Session::builder(StubTransport::with(
            "/me",
            json!({"error": {"type": "OAuthException", "message": "expired"}}),
        ))
        .base_url("https://graph.example.com")
        .access_token("t")
        .build()
        .unwrap();
        let url = session.entity_url("me", true).unwrap();
        let err = session.fetch(&url).await.unwrap_err();
        assert!(err.is_auth_error());
    }

    #[tokio::test]
    async fn async_errors_reach_subscribers() {
        let session = session();
        let mut rx = session.subscribe_async_errors();
        session.report_async_error(GraphError::InvalidUrl("x".into()));
        let received = rx.recv().await.unwrap();
        assert!(matches!(received, GraphError::InvalidUrl(_)));
    }
}
