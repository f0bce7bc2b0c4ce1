//! Lazy, paginated relations between entities.
//!
//! A [`Connection`] starts either `Unloaded`, holding the URL of its first
//! page, or `Loaded` with a page that arrived embedded in its parent. The
//! first operation that needs data fetches the page exactly once; every later
//! enumeration re-materializes elements from that snapshot without touching
//! the network.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, instrument};
use url::Url;

use crate::entity::Materialize;
use crate::error::{GraphError, GraphResult};
use crate::path::PATH_SEPARATOR;
use crate::session::Session;
use crate::transport::redact_url;

/// Links to neighbouring pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paging {
    /// URL of the following page.
    pub next: Option<String>,
    /// URL of the preceding page.
    pub previous: Option<String>,
}

/// One fetched page: `{"data": [...], "paging": {"next", "previous"}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    snapshot: Value,
    paging: Option<Paging>,
}

impl Page {
    /// Wrap a page document.
    #[must_use]
    pub fn from_json(snapshot: Value) -> Self {
        let paging = snapshot
            .get("paging")
            .filter(|node| node.is_object())
            .map(|node| Paging {
                next: link(node, "next"),
                previous: link(node, "previous"),
            });
        Self { snapshot, paging }
    }

    /// Element nodes; empty when the page has no `data` array.
    #[must_use]
    pub fn data(&self) -> &[Value] {
        self.snapshot
            .get("data")
            .and_then(Value::as_array)
            .map_or(&[][..], Vec::as_slice)
    }

    /// The paging block, if the page has one.
    #[must_use]
    pub const fn paging(&self) -> Option<&Paging> {
        self.paging.as_ref()
    }

    /// The raw page document.
    #[must_use]
    pub const fn snapshot(&self) -> &Value {
        &self.snapshot
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data().len()
    }

    /// Whether the page has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data().is_empty()
    }
}

fn link(paging: &Value, key: &str) -> Option<String> {
    paging
        .get(key)
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

/// Load state of a connection.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionState {
    /// Not fetched yet.
    Unloaded {
        /// URL the page will be fetched from.
        url: Url,
    },
    /// Page available; terminal.
    Loaded {
        /// URL the page came from (or would have, if it was embedded).
        url: Url,
        /// The page snapshot.
        page: Arc<Page>,
    },
}

impl ConnectionState {
    /// The URL bound to this state.
    #[must_use]
    pub const fn url(&self) -> &Url {
        match self {
            Self::Unloaded { url } | Self::Loaded { url, .. } => url,
        }
    }
}

struct Shared {
    state: RwLock<ConnectionState>,
    load_gate: tokio::sync::Mutex<()>,
}

/// A named relation from a source entity to a page of `T`.
///
/// Clones share load state: loading through one clone loads them all.
/// Concurrent loads of the same connection perform a single fetch.
pub struct Connection<T> {
    source_id: String,
    relation: String,
    session: Session,
    shared: Arc<Shared>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Connection<T> {
    fn clone(&self) -> Self {
        Self {
            source_id: self.source_id.clone(),
            relation: self.relation.clone(),
            session: self.session.clone(),
            shared: Arc::clone(&self.shared),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Connection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("Connection")
            .field("source_id", &self.source_id)
            .field("relation", &self.relation)
            .field("loaded", &matches!(state, ConnectionState::Loaded { .. }))
            .field("url", &redact_url(state.url()))
            .finish_non_exhaustive()
    }
}

impl<T> PartialEq for Connection<T> {
    fn eq(&self, other: &Self) -> bool {
        self.source_id == other.source_id
            && self.relation == other.relation
            && self.session.same_session(&other.session)
            && self.state() == other.state()
    }
}

impl<T> Connection<T> {
    /// An unloaded connection for `relation` of `source_id`.
    pub fn new(
        source_id: impl Into<String>,
        relation: impl Into<String>,
        session: Session,
    ) -> GraphResult<Self> {
        let (source_id, relation) = validate(source_id.into(), relation.into())?;
        let url = session.connection_url(&source_id, &relation)?;
        Ok(Self::with_state(
            source_id,
            relation,
            session,
            ConnectionState::Unloaded { url },
        ))
    }

    /// A connection whose first page is already known.
    pub fn preloaded(
        source_id: impl Into<String>,
        relation: impl Into<String>,
        page: Value,
        session: Session,
    ) -> GraphResult<Self> {
        let (source_id, relation) = validate(source_id.into(), relation.into())?;
        let url = session.connection_url(&source_id, &relation)?;
        let page = Arc::new(Page::from_json(page));
        Ok(Self::with_state(
            source_id,
            relation,
            session,
            ConnectionState::Loaded { url, page },
        ))
    }

    fn with_state(
        source_id: String,
        relation: String,
        session: Session,
        state: ConnectionState,
    ) -> Self {
        Self {
            source_id,
            relation,
            session,
            shared: Arc::new(Shared {
                state: RwLock::new(state),
                load_gate: tokio::sync::Mutex::new(()),
            }),
            _marker: PhantomData,
        }
    }

    /// Id of the entity the relation starts from.
    #[must_use]
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Relation name, e.g. `friends`.
    #[must_use]
    pub fn relation(&self) -> &str {
        &self.relation
    }

    /// The owning session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.shared.state.read().clone()
    }

    /// Whether the page has been loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(*self.shared.state.read(), ConnectionState::Loaded { .. })
    }

    /// The URL this connection fetches (or fetched) its page from.
    #[must_use]
    pub fn url(&self) -> Url {
        self.shared.state.read().url().clone()
    }

    /// The loaded page, without loading.
    #[must_use]
    pub fn page(&self) -> Option<Arc<Page>> {
        match &*self.shared.state.read() {
            ConnectionState::Loaded { page, .. } => Some(Arc::clone(page)),
            ConnectionState::Unloaded { .. } => None,
        }
    }

    /// Load the page if needed. Performs at most one fetch per connection; a
    /// failed fetch leaves the connection unloaded.
    #[instrument(skip(self), fields(source_id = %self.source_id, relation = %self.relation))]
    async fn ensure_loaded(&self) -> GraphResult<Arc<Page>> {
        if let Some(page) = self.page() {
            return Ok(page);
        }
        let _gate = self.shared.load_gate.lock().await;
        let url = match self.state() {
            ConnectionState::Loaded { page, .. } => return Ok(page),
            ConnectionState::Unloaded { url } => url,
        };
        debug!(url = %redact_url(&url), "loading connection page");
        let body = self.session.fetch(&url).await?;
        let page = Arc::new(Page::from_json(body));
        debug!(elements = page.len(), "connection loaded");
        *self.shared.state.write() = ConnectionState::Loaded {
            url,
            page: Arc::clone(&page),
        };
        Ok(page)
    }

    /// Load the page, reporting failures to the caller.
    pub async fn load(&self) -> GraphResult<()> {
        self.ensure_loaded().await.map(|_| ())
    }

    /// Load in a spawned task. Failures go to
    /// [`Session::subscribe_async_errors`].
    pub fn load_async(&self) -> JoinHandle<()>
    where
        T: 'static,
    {
        self.load_async_then(|| {})
    }

    /// Load in a spawned task and run `callback` once loaded. On failure the
    /// callback is not run and the error goes to the session channel.
    pub fn load_async_then<F>(&self, callback: F) -> JoinHandle<()>
    where
        T: 'static,
        F: FnOnce() + Send + 'static,
    {
        let connection = self.clone();
        tokio::spawn(async move {
            match connection.ensure_loaded().await {
                Ok(_) => callback(),
                Err(err) => connection.session.report_async_error(err),
            }
        })
    }

    /// Whether the loaded page carries a paging block. Loads if needed.
    pub async fn supports_paging(&self) -> GraphResult<bool> {
        Ok(self.ensure_loaded().await?.paging().is_some())
    }

    /// The following page, as a new unloaded connection. Loads if needed.
    pub async fn next_page(&self) -> GraphResult<Option<Self>> {
        let page = self.ensure_loaded().await?;
        self.sibling(page.paging().and_then(|paging| paging.next.as_deref()))
    }

    /// The preceding page, as a new unloaded connection. Loads if needed.
    pub async fn previous_page(&self) -> GraphResult<Option<Self>> {
        let page = self.ensure_loaded().await?;
        self.sibling(page.paging().and_then(|paging| paging.previous.as_deref()))
    }

    fn sibling(&self, link: Option<&str>) -> GraphResult<Option<Self>> {
        let Some(link) = link else {
            return Ok(None);
        };
        let url = Url::parse(link)
            .map_err(|err| GraphError::InvalidUrl(format!("paging link: {err}")))?;
        Ok(Some(Self::with_state(
            self.source_id.clone(),
            self.relation.clone(),
            self.session.clone(),
            ConnectionState::Unloaded { url },
        )))
    }
}

impl<T: Materialize> Connection<T> {
    /// Enumerate the page, loading it first if needed.
    ///
    /// Each call re-materializes elements from the same snapshot.
    pub async fn iter(&self) -> GraphResult<ConnectionIter<T>> {
        let page = self.ensure_loaded().await?;
        Ok(ConnectionIter::new(page, self.session.clone()))
    }

    /// Enumerate the page if it is already loaded.
    #[must_use]
    pub fn loaded_iter(&self) -> Option<ConnectionIter<T>> {
        self.page()
            .map(|page| ConnectionIter::new(page, self.session.clone()))
    }

    /// Load if needed and materialize every element.
    pub async fn entities(&self) -> GraphResult<Vec<T>> {
        self.iter().await?.collect()
    }

    /// Materialize every element in a spawned task and hand them to
    /// `callback`. On failure the callback is not run and the error goes to
    /// the session channel.
    pub fn entities_async<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Vec<T>) + Send + 'static,
    {
        let connection = self.clone();
        tokio::spawn(async move {
            match connection.entities().await {
                Ok(entities) => callback(entities),
                Err(err) => connection.session.report_async_error(err),
            }
        })
    }
}

fn validate(source_id: String, relation: String) -> GraphResult<(String, String)> {
    if source_id.is_empty() {
        return Err(GraphError::MissingSourceId { relation });
    }
    if relation.is_empty() || relation.contains(PATH_SEPARATOR) {
        return Err(GraphError::InvalidUrl(format!(
            "relation `{relation}` must be a single path segment"
        )));
    }
    Ok((source_id, relation))
}

/// Materializes the elements of one page as connection-view entities.
pub struct ConnectionIter<T> {
    page: Arc<Page>,
    session: Session,
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ConnectionIter<T> {
    const fn new(page: Arc<Page>, session: Session) -> Self {
        Self {
            page,
            session,
            index: 0,
            _marker: PhantomData,
        }
    }
}

impl<T: Materialize> Iterator for ConnectionIter<T> {
    type Item = GraphResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.page.data().get(self.index)?;
        self.index += 1;
        Some(T::materialize(node, &self.session, true))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.page.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<T: Materialize> ExactSizeIterator for ConnectionIter<T> {}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use serde_json::json;

    use super::*;
    use crate::descriptor::EntitySchema;
    use crate::entity::{EntityHeader, GraphEntity};
    use crate::session::tests::{StubTransport, session, stub_session};

    #[derive(Debug, Default, PartialEq)]
    struct Member {
        header: EntityHeader,
        name: Option<String>,
    }

    impl GraphEntity for Member {
        crate::entity_header!(header);

        fn describe(schema: &mut EntitySchema<Self>) {
            schema.string("name", |m| &mut m.name);
        }
    }

    fn members_page() -> Value {
        json!({
            "data": [{"id": "1", "name": "Bob"}, {"id": "2", "name": "Eve"}],
            "paging": {"next": "https://graph.example.com/42/members?access_token=token-123&offset=2"}
        })
    }

    #[test]
    fn new_connection_is_unloaded_with_a_resolved_url() {
        let connection = Connection::<Member>::new("42", "members", session()).unwrap();
        assert!(!connection.is_loaded());
        assert!(connection.page().is_none());
        assert!(connection.loaded_iter().is_none());
        assert_eq!(
            connection.url().as_str(),
            "https://graph.example.com/42/members?access_token=token-123"
        );
    }

    #[test]
    fn construction_validates_source_and_relation() {
        let err = Connection::<Member>::new("", "members", session()).unwrap_err();
        assert!(matches!(err, GraphError::MissingSourceId { .. }));
        let err = Connection::<Member>::new("42", "a/b", session()).unwrap_err();
        assert!(matches!(err, GraphError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn loads_once_across_enumerations() {
        let stub = Arc::new(StubTransport::with("/42/members", members_page()));
        let connection =
            Connection::<Member>::new("42", "members", stub_session(Arc::clone(&stub))).unwrap();

        for _ in 0..3 {
            let names: Vec<_> = connection
                .iter()
                .await
                .unwrap()
                .map(|m| m.unwrap().name.unwrap())
                .collect();
            assert_eq!(names, ["Bob", "Eve"]);
        }
        assert!(connection.is_loaded());
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn elements_are_connection_views() {
        let connection =
            Connection::<Member>::preloaded("42", "members", members_page(), session()).unwrap();
        let members = connection.entities().await.unwrap();
        assert_eq!(members.len(), 2);
        assert!(members.iter().all(GraphEntity::is_connection_view));
        assert_eq!(connection.loaded_iter().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn paging_links_become_unloaded_siblings() {
        let connection =
            Connection::<Member>::preloaded("42", "members", members_page(), session()).unwrap();
        assert!(connection.supports_paging().await.unwrap());

        let next = connection.next_page().await.unwrap().unwrap();
        assert!(!next.is_loaded());
        assert_eq!(next.source_id(), "42");
        assert_eq!(next.relation(), "members");
        assert!(next.url().as_str().ends_with("offset=2"));
        assert!(connection.previous_page().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_paging_block_yields_nothing() {
        let connection =
            Connection::<Member>::preloaded("42", "members", json!({"data": []}), session())
                .unwrap();
        assert!(!connection.supports_paging().await.unwrap());
        assert!(connection.next_page().await.unwrap().is_none());
        assert!(connection.previous_page().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unparsable_paging_link_is_an_error() {
        let page = json!({"data": [], "paging": {"next": "not a url"}});
        let connection = Connection::<Member>::preloaded("42", "members", page, session()).unwrap();
        let err = connection.next_page().await.unwrap_err();
        assert!(matches!(err, GraphError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn failed_load_stays_unloaded_and_can_retry() {
        let stub = Arc::new(StubTransport::default());
        let connection =
            Connection::<Member>::new("42", "members", stub_session(Arc::clone(&stub))).unwrap();

        assert!(connection.load().await.is_err());
        assert!(!connection.is_loaded());

        stub.bodies
            .lock()
            .insert("/42/members".to_string(), members_page());
        connection.load().await.unwrap();
        assert!(connection.is_loaded());
        assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn page_without_data_is_empty() {
        let page = Page::from_json(json!({"paging": {"next": ""}}));
        assert!(page.is_empty());
        assert_eq!(page.paging(), Some(&Paging::default()));
    }
}
