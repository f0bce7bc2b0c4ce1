//! Polymorphic dispatch: server type tags to concrete entity factories.

use std::any::type_name;
use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use tracing::{debug, warn};

use crate::entity::GraphEntity;
use crate::error::{GraphError, GraphResult};
use crate::mapper::materialize;
use crate::session::Session;

/// Field carrying the server's type tag.
pub const TYPE_FIELD: &str = "type";

/// Builds an `E` from a node already known to carry a particular tag.
pub type TagFactory<E> = fn(&Value, &Session, bool) -> GraphResult<E>;

/// Immutable map from type tag to factory, for one union type `E`.
pub struct TypeTagRegistry<E> {
    factories: HashMap<&'static str, TagFactory<E>>,
}

impl<E> fmt::Debug for TypeTagRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeTagRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}

impl<E> TypeTagRegistry<E> {
    /// Whether `tag` has a factory.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.factories.contains_key(tag)
    }

    /// Registered tags, sorted.
    #[must_use]
    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags: Vec<_> = self.factories.keys().copied().collect();
        tags.sort_unstable();
        tags
    }

    /// Number of registered tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether no tag is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

}

impl<E: 'static> TypeTagRegistry<E> {
    /// Start registering types.
    #[must_use]
    pub fn builder() -> TypeTagRegistryBuilder<E> {
        TypeTagRegistryBuilder {
            factories: HashMap::new(),
        }
    }

    /// Materialize `json` as the type registered under `tag`.
    ///
    /// Returns `Ok(None)` for an empty tag and
    /// [`GraphError::UnmatchedTypeDefinition`] for an unknown one.
    pub fn materialize_by_tag(
        &self,
        tag: &str,
        json: &Value,
        session: &Session,
        is_connection_view: bool,
    ) -> GraphResult<Option<E>> {
        if tag.is_empty() {
            return Ok(None);
        }
        let factory = self.factories.get(tag).ok_or_else(|| {
            GraphError::UnmatchedTypeDefinition(format!("specified type '{tag}' was not found"))
        })?;
        debug!(tag, "dispatching on type tag");
        factory(json, session, is_connection_view).map(Some)
    }
}

/// Collects tagged types into a [`TypeTagRegistry`].
pub struct TypeTagRegistryBuilder<E> {
    factories: HashMap<&'static str, TagFactory<E>>,
}

impl<E: 'static> TypeTagRegistryBuilder<E> {
    /// Register `T` under its [`GraphEntity::TYPE_TAG`].
    ///
    /// Untagged types are skipped. A repeated tag replaces the earlier entry.
    #[must_use]
    pub fn register<T: GraphEntity + Into<E>>(mut self) -> Self {
        let Some(tag) = T::TYPE_TAG else {
            debug!(type_name = type_name::<T>(), "type declares no tag; not registered");
            return self;
        };
        let factory: TagFactory<E> = |json, session, is_connection_view| {
            materialize::<T>(json, session, is_connection_view).map(Into::into)
        };
        if self.factories.insert(tag, factory).is_some() {
            warn!(
                tag,
                type_name = type_name::<T>(),
                "type tag registered twice; keeping the later type"
            );
        }
        self
    }

    /// Freeze the registry.
    #[must_use]
    pub fn build(self) -> TypeTagRegistry<E> {
        TypeTagRegistry {
            factories: self.factories,
        }
    }
}

/// A union of entity types selected by server type tag.
pub trait Polymorphic: Sized + Send + Sync + 'static {
    /// The process-wide registry for this union.
    fn registry() -> &'static TypeTagRegistry<Self>;

    /// See [`TypeTagRegistry::materialize_by_tag`].
    fn materialize_by_tag(
        tag: &str,
        json: &Value,
        session: &Session,
        is_connection_view: bool,
    ) -> GraphResult<Option<Self>> {
        Self::registry().materialize_by_tag(tag, json, session, is_connection_view)
    }
}

/// The `type` field of a node, or `""` when absent or not a string.
#[must_use]
pub fn type_tag_of(json: &Value) -> &str {
    json.get(TYPE_FIELD)
        .and_then(Value::as_str)
        .unwrap_or_default()
}
