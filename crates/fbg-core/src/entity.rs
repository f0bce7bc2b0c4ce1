//! The entity contract shared by every materializable type.

use serde_json::Value;
use url::Url;

use crate::descriptor::EntitySchema;
use crate::error::{GraphError, GraphResult};
use crate::mapper::materialize;
use crate::session::Session;

/// State common to every entity: identity, origin and the owning session.
#[derive(Debug, Clone, Default)]
pub struct EntityHeader {
    /// Entity id, populated from the `id` field.
    pub id: Option<String>,
    is_connection_view: bool,
    session: Option<Session>,
}

impl EntityHeader {
    /// Whether the entity was materialized as part of a parent's relation and
    /// may therefore be partially populated.
    #[must_use]
    pub const fn is_connection_view(&self) -> bool {
        self.is_connection_view
    }

    /// The session the entity was materialized with.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Rebind the entity to another session.
    pub fn set_session(&mut self, session: Session) {
        self.session = Some(session);
    }

    pub(crate) fn bind(&mut self, session: &Session, is_connection_view: bool) {
        self.session = Some(session.clone());
        self.is_connection_view = is_connection_view;
    }

    /// `{base}{id}` for this entity.
    #[must_use]
    pub fn base_uri(&self) -> Option<Url> {
        let id = self.id.as_deref()?;
        self.session.as_ref()?.base_url().join(id).ok()
    }

    /// Re-request the complete entity by id, typically to upgrade a
    /// connection-view entity into its full form.
    pub async fn fetch_full<E: GraphEntity>(&self) -> GraphResult<E> {
        let id = self
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| GraphError::DetachedEntity("entity has no id".into()))?;
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| GraphError::DetachedEntity(format!("entity {id} has no session")))?;
        session.request::<E>(id).await
    }
}

impl PartialEq for EntityHeader {
    fn eq(&self, other: &Self) -> bool {
        let same_session = match (&self.session, &other.session) {
            (Some(a), Some(b)) => a.same_session(b),
            (None, None) => true,
            _ => false,
        };
        self.id == other.id && self.is_connection_view == other.is_connection_view && same_session
    }
}

/// A typed node of the graph with a declared field table.
///
/// Implementors describe their fields once in [`GraphEntity::describe`]; the
/// engine compiles that table into a cached mapper on first use. The `id`
/// field is declared implicitly.
pub trait GraphEntity: Default + Send + Sync + 'static {
    /// Server type tag used for polymorphic dispatch.
    const TYPE_TAG: Option<&'static str> = None;

    /// Shared entity state.
    fn header(&self) -> &EntityHeader;

    /// Mutable shared entity state.
    fn header_mut(&mut self) -> &mut EntityHeader;

    /// Declare the type's fields.
    fn describe(schema: &mut EntitySchema<Self>);

    /// Entity id.
    fn id(&self) -> Option<&str> {
        self.header().id.as_deref()
    }

    /// See [`EntityHeader::is_connection_view`].
    fn is_connection_view(&self) -> bool {
        self.header().is_connection_view()
    }

    /// See [`EntityHeader::session`].
    fn session(&self) -> Option<&Session> {
        self.header().session()
    }
}

/// Anything a connection can yield: concrete entities or a polymorphic union.
pub trait Materialize: Sized + Send + Sync + 'static {
    /// Build a value from a JSON node.
    fn materialize(json: &Value, session: &Session, is_connection_view: bool) -> GraphResult<Self>;
}

impl<T: GraphEntity> Materialize for T {
    fn materialize(json: &Value, session: &Session, is_connection_view: bool) -> GraphResult<Self> {
        materialize::<T>(json, session, is_connection_view)
    }
}

/// Implement [`GraphEntity::header`] and [`GraphEntity::header_mut`] over a
/// named [`EntityHeader`] field.
#[macro_export]
macro_rules! entity_header {
    ($field:ident) => {
        fn header(&self) -> &$crate::EntityHeader {
            &self.$field
        }

        fn header_mut(&mut self) -> &mut $crate::EntityHeader {
            &mut self.$field
        }
    };
}
