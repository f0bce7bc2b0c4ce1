//! Entities whose concrete type is chosen by the server's `type` tag.

use std::sync::LazyLock;

use fbg_core::{
    EntityHeader, EntitySchema, GraphEntity, GraphResult, Materialize, Polymorphic, Session,
    TypeTagRegistry, materialize, type_tag_of,
};
use serde_json::Value;
use tracing::debug;

use crate::content::{Link, Post, Status};
use crate::media::{Album, Photo, Video};
use crate::social::{Group, Page};
use crate::user::User;

/// An entity with no declared type: only the identity is kept.
#[derive(Debug, Default, PartialEq)]
pub struct BasicEntity {
    header: EntityHeader,
    pub name: Option<String>,
}

impl GraphEntity for BasicEntity {
    fbg_core::entity_header!(header);

    fn describe(schema: &mut EntitySchema<Self>) {
        schema.string("name", |e| &mut e.name);
    }
}

/// Any tagged entity, or [`BasicEntity`] when the node carries no tag.
#[derive(Debug, PartialEq)]
pub enum AnyEntity {
    User(User),
    Page(Page),
    Group(Group),
    Photo(Photo),
    Album(Album),
    Video(Video),
    Post(Post),
    Status(Status),
    Link(Link),
    Basic(BasicEntity),
}

macro_rules! any_entity_variants {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for AnyEntity {
                fn from(entity: $variant) -> Self {
                    Self::$variant(entity)
                }
            }
        )*

        impl AnyEntity {
            /// Shared entity state of the wrapped entity.
            #[must_use]
            pub fn header(&self) -> &EntityHeader {
                match self {
                    $(Self::$variant(entity) => entity.header(),)*
                    Self::Basic(entity) => entity.header(),
                }
            }

            /// Type tag of the wrapped entity; `None` for [`AnyEntity::Basic`].
            #[must_use]
            pub const fn type_tag(&self) -> Option<&'static str> {
                match self {
                    $(Self::$variant(_) => <$variant as GraphEntity>::TYPE_TAG,)*
                    Self::Basic(_) => None,
                }
            }
        }
    };
}

any_entity_variants!(User, Page, Group, Photo, Album, Video, Post, Status, Link);

impl From<BasicEntity> for AnyEntity {
    fn from(entity: BasicEntity) -> Self {
        Self::Basic(entity)
    }
}

impl AnyEntity {
    /// Entity id.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.header().id.as_deref()
    }

    /// The wrapped user, if this is one.
    #[must_use]
    pub const fn as_user(&self) -> Option<&User> {
        match self {
            Self::User(user) => Some(user),
            _ => None,
        }
    }

    /// The wrapped photo, if this is one.
    #[must_use]
    pub const fn as_photo(&self) -> Option<&Photo> {
        match self {
            Self::Photo(photo) => Some(photo),
            _ => None,
        }
    }

    /// The wrapped post, if this is one.
    #[must_use]
    pub const fn as_post(&self) -> Option<&Post> {
        match self {
            Self::Post(post) => Some(post),
            _ => None,
        }
    }
}

static REGISTRY: LazyLock<TypeTagRegistry<AnyEntity>> = LazyLock::new(|| {
    let registry = TypeTagRegistry::builder()
        .register::<User>()
        .register::<Page>()
        .register::<Group>()
        .register::<Photo>()
        .register::<Album>()
        .register::<Video>()
        .register::<Post>()
        .register::<Status>()
        .register::<Link>()
        .register::<BasicEntity>()
        .build();
    debug!(tags = ?registry.tags(), "entity type registry built");
    registry
});

impl Polymorphic for AnyEntity {
    fn registry() -> &'static TypeTagRegistry<Self> {
        &REGISTRY
    }
}

impl Materialize for AnyEntity {
    fn materialize(json: &Value, session: &Session, is_connection_view: bool) -> GraphResult<Self> {
        match Self::materialize_by_tag(type_tag_of(json), json, session, is_connection_view)? {
            Some(entity) => Ok(entity),
            None => materialize::<BasicEntity>(json, session, is_connection_view).map(Self::Basic),
        }
    }
}

/// Materialize `json` as the entity type registered for `tag`.
///
/// Empty tags yield `Ok(None)`; unknown tags fail with
/// [`GraphError::UnmatchedTypeDefinition`](fbg_core::GraphError::UnmatchedTypeDefinition).
pub fn materialize_by_tag(
    tag: &str,
    json: &Value,
    session: &Session,
    is_connection_view: bool,
) -> GraphResult<Option<AnyEntity>> {
    AnyEntity::materialize_by_tag(tag, json, session, is_connection_view)
}
