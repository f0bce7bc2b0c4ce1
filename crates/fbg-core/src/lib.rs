//! Entity materialization and lazy-connection engine for graph-structured APIs.
//!
//! Entity types declare a field table once ([`GraphEntity::describe`]); the
//! engine compiles it into a cached [`CompiledMapper`] and uses it to turn JSON
//! documents into typed entities. Relations are exposed as [`Connection`]s that
//! fetch their first page at most once, and unions of entity types are selected
//! by server type tag through a [`TypeTagRegistry`].

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod coerce;
pub mod connection;
pub mod descriptor;
pub mod entity;
pub mod error;
pub mod mapper;
pub mod path;
pub mod registry;
pub mod session;
pub mod transport;

pub use coerce::{ScalarValue, Slot, parse_graph_datetime};
pub use connection::{Connection, ConnectionIter, ConnectionState, Page, Paging};
pub use descriptor::{EntitySchema, FieldDescriptor, FieldKind, ID_PATH};
pub use entity::{EntityHeader, GraphEntity, Materialize};
pub use error::{
    GraphError, GraphResult, HttpErrorInfo, ServerError, ServerErrorKind, TransportError,
};
pub use mapper::{CompiledMapper, field_descriptors, mapper_for, materialize};
pub use path::{PATH_SEPARATOR, resolve_path};
pub use registry::{
    Polymorphic, TYPE_FIELD, TagFactory, TypeTagRegistry, TypeTagRegistryBuilder, type_tag_of,
};
pub use session::{DEFAULT_BASE_URL, Session, SessionBuilder};
pub use transport::{ACCESS_TOKEN_PARAM, GraphTransport, redact_url};
