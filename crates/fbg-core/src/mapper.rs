//! Compiled mappers and the process-wide mapper cache.
//!
//! A mapper is the validated, ordered strategy table for one entity type. It
//! is built on the first materialization of that type and reused for the life
//! of the process.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, warn};

use crate::coerce::FieldStrategy;
use crate::descriptor::{EntitySchema, FieldDescriptor};
use crate::entity::GraphEntity;
use crate::error::{GraphError, GraphResult, ServerError};
use crate::session::Session;

type CachedMapper<T> = GraphResult<Arc<CompiledMapper<T>>>;

static MAPPERS: LazyLock<RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// The field strategies of one entity type, in materialization order.
pub struct CompiledMapper<T> {
    type_name: &'static str,
    fields: Vec<Box<dyn FieldStrategy<T>>>,
}

impl<T> fmt::Debug for CompiledMapper<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledMapper")
            .field("type_name", &self.type_name)
            .field(
                "fields",
                &self
                    .fields
                    .iter()
                    .map(|field| field.descriptor().source_path)
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<T: GraphEntity> CompiledMapper<T> {
    fn build() -> CachedMapper<T> {
        let schema = EntitySchema::<T>::extract();
        match schema.into_strategies() {
            Ok(fields) => {
                debug!(
                    type_name = type_name::<T>(),
                    fields = fields.len(),
                    "compiled entity mapper"
                );
                Ok(Arc::new(Self {
                    type_name: type_name::<T>(),
                    fields,
                }))
            }
            Err(err) => {
                warn!(type_name = type_name::<T>(), error = %err, "entity mapper rejected");
                Err(err)
            }
        }
    }

    /// Rust type name of `T`.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Descriptors in the order fields are applied.
    pub fn descriptors(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().map(|field| field.descriptor())
    }

    /// Build a `T` from `json`.
    ///
    /// An object root carrying `error` fails before any field is read. A null
    /// root yields a default instance that is still bound to `session`.
    pub fn materialize(
        &self,
        json: &Value,
        session: &Session,
        is_connection_view: bool,
    ) -> GraphResult<T> {
        if let Some(err) = ServerError::detect(json) {
            return Err(err.into());
        }
        let mut entity = T::default();
        if !json.is_null() {
            for field in &self.fields {
                field.apply(json, &mut entity, session)?;
            }
        }
        entity.header_mut().bind(session, is_connection_view);
        Ok(entity)
    }
}

/// Fetch the cached mapper for `T`, building it on first use.
///
/// Build failures are cached as well: a type with a broken field table fails
/// identically on every call.
pub fn mapper_for<T: GraphEntity>() -> GraphResult<Arc<CompiledMapper<T>>> {
    let key = TypeId::of::<T>();
    let cached = MAPPERS.read().get(&key).cloned();
    let entry = match cached {
        Some(entry) => entry,
        None => {
            let built: Arc<dyn Any + Send + Sync> = Arc::new(CompiledMapper::<T>::build());
            Arc::clone(MAPPERS.write().entry(key).or_insert(built))
        }
    };
    entry
        .downcast_ref::<CachedMapper<T>>()
        .cloned()
        .unwrap_or_else(|| {
            Err(GraphError::MapperBuild {
                type_name: type_name::<T>(),
                reason: "mapper cache entry has an unexpected type".into(),
            })
        })
}

/// Materialize `T` from a JSON node.
pub fn materialize<T: GraphEntity>(
    json: &Value,
    session: &Session,
    is_connection_view: bool,
) -> GraphResult<T> {
    mapper_for::<T>()?.materialize(json, session, is_connection_view)
}

/// The descriptor table of `T`, in materialization order.
pub fn field_descriptors<T: GraphEntity>() -> GraphResult<Vec<FieldDescriptor>> {
    Ok(mapper_for::<T>()?.descriptors().copied().collect())
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use serde_json::json;

    use super::*;
    use crate::descriptor::FieldKind;
    use crate::entity::EntityHeader;
    use crate::session::tests::session;

    #[derive(Debug, Default, PartialEq)]
    struct Venue {
        header: EntityHeader,
        city: Option<String>,
        latitude: Option<f32>,
        capacity: u32,
        opened: DateTime<Utc>,
    }

    impl GraphEntity for Venue {
        crate::entity_header!(header);

        fn describe(schema: &mut EntitySchema<Self>) {
            schema
                .string("location/city", |v| &mut v.city)
                .nullable("location/latitude", |v| &mut v.latitude)
                .scalar_or_default("capacity", |v| &mut v.capacity)
                .datetime_or_default("opened", |v| &mut v.opened);
        }
    }

    #[derive(Debug, Default)]
    struct Twice {
        header: EntityHeader,
        name: Option<String>,
    }

    impl GraphEntity for Twice {
        crate::entity_header!(header);

        fn describe(schema: &mut EntitySchema<Self>) {
            schema
                .string("name", |t| &mut t.name)
                .string("name", |t| &mut t.name);
        }
    }

    #[test]
    fn descriptors_put_the_identifier_first() {
        let descriptors = field_descriptors::<Venue>().unwrap();
        let paths: Vec<_> = descriptors.iter().map(|d| d.source_path).collect();
        assert_eq!(
            paths,
            ["id", "capacity", "location/city", "location/latitude", "opened"]
        );
        assert_eq!(descriptors[0].kind, FieldKind::StringValue);
        assert!(descriptors[1].default_if_missing);
    }

    #[test]
    fn mapper_is_built_once_per_type() {
        let first = mapper_for::<Venue>().unwrap();
        let second = mapper_for::<Venue>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn malformed_table_fails_on_every_use() {
        for _ in 0..2 {
            let err = materialize::<Twice>(&json!({"name": "x"}), &session(), false).unwrap_err();
            assert!(matches!(err, GraphError::MapperBuild { .. }));
            assert!(err.to_string().contains("more than once"));
        }
    }

    #[test]
    fn nested_paths_and_defaults() {
        let session = session();
        let venue: Venue = materialize(
            &json!({"id": "v1", "location": {"city": "Oslo", "latitude": 59.5}}),
            &session,
            false,
        )
        .unwrap();
        assert_eq!(venue.id(), Some("v1"));
        assert_eq!(venue.city.as_deref(), Some("Oslo"));
        assert_eq!(venue.latitude, Some(59.5));
        assert_eq!(venue.capacity, 0);
        assert_eq!(venue.opened, DateTime::<Utc>::default());
        assert!(!venue.is_connection_view());
        assert!(venue.session().unwrap().same_session(&session));
    }

    #[test]
    fn null_root_yields_a_bound_default() {
        let venue: Venue = materialize(&Value::Null, &session(), true).unwrap();
        assert_eq!(venue.id(), None);
        assert!(venue.is_connection_view());
        assert!(venue.session().is_some());
    }

    #[test]
    fn error_root_is_reported_before_fields() {
        let err = materialize::<Venue>(
            &json!({"error": {"type": "GraphMethodException", "message": "Unsupported get request."}}),
            &session(),
            false,
        )
        .unwrap_err();
        assert_eq!(
            err.server_error().map(|e| e.message.as_str()),
            Some("Unsupported get request.")
        );
    }

    #[test]
    fn scalar_mismatch_names_the_path() {
        let err = materialize::<Venue>(&json!({"capacity": "lots"}), &session(), false).unwrap_err();
        assert_eq!(err.field_path(), Some("capacity"));
    }
}
