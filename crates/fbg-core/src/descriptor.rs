//! Per-field mapping metadata and the schema builder types use to declare it.

use std::any::type_name;
use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::coerce::{
    ConnectionField, DateTimeField, EntityArrayField, FieldStrategy, NestedEntityField,
    NullableDateTimeField, NullableScalarField, ScalarField, ScalarValue, Slot, StringField,
};
use crate::connection::Connection;
use crate::entity::{GraphEntity, Materialize};
use crate::error::{GraphError, GraphResult};
use crate::path::{PATH_SEPARATOR, validate_path};

/// Source path of the identifier field.
pub const ID_PATH: &str = "id";

/// How a field is read from JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Non-nullable number or boolean.
    ScalarValue,
    /// Optional number or boolean.
    NullableScalarValue,
    /// Optional text, coerced leniently.
    StringValue,
    /// Non-nullable timestamp.
    DateTimeValue,
    /// Optional timestamp; never fails.
    NullableDateTimeValue,
    /// A single embedded entity.
    NestedEntity,
    /// An array of embedded entities.
    EntityArray,
    /// A lazy paginated relation.
    Connection,
}

/// Immutable mapping metadata for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    /// JSON path, `/`-separated for nested lookups.
    pub source_path: &'static str,
    /// Coercion rule.
    pub kind: FieldKind,
    /// Leave the type default in place when the value is absent.
    pub default_if_missing: bool,
}

impl FieldDescriptor {
    /// Create a descriptor with `default_if_missing` off.
    #[must_use]
    pub const fn new(source_path: &'static str, kind: FieldKind) -> Self {
        Self {
            source_path,
            kind,
            default_if_missing: false,
        }
    }

    /// Set `default_if_missing`.
    #[must_use]
    pub const fn with_default_if_missing(mut self, default_if_missing: bool) -> Self {
        self.default_if_missing = default_if_missing;
        self
    }

    /// Whether this is the identifier field.
    #[must_use]
    pub fn is_identifier(&self) -> bool {
        self.source_path == ID_PATH
    }

    /// Materialization order: the identifier first, then by source path.
    ///
    /// Connections read the owning entity's id, so it must be populated first.
    #[must_use]
    pub fn materialization_order(&self, other: &Self) -> Ordering {
        match (self.is_identifier(), other.is_identifier()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.source_path.cmp(other.source_path),
        }
    }
}

/// Collects a type's field declarations.
///
/// Handed to [`GraphEntity::describe`]. Each method records a descriptor and
/// the coercion strategy for its kind; slots are plain accessor functions such
/// as `|user| &mut user.name`.
pub struct EntitySchema<T> {
    type_name: &'static str,
    fields: Vec<Box<dyn FieldStrategy<T>>>,
}

impl<T: GraphEntity> EntitySchema<T> {
    /// Run `T::describe` on a fresh schema seeded with the `id` field.
    pub(crate) fn extract() -> Self {
        let mut schema = Self {
            type_name: type_name::<T>(),
            fields: Vec::new(),
        };
        schema.string(ID_PATH, |entity| &mut entity.header_mut().id);
        T::describe(&mut schema);
        schema
    }

    /// Validate the declarations and return the strategies in materialization order.
    pub(crate) fn into_strategies(self) -> GraphResult<Vec<Box<dyn FieldStrategy<T>>>> {
        let type_name = self.type_name;
        let fail = |reason: String| GraphError::MapperBuild { type_name, reason };

        if T::TYPE_TAG.is_some_and(str::is_empty) {
            return Err(fail("declared type tag is empty".into()));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            let descriptor = field.descriptor();
            validate_path(descriptor.source_path).map_err(&fail)?;
            if !seen.insert(descriptor.source_path) {
                return Err(fail(format!(
                    "source path `{}` is declared more than once",
                    descriptor.source_path
                )));
            }
            if descriptor.kind == FieldKind::Connection
                && descriptor.source_path.contains(PATH_SEPARATOR)
            {
                return Err(fail(format!(
                    "connection `{}` must name a single relation",
                    descriptor.source_path
                )));
            }
        }

        let mut fields = self.fields;
        fields.sort_by(|a, b| a.descriptor().materialization_order(b.descriptor()));
        Ok(fields)
    }

    fn push(&mut self, strategy: impl FieldStrategy<T> + 'static) -> &mut Self {
        self.fields.push(Box::new(strategy));
        self
    }

    /// Non-nullable number or boolean; absent values keep the type default.
    pub fn scalar<S: ScalarValue>(&mut self, path: &'static str, slot: Slot<T, S>) -> &mut Self {
        self.push(ScalarField {
            descriptor: FieldDescriptor::new(path, FieldKind::ScalarValue),
            slot,
        })
    }

    /// Like [`scalar`](Self::scalar) but explicitly resets absent values to the default.
    pub fn scalar_or_default<S: ScalarValue>(
        &mut self,
        path: &'static str,
        slot: Slot<T, S>,
    ) -> &mut Self {
        self.push(ScalarField {
            descriptor: FieldDescriptor::new(path, FieldKind::ScalarValue)
                .with_default_if_missing(true),
            slot,
        })
    }

    /// Optional number or boolean.
    pub fn nullable<S: ScalarValue>(
        &mut self,
        path: &'static str,
        slot: Slot<T, Option<S>>,
    ) -> &mut Self {
        self.push(NullableScalarField {
            descriptor: FieldDescriptor::new(path, FieldKind::NullableScalarValue),
            slot,
        })
    }

    /// Optional text.
    pub fn string(&mut self, path: &'static str, slot: Slot<T, Option<String>>) -> &mut Self {
        self.push(StringField {
            descriptor: FieldDescriptor::new(path, FieldKind::StringValue),
            slot,
        })
    }

    /// Required timestamp: absent or unparsable values fail materialization.
    pub fn datetime(&mut self, path: &'static str, slot: Slot<T, DateTime<Utc>>) -> &mut Self {
        self.push(DateTimeField {
            descriptor: FieldDescriptor::new(path, FieldKind::DateTimeValue),
            slot,
        })
    }

    /// Timestamp that keeps its default when absent; present values must parse.
    pub fn datetime_or_default(
        &mut self,
        path: &'static str,
        slot: Slot<T, DateTime<Utc>>,
    ) -> &mut Self {
        self.push(DateTimeField {
            descriptor: FieldDescriptor::new(path, FieldKind::DateTimeValue)
                .with_default_if_missing(true),
            slot,
        })
    }

    /// Optional timestamp.
    pub fn nullable_datetime(
        &mut self,
        path: &'static str,
        slot: Slot<T, Option<DateTime<Utc>>>,
    ) -> &mut Self {
        self.push(NullableDateTimeField {
            descriptor: FieldDescriptor::new(path, FieldKind::NullableDateTimeValue),
            slot,
        })
    }

    /// A single embedded entity, materialized as a connection view.
    pub fn nested<E: GraphEntity>(
        &mut self,
        path: &'static str,
        slot: Slot<T, Option<E>>,
    ) -> &mut Self {
        self.push(NestedEntityField {
            descriptor: FieldDescriptor::new(path, FieldKind::NestedEntity),
            slot,
        })
    }

    /// An array of embedded entities, each materialized as a connection view.
    pub fn entity_array<E: GraphEntity>(
        &mut self,
        path: &'static str,
        slot: Slot<T, Option<Vec<E>>>,
    ) -> &mut Self {
        self.push(EntityArrayField {
            descriptor: FieldDescriptor::new(path, FieldKind::EntityArray),
            slot,
        })
    }

    /// A lazy relation named `relation`; always constructed.
    pub fn connection<E: Materialize>(
        &mut self,
        relation: &'static str,
        slot: Slot<T, Option<Connection<E>>>,
    ) -> &mut Self {
        self.push(ConnectionField {
            descriptor: FieldDescriptor::new(relation, FieldKind::Connection),
            slot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_sorts_first_then_by_path() {
        let mut fields = vec![
            FieldDescriptor::new("name", FieldKind::StringValue),
            FieldDescriptor::new("friends", FieldKind::Connection),
            FieldDescriptor::new("id", FieldKind::StringValue),
            FieldDescriptor::new("venue/city", FieldKind::StringValue),
            FieldDescriptor::new("about", FieldKind::StringValue),
        ];
        fields.sort_by(FieldDescriptor::materialization_order);
        let order: Vec<_> = fields.iter().map(|f| f.source_path).collect();
        assert_eq!(order, ["id", "about", "friends", "name", "venue/city"]);
    }

    #[test]
    fn default_flag_is_off_unless_requested() {
        let descriptor = FieldDescriptor::new("created_time", FieldKind::DateTimeValue);
        assert!(!descriptor.default_if_missing);
        assert!(descriptor.with_default_if_missing(true).default_if_missing);
        assert!(FieldDescriptor::new("id", FieldKind::StringValue).is_identifier());
    }
}
