//! Field coercion strategies: one per [`FieldKind`](crate::FieldKind), each reading a single
//! field from a JSON node into its slot.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::warn;

use crate::connection::Connection;
use crate::descriptor::FieldDescriptor;
use crate::entity::{GraphEntity, Materialize};
use crate::error::{GraphError, GraphResult, describe_node};
use crate::mapper::materialize;
use crate::path::resolve_path;
use crate::session::Session;

/// Accessor returning the storage for one field of `T`.
pub type Slot<T, V> = fn(&mut T) -> &mut V;

/// Reads one field of `T` from a JSON document.
pub(crate) trait FieldStrategy<T>: Send + Sync {
    fn descriptor(&self) -> &FieldDescriptor;

    fn apply(&self, root: &Value, target: &mut T, session: &Session) -> GraphResult<()>;
}

/// Numbers and booleans a scalar field can hold.
pub trait ScalarValue: Default + Send + Sync + 'static {
    /// Name used in type-mismatch errors.
    const TYPE_NAME: &'static str;

    /// Convert a JSON node, or `None` if its shape does not fit.
    fn coerce(node: &Value) -> Option<Self>;
}

macro_rules! integer_scalar {
    ($($ty:ty),* $(,)?) => {$(
        impl ScalarValue for $ty {
            const TYPE_NAME: &'static str = stringify!($ty);

            fn coerce(node: &Value) -> Option<Self> {
                match node {
                    Value::Number(n) => {
                        if let Some(i) = n.as_i64() {
                            Self::try_from(i).ok()
                        } else if let Some(u) = n.as_u64() {
                            Self::try_from(u).ok()
                        } else {
                            n.as_f64()
                                .filter(|f| f.fract() == 0.0)
                                .and_then(|f| format!("{f:.0}").parse().ok())
                        }
                    }
                    Value::String(s) => s.trim().parse().ok(),
                    _ => None,
                }
            }
        }
    )*};
}

integer_scalar!(i8, i16, i32, i64, u8, u16, u32, u64);

macro_rules! float_scalar {
    ($($ty:ty),* $(,)?) => {$(
        impl ScalarValue for $ty {
            const TYPE_NAME: &'static str = stringify!($ty);

            #[allow(clippy::cast_possible_truncation, clippy::unnecessary_cast)]
            fn coerce(node: &Value) -> Option<Self> {
                match node {
                    Value::Number(n) => n.as_f64().map(|f| f as $ty),
                    Value::String(s) => s.trim().parse().ok(),
                    _ => None,
                }
            }
        }
    )*};
}

float_scalar!(f32, f64);

impl ScalarValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn coerce(node: &Value) -> Option<Self> {
        match node {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => match n.as_i64() {
                Some(0) => Some(false),
                Some(1) => Some(true),
                _ => None,
            },
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

fn mismatch(descriptor: &FieldDescriptor, expected: &'static str, node: &Value) -> GraphError {
    GraphError::TypeMismatch {
        path: descriptor.source_path.to_string(),
        expected,
        found: describe_node(node),
    }
}

/// Parse the timestamp formats the API emits.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS±HHMM`, a naive date-time (taken as
/// UTC) and a bare date (midnight UTC).
#[must_use]
pub fn parse_graph_datetime(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Read a timestamp node: text in one of the accepted formats, or integral
/// Unix seconds.
fn parse_datetime_node(node: &Value) -> Option<DateTime<Utc>> {
    match node {
        Value::String(s) => parse_graph_datetime(s),
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    }
}

fn render_node(node: &Value) -> String {
    match node {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) struct ScalarField<T, S> {
    pub(crate) descriptor: FieldDescriptor,
    pub(crate) slot: Slot<T, S>,
}

impl<T, S: ScalarValue> FieldStrategy<T> for ScalarField<T, S> {
    fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    fn apply(&self, root: &Value, target: &mut T, _session: &Session) -> GraphResult<()> {
        match resolve_path(root, self.descriptor.source_path) {
            None => {
                if self.descriptor.default_if_missing {
                    *(self.slot)(target) = S::default();
                }
            }
            Some(node) => {
                let value = S::coerce(node)
                    .ok_or_else(|| mismatch(&self.descriptor, S::TYPE_NAME, node))?;
                *(self.slot)(target) = value;
            }
        }
        Ok(())
    }
}

pub(crate) struct NullableScalarField<T, S> {
    pub(crate) descriptor: FieldDescriptor,
    pub(crate) slot: Slot<T, Option<S>>,
}

impl<T, S: ScalarValue> FieldStrategy<T> for NullableScalarField<T, S> {
    fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    fn apply(&self, root: &Value, target: &mut T, _session: &Session) -> GraphResult<()> {
        if let Some(node) = resolve_path(root, self.descriptor.source_path) {
            let value =
                S::coerce(node).ok_or_else(|| mismatch(&self.descriptor, S::TYPE_NAME, node))?;
            *(self.slot)(target) = Some(value);
        }
        Ok(())
    }
}

pub(crate) struct StringField<T> {
    pub(crate) descriptor: FieldDescriptor,
    pub(crate) slot: Slot<T, Option<String>>,
}

impl<T> FieldStrategy<T> for StringField<T> {
    fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    fn apply(&self, root: &Value, target: &mut T, _session: &Session) -> GraphResult<()> {
        let Some(node) = resolve_path(root, self.descriptor.source_path) else {
            return Ok(());
        };
        let text = match node {
            Value::String(s) => Some(s.clone()),
            Value::Number(_) | Value::Bool(_) => Some(node.to_string()),
            Value::Array(_) | Value::Object(_) | Value::Null => {
                warn!(
                    path = self.descriptor.source_path,
                    found = %describe_node(node),
                    "string field holds a compound value; leaving it unset"
                );
                None
            }
        };
        if text.is_some() {
            *(self.slot)(target) = text;
        }
        Ok(())
    }
}

pub(crate) struct DateTimeField<T> {
    pub(crate) descriptor: FieldDescriptor,
    pub(crate) slot: Slot<T, DateTime<Utc>>,
}

impl<T> FieldStrategy<T> for DateTimeField<T> {
    fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    fn apply(&self, root: &Value, target: &mut T, _session: &Session) -> GraphResult<()> {
        let node = resolve_path(root, self.descriptor.source_path);
        if node.is_none() && self.descriptor.default_if_missing {
            return Ok(());
        }
        let parsed = node
            .and_then(parse_datetime_node)
            .ok_or_else(|| GraphError::DateParse {
                path: self.descriptor.source_path.to_string(),
                value: node.map(render_node),
            })?;
        *(self.slot)(target) = parsed;
        Ok(())
    }
}

pub(crate) struct NullableDateTimeField<T> {
    pub(crate) descriptor: FieldDescriptor,
    pub(crate) slot: Slot<T, Option<DateTime<Utc>>>,
}

impl<T> FieldStrategy<T> for NullableDateTimeField<T> {
    fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    fn apply(&self, root: &Value, target: &mut T, _session: &Session) -> GraphResult<()> {
        if let Some(parsed) =
            resolve_path(root, self.descriptor.source_path).and_then(parse_datetime_node)
        {
            *(self.slot)(target) = Some(parsed);
        }
        Ok(())
    }
}

pub(crate) struct NestedEntityField<T, E> {
    pub(crate) descriptor: FieldDescriptor,
    pub(crate) slot: Slot<T, Option<E>>,
}

impl<T, E: GraphEntity> FieldStrategy<T> for NestedEntityField<T, E> {
    fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    fn apply(&self, root: &Value, target: &mut T, session: &Session) -> GraphResult<()> {
        if let Some(node) = resolve_path(root, self.descriptor.source_path) {
            let nested = materialize::<E>(node, session, true)?;
            *(self.slot)(target) = Some(nested);
        }
        Ok(())
    }
}

pub(crate) struct EntityArrayField<T, E> {
    pub(crate) descriptor: FieldDescriptor,
    pub(crate) slot: Slot<T, Option<Vec<E>>>,
}

impl<T, E: GraphEntity> FieldStrategy<T> for EntityArrayField<T, E> {
    fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    fn apply(&self, root: &Value, target: &mut T, session: &Session) -> GraphResult<()> {
        let Some(Value::Array(items)) = resolve_path(root, self.descriptor.source_path) else {
            return Ok(());
        };
        let mut elements = Vec::with_capacity(items.len());
        for item in items {
            elements.push(materialize::<E>(item, session, true)?);
        }
        *(self.slot)(target) = Some(elements);
        Ok(())
    }
}

pub(crate) struct ConnectionField<T, E> {
    pub(crate) descriptor: FieldDescriptor,
    pub(crate) slot: Slot<T, Option<Connection<E>>>,
}

impl<T: GraphEntity, E: Materialize> FieldStrategy<T> for ConnectionField<T, E> {
    fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    fn apply(&self, root: &Value, target: &mut T, session: &Session) -> GraphResult<()> {
        let relation = self.descriptor.source_path;
        let source_id = target
            .header()
            .id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| GraphError::MissingSourceId {
                relation: relation.to_string(),
            })?;
        let connection = match resolve_path(root, relation) {
            Some(page) => Connection::preloaded(source_id, relation, page.clone(), session.clone())?,
            None => Connection::new(source_id, relation, session.clone())?,
        };
        *(self.slot)(target) = Some(connection);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, TimeZone, Timelike};
    use serde_json::json;

    use super::*;

    #[test]
    fn integers_accept_numbers_and_numeric_text() {
        assert_eq!(i32::coerce(&json!(42)), Some(42));
        assert_eq!(i32::coerce(&json!("-7")), Some(-7));
        assert_eq!(i32::coerce(&json!(3.0)), Some(3));
        assert_eq!(i32::coerce(&json!(3.5)), None);
        assert_eq!(u8::coerce(&json!(300)), None);
        assert_eq!(i64::coerce(&json!(true)), None);
        assert_eq!(i64::coerce(&json!({"n": 1})), None);
    }

    #[test]
    fn floats_and_bools() {
        assert_eq!(f32::coerce(&json!(37.25)), Some(37.25));
        assert_eq!(f64::coerce(&json!("-122.5")), Some(-122.5));
        assert_eq!(f64::coerce(&json!([1.0])), None);
        assert_eq!(bool::coerce(&json!(true)), Some(true));
        assert_eq!(bool::coerce(&json!(0)), Some(false));
        assert_eq!(bool::coerce(&json!("false")), Some(false));
        assert_eq!(bool::coerce(&json!(2)), None);
    }

    #[test]
    fn graph_timestamps_parse() {
        let parsed = parse_graph_datetime("2010-05-07T18:43:27+0000").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2010, 5, 7, 18, 43, 27).unwrap());

        let parsed = parse_graph_datetime("2010-05-07T20:43:27+02:00").unwrap();
        assert_eq!(parsed.hour(), 18);

        let parsed = parse_graph_datetime("2011-01-02T03:04:05").unwrap();
        assert_eq!(parsed.day(), 2);

        let parsed = parse_graph_datetime("1985-06-15").unwrap();
        assert_eq!((parsed.year(), parsed.hour()), (1985, 0));

        assert!(parse_graph_datetime("soon").is_none());
        assert!(parse_graph_datetime("").is_none());
    }

    #[test]
    fn unix_seconds_are_timestamps() {
        let parsed = parse_datetime_node(&json!(1_286_463_600)).unwrap();
        assert_eq!(parsed.timestamp(), 1_286_463_600);
        assert!(parse_datetime_node(&json!(true)).is_none());
    }
}
