//! Materialization behaviour over hand-declared entity types.

use chrono::{DateTime, TimeZone, Utc};
use fbg_core::{
    Connection, EntityHeader, EntitySchema, GraphEntity, GraphError, field_descriptors,
    materialize, resolve_path,
};
use fbg_testkit::{
    MockTransport, assert_field_error, assert_mapper_build_error, init_test_tracing,
};
use serde_json::json;

#[derive(Debug, Default, PartialEq)]
struct Buddy {
    header: EntityHeader,
    name: Option<String>,
}

impl GraphEntity for Buddy {
    fbg_core::entity_header!(header);

    fn describe(schema: &mut EntitySchema<Self>) {
        schema.string("name", |b| &mut b.name);
    }
}

#[derive(Debug, Default, PartialEq)]
struct Profile {
    header: EntityHeader,
    name: Option<String>,
    timezone: i32,
    updated_time: DateTime<Utc>,
    best_friend: Option<Buddy>,
    friends: Option<Connection<Buddy>>,
    circle: Option<Vec<Buddy>>,
}

impl GraphEntity for Profile {
    const TYPE_TAG: Option<&'static str> = Some("profile");
    fbg_core::entity_header!(header);

    fn describe(schema: &mut EntitySchema<Self>) {
        schema
            .string("name", |p| &mut p.name)
            .scalar_or_default("timezone", |p| &mut p.timezone)
            .datetime_or_default("updated_time", |p| &mut p.updated_time)
            .nested("best_friend", |p| &mut p.best_friend)
            .entity_array("circle", |p| &mut p.circle)
            .connection("friends", |p| &mut p.friends);
    }
}

#[derive(Debug, Default)]
struct Gathering {
    header: EntityHeader,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    latitude: Option<f32>,
    city: Option<String>,
}

impl GraphEntity for Gathering {
    fbg_core::entity_header!(header);

    fn describe(schema: &mut EntitySchema<Self>) {
        schema
            .datetime("start_time", |g| &mut g.start_time)
            .nullable_datetime("end_time", |g| &mut g.end_time)
            .nullable("venue/latitude", |g| &mut g.latitude)
            .string("venue/city", |g| &mut g.city);
    }
}

#[derive(Debug, Default)]
struct Broken {
    header: EntityHeader,
    city: Option<String>,
}

impl GraphEntity for Broken {
    fbg_core::entity_header!(header);

    fn describe(schema: &mut EntitySchema<Self>) {
        schema.string("venue//city", |b| &mut b.city);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Defaults and absent paths
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn absent_default_fields_keep_their_defaults() {
    init_test_tracing();
    let session = MockTransport::new().session();
    let profile: Profile = materialize(&json!({"id": "5"}), &session, false).unwrap();

    assert_eq!(profile.timezone, 0);
    assert_eq!(profile.updated_time, DateTime::<Utc>::default());
    assert!(profile.name.is_none());
    assert!(profile.best_friend.is_none());
    assert!(profile.circle.is_none());
}

#[test]
fn missing_intermediate_segment_leaves_fields_unset() {
    init_test_tracing();
    let session = MockTransport::new().session();
    let doc = json!({"id": "9", "start_time": "2010-10-07T14:00:00+0000"});

    assert!(resolve_path(&doc, "venue/latitude").is_none());
    let gathering: Gathering = materialize(&doc, &session, false).unwrap();
    assert!(gathering.latitude.is_none());
    assert!(gathering.city.is_none());
    assert!(gathering.end_time.is_none());
}

#[test]
fn nested_paths_are_followed() {
    let session = MockTransport::new().session();
    let doc = json!({
        "id": "9",
        "start_time": "2010-10-07T14:00:00+0000",
        "end_time": "whenever",
        "venue": {"latitude": 51.75, "city": "Oxford"}
    });
    let gathering: Gathering = materialize(&doc, &session, false).unwrap();
    assert_eq!(gathering.latitude, Some(51.75));
    assert_eq!(gathering.city.as_deref(), Some("Oxford"));
    assert_eq!(
        gathering.start_time,
        Utc.with_ymd_and_hms(2010, 10, 7, 14, 0, 0).unwrap()
    );
    assert!(gathering.end_time.is_none());
}

#[test]
fn bad_nullable_scalar_is_a_hard_error() {
    let session = MockTransport::new().session();
    let result = materialize::<Gathering>(
        &json!({"start_time": "2010-10-07T14:00:00+0000", "venue": {"latitude": "north"}}),
        &session,
        false,
    );
    assert_field_error(&result, "venue/latitude");
    match result {
        Err(GraphError::TypeMismatch { expected, found, .. }) => {
            assert_eq!(expected, "f32");
            assert!(found.contains("north"));
        }
        other => panic!("expected a type mismatch, got {other:?}"),
    }
}

#[test]
fn broken_field_table_fails_on_every_use() {
    let session = MockTransport::new().session();
    for _ in 0..2 {
        assert_mapper_build_error(&materialize::<Broken>(&json!({}), &session, false));
    }
    assert_mapper_build_error(&field_descriptors::<Broken>());
}

// ─────────────────────────────────────────────────────────────────────────────
// Dates
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn unparsable_required_date_names_its_path() {
    init_test_tracing();
    let session = MockTransport::new().session();
    let result = materialize::<Gathering>(&json!({"start_time": "soon"}), &session, false);
    assert_field_error(&result, "start_time");
}

#[test]
fn absent_required_date_fails_without_default() {
    let session = MockTransport::new().session();
    let result = materialize::<Gathering>(&json!({"id": "1"}), &session, false);
    assert_field_error(&result, "start_time");
}

#[test]
fn present_but_bad_default_date_still_fails() {
    let session = MockTransport::new().session();
    let result = materialize::<Profile>(
        &json!({"id": "1", "updated_time": "yesterday"}),
        &session,
        false,
    );
    assert_field_error(&result, "updated_time");
}

// ─────────────────────────────────────────────────────────────────────────────
// Strings, nesting, idempotence
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn strings_are_lenient() {
    init_test_tracing();
    let session = MockTransport::new().session();
    let numeric: Profile = materialize(&json!({"id": 77, "name": 12}), &session, false).unwrap();
    assert_eq!(numeric.id(), Some("77"));
    assert_eq!(numeric.name.as_deref(), Some("12"));

    let compound: Profile =
        materialize(&json!({"id": "1", "name": {"first": "A"}}), &session, false).unwrap();
    assert!(compound.name.is_none());
}

#[test]
fn nested_and_array_entities_are_connection_views() {
    let session = MockTransport::new().session();
    let doc = json!({
        "id": "1",
        "best_friend": {"id": "2", "name": "Bob"},
        "circle": [{"id": "3", "name": "Eve"}, {"id": "4"}],
        "friends": "not-an-array"
    });
    let profile: Profile = materialize(&doc, &session, false).unwrap();

    assert!(!profile.is_connection_view());
    let best = profile.best_friend.as_ref().unwrap();
    assert!(best.is_connection_view());
    assert_eq!(best.name.as_deref(), Some("Bob"));

    let circle = profile.circle.as_ref().unwrap();
    assert_eq!(circle.len(), 2);
    assert!(circle.iter().all(GraphEntity::is_connection_view));
    assert_eq!(circle[1].id(), Some("4"));

    let scalar_circle: Profile =
        materialize(&json!({"id": "1", "circle": {"a": 1}}), &session, false).unwrap();
    assert!(scalar_circle.circle.is_none());
}

#[test]
fn materializing_twice_is_identical() {
    let session = MockTransport::new().session();
    let doc = json!({
        "id": "123",
        "name": "Alice",
        "timezone": 2,
        "updated_time": "2011-01-02T03:04:05+0000",
        "best_friend": {"id": "2", "name": "Bob"},
        "friends": {"data": [{"id": "1", "name": "Bob"}]}
    });
    let first: Profile = materialize(&doc, &session, false).unwrap();
    let second: Profile = materialize(&doc, &session, false).unwrap();
    assert_eq!(first, second);
}

// ─────────────────────────────────────────────────────────────────────────────
// Connections
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn embedded_connection_is_loaded_without_fetching() {
    init_test_tracing();
    let transport = MockTransport::new();
    let session = transport.session();
    let doc = json!({"id": "123", "name": "Alice", "friends": {"data": [{"id": "1", "name": "Bob"}]}});

    let profile: Profile = materialize(&doc, &session, false).unwrap();
    assert_eq!(profile.id(), Some("123"));
    assert_eq!(profile.name.as_deref(), Some("Alice"));

    let friends = profile.friends.as_ref().unwrap();
    assert!(friends.is_loaded());
    let buddies = friends.entities().await.unwrap();
    assert_eq!(buddies.len(), 1);
    assert_eq!(buddies[0].id(), Some("1"));
    assert_eq!(buddies[0].name.as_deref(), Some("Bob"));
    assert_eq!(transport.call_count(), 0);
}

#[test]
fn absent_connection_is_constructed_unloaded() {
    let session = MockTransport::new().session();
    let profile: Profile = materialize(&json!({"id": "123"}), &session, false).unwrap();
    let friends = profile.friends.unwrap();
    assert!(!friends.is_loaded());
    assert_eq!(friends.source_id(), "123");
    assert_eq!(friends.relation(), "friends");
    assert_eq!(
        friends.url().as_str(),
        "https://graph.example.com/123/friends?access_token=test-token-123"
    );
}

#[test]
fn connection_without_source_id_is_rejected() {
    let session = MockTransport::new().session();
    let err = materialize::<Profile>(&json!({"name": "nobody"}), &session, false).unwrap_err();
    assert!(matches!(err, fbg_core::GraphError::MissingSourceId { ref relation } if relation == "friends"));
}
