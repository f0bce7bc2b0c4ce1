//! Test fixtures: credentials and representative API documents.

/// API root used by fixture sessions.
pub const TEST_BASE_URL: &str = "https://graph.example.com/";

/// Access token used by fixture sessions.
pub const TEST_TOKEN: &str = "test-token-123";

// ─────────────────────────────────────────────────────────────────────────────
// JSON Fixtures
// ─────────────────────────────────────────────────────────────────────────────

/// Representative response documents.
pub mod json {
    use serde_json::{Value, json};

    /// `{"error": {"type", "message"}}` as the API reports failures.
    #[must_use]
    pub fn error(error_type: &str, message: &str) -> Value {
        json!({
            "error": {
                "type": error_type,
                "message": message
            }
        })
    }

    /// An expired-token error.
    #[must_use]
    pub fn oauth_error() -> Value {
        json!({
            "error": {
                "type": "OAuthException",
                "message": "Error validating access token: Session has expired",
                "code": 190
            }
        })
    }

    /// A page of `data` with optional paging links.
    #[must_use]
    pub fn page(data: Vec<Value>, next: Option<&str>, previous: Option<&str>) -> Value {
        let mut page = json!({ "data": data });
        if next.is_some() || previous.is_some() {
            let mut paging = serde_json::Map::new();
            if let Some(next) = next {
                paging.insert("next".into(), json!(next));
            }
            if let Some(previous) = previous {
                paging.insert("previous".into(), json!(previous));
            }
            page["paging"] = Value::Object(paging);
        }
        page
    }

    /// A minimal friend reference.
    #[must_use]
    pub fn friend(id: &str, name: &str) -> Value {
        json!({ "id": id, "name": name })
    }

    /// A user with one embedded friend.
    #[must_use]
    pub fn user_alice() -> Value {
        json!({
            "id": "123",
            "name": "Alice",
            "friends": { "data": [ { "id": "1", "name": "Bob" } ] }
        })
    }

    /// A fully populated user profile.
    #[must_use]
    pub fn user_profile() -> Value {
        json!({
            "id": "123",
            "name": "Alice Liddell",
            "first_name": "Alice",
            "last_name": "Liddell",
            "link": "https://www.example.com/alice",
            "about": "Curious.",
            "birthday": "05/04/1852",
            "email": "alice@example.com",
            "website": "https://wonderland.example.com",
            "timezone": -1,
            "relationship_status": "Single",
            "updated_time": "2010-05-07T18:43:27+0000",
            "hometown": { "id": "108", "name": "Oxford" },
            "significant_other": { "id": "9", "name": "Hatter" },
            "work": [
                {
                    "employer": { "id": "200", "name": "Christ Church" },
                    "position": { "id": "201", "name": "Student" },
                    "start_date": "1860-01",
                    "end_date": "0000-00"
                }
            ],
            "education": [
                {
                    "school": { "id": "300", "name": "Home" },
                    "year": { "id": "301", "name": "1865" },
                    "concentration": [ { "id": "302", "name": "Logic" } ]
                }
            ],
            "type": "user"
        })
    }

    /// An event with a venue block.
    #[must_use]
    pub fn event_with_venue() -> Value {
        json!({
            "id": "331218348435",
            "owner": { "id": "123", "name": "Alice" },
            "name": "Tea party",
            "description": "Unbirthday celebration",
            "start_time": "2010-10-07T14:00:00+0000",
            "end_time": "2010-10-07T18:00:00+0000",
            "location": "The garden",
            "venue": {
                "street": "1 Rabbit Hole",
                "city": "Oxford",
                "country": "United Kingdom",
                "latitude": 51.752,
                "longitude": -1.2577
            },
            "privacy": "OPEN",
            "updated_time": "2010-09-30T07:15:32+0000"
        })
    }

    /// A photo with tags under `tags/data`.
    #[must_use]
    pub fn photo_with_tags() -> Value {
        json!({
            "id": "500",
            "from": { "id": "123", "name": "Alice" },
            "tags": {
                "data": [
                    { "id": "1", "name": "Bob", "x": 41.5, "y": 22.25, "created_time": "2010-05-07T18:43:27+0000" }
                ]
            },
            "name": "Croquet",
            "picture": "https://photos.example.com/500_s.jpg",
            "source": "https://photos.example.com/500_n.jpg",
            "height": 480,
            "width": 720,
            "link": "https://www.example.com/photo.php?pid=500",
            "created_time": "2010-05-07T18:43:27+0000",
            "updated_time": "2010-05-08T09:00:00+0000",
            "type": "photo"
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// URL Fixtures
// ─────────────────────────────────────────────────────────────────────────────

/// Path of a connection page on the mock API: `/{id}/{relation}`.
#[must_use]
pub fn connection_path(source_id: &str, relation: &str) -> String {
    format!("/{source_id}/{relation}")
}

/// Absolute URL of a further connection page on the fixture API.
#[must_use]
pub fn paging_url(source_id: &str, relation: &str, offset: usize) -> String {
    format!(
        "{TEST_BASE_URL}{source_id}/{relation}?access_token={TEST_TOKEN}&limit=25&offset={offset}"
    )
}
