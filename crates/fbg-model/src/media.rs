//! Photos, albums and videos.

use chrono::{DateTime, Utc};
use fbg_core::{Connection, EntityHeader, EntitySchema, GraphEntity};

use crate::content::Comment;
use crate::social::Friend;

/// A person tagged in a photo, positioned in percent of width and height.
#[derive(Debug, Default, PartialEq)]
pub struct FriendTag {
    header: EntityHeader,
    pub name: Option<String>,
    pub x: f32,
    pub y: f32,
    pub created_time: DateTime<Utc>,
}

impl GraphEntity for FriendTag {
    fbg_core::entity_header!(header);

    fn describe(schema: &mut EntitySchema<Self>) {
        schema
            .string("name", |t| &mut t.name)
            .scalar("x", |t| &mut t.x)
            .scalar("y", |t| &mut t.y)
            .datetime_or_default("created_time", |t| &mut t.created_time);
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct Photo {
    header: EntityHeader,
    pub from: Option<Friend>,
    pub tags: Option<Vec<FriendTag>>,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub source: Option<String>,
    pub height: i32,
    pub width: i32,
    pub link: Option<String>,
    pub created_time: DateTime<Utc>,
    pub updated_time: DateTime<Utc>,
    pub comments: Option<Connection<Comment>>,
}

impl GraphEntity for Photo {
    const TYPE_TAG: Option<&'static str> = Some("photo");
    fbg_core::entity_header!(header);

    fn describe(schema: &mut EntitySchema<Self>) {
        schema
            .nested("from", |p| &mut p.from)
            .entity_array("tags/data", |p| &mut p.tags)
            .string("name", |p| &mut p.name)
            .string("picture", |p| &mut p.picture)
            .string("source", |p| &mut p.source)
            .scalar("height", |p| &mut p.height)
            .scalar("width", |p| &mut p.width)
            .string("link", |p| &mut p.link)
            .datetime_or_default("created_time", |p| &mut p.created_time)
            .datetime_or_default("updated_time", |p| &mut p.updated_time)
            .connection("comments", |p| &mut p.comments);
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct Album {
    header: EntityHeader,
    pub from: Option<Friend>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub link: Option<String>,
    pub count: i32,
    pub created_time: DateTime<Utc>,
    pub updated_time: DateTime<Utc>,
    pub photos: Option<Connection<Photo>>,
    pub comments: Option<Connection<Comment>>,
}

impl GraphEntity for Album {
    const TYPE_TAG: Option<&'static str> = Some("album");
    fbg_core::entity_header!(header);

    fn describe(schema: &mut EntitySchema<Self>) {
        schema
            .nested("from", |a| &mut a.from)
            .string("name", |a| &mut a.name)
            .string("description", |a| &mut a.description)
            .string("location", |a| &mut a.location)
            .string("link", |a| &mut a.link)
            .scalar("count", |a| &mut a.count)
            .datetime_or_default("created_time", |a| &mut a.created_time)
            .datetime_or_default("updated_time", |a| &mut a.updated_time)
            .connection("photos", |a| &mut a.photos)
            .connection("comments", |a| &mut a.comments);
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct Video {
    header: EntityHeader,
    pub from: Option<Friend>,
    pub message: Option<String>,
    pub description: Option<String>,
    /// Duration in seconds.
    pub length: i32,
    pub created_time: DateTime<Utc>,
    pub updated_time: DateTime<Utc>,
    pub comments: Option<Connection<Comment>>,
}

impl GraphEntity for Video {
    const TYPE_TAG: Option<&'static str> = Some("video");
    fbg_core::entity_header!(header);

    fn describe(schema: &mut EntitySchema<Self>) {
        schema
            .nested("from", |v| &mut v.from)
            .string("message", |v| &mut v.message)
            .string("description", |v| &mut v.description)
            .scalar("length", |v| &mut v.length)
            .datetime_or_default("created_time", |v| &mut v.created_time)
            .datetime_or_default("updated_time", |v| &mut v.updated_time)
            .connection("comments", |v| &mut v.comments);
    }
}
