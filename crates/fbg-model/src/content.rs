//! Posts, status updates, links, notes, messages and comments.

use chrono::{DateTime, Utc};
use fbg_core::{Connection, EntityHeader, EntitySchema, GraphEntity};

use crate::social::Friend;

#[derive(Debug, Default, PartialEq)]
pub struct Comment {
    header: EntityHeader,
    pub from: Option<Friend>,
    pub message: Option<String>,
    pub created_time: DateTime<Utc>,
}

impl GraphEntity for Comment {
    fbg_core::entity_header!(header);

    fn describe(schema: &mut EntitySchema<Self>) {
        schema
            .nested("from", |c| &mut c.from)
            .string("message", |c| &mut c.message)
            .datetime_or_default("created_time", |c| &mut c.created_time);
    }
}

/// A feed entry. The API tags these as `feed`.
#[derive(Debug, Default, PartialEq)]
pub struct Post {
    header: EntityHeader,
    pub from: Option<Friend>,
    pub message: Option<String>,
    pub picture: Option<String>,
    pub link: Option<String>,
    pub name: Option<String>,
    pub caption: Option<String>,
    pub description: Option<String>,
    pub source: Option<String>,
    pub icon: Option<String>,
    /// Application the post was made with.
    pub attribution: Option<String>,
    pub likes: Option<i32>,
    pub created_time: DateTime<Utc>,
    pub updated_time: DateTime<Utc>,
    pub comments: Option<Connection<Comment>>,
}

impl GraphEntity for Post {
    const TYPE_TAG: Option<&'static str> = Some("feed");
    fbg_core::entity_header!(header);

    fn describe(schema: &mut EntitySchema<Self>) {
        schema
            .nested("from", |p| &mut p.from)
            .string("message", |p| &mut p.message)
            .string("picture", |p| &mut p.picture)
            .string("link", |p| &mut p.link)
            .string("name", |p| &mut p.name)
            .string("caption", |p| &mut p.caption)
            .string("description", |p| &mut p.description)
            .string("source", |p| &mut p.source)
            .string("icon", |p| &mut p.icon)
            .string("attribution", |p| &mut p.attribution)
            .nullable("likes", |p| &mut p.likes)
            .datetime_or_default("created_time", |p| &mut p.created_time)
            .datetime_or_default("updated_time", |p| &mut p.updated_time)
            .connection("comments", |p| &mut p.comments);
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct Status {
    header: EntityHeader,
    pub from: Option<Friend>,
    pub message: Option<String>,
    pub updated_time: DateTime<Utc>,
    pub comments: Option<Connection<Comment>>,
}

impl GraphEntity for Status {
    const TYPE_TAG: Option<&'static str> = Some("status");
    fbg_core::entity_header!(header);

    fn describe(schema: &mut EntitySchema<Self>) {
        schema
            .nested("from", |s| &mut s.from)
            .string("message", |s| &mut s.message)
            .datetime_or_default("updated_time", |s| &mut s.updated_time)
            .connection("comments", |s| &mut s.comments);
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct Link {
    header: EntityHeader,
    pub from: Option<Friend>,
    pub message: Option<String>,
    pub link: Option<String>,
    pub updated_time: DateTime<Utc>,
    pub comments: Option<Connection<Comment>>,
}

impl GraphEntity for Link {
    const TYPE_TAG: Option<&'static str> = Some("link");
    fbg_core::entity_header!(header);

    fn describe(schema: &mut EntitySchema<Self>) {
        schema
            .nested("from", |l| &mut l.from)
            .string("message", |l| &mut l.message)
            .string("link", |l| &mut l.link)
            .datetime_or_default("updated_time", |l| &mut l.updated_time)
            .connection("comments", |l| &mut l.comments);
    }
}

/// A note. `from` is kept as the raw value the API sends.
#[derive(Debug, Default, PartialEq)]
pub struct Note {
    header: EntityHeader,
    pub from: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    pub created_time: DateTime<Utc>,
    pub updated_time: DateTime<Utc>,
    pub comments: Option<Connection<Comment>>,
}

impl GraphEntity for Note {
    fbg_core::entity_header!(header);

    fn describe(schema: &mut EntitySchema<Self>) {
        schema
            .string("from", |n| &mut n.from)
            .string("subject", |n| &mut n.subject)
            .string("message", |n| &mut n.message)
            .datetime_or_default("created_time", |n| &mut n.created_time)
            .datetime_or_default("updated_time", |n| &mut n.updated_time)
            .connection("comments", |n| &mut n.comments);
    }
}

/// A private message thread; replies arrive through `comments`.
#[derive(Debug, Default, PartialEq)]
pub struct Message {
    header: EntityHeader,
    pub from: Option<Friend>,
    pub to: Option<Vec<Friend>>,
    pub subject: Option<String>,
    pub message: Option<String>,
    pub updated_time: DateTime<Utc>,
    pub comments: Option<Connection<Comment>>,
}

impl GraphEntity for Message {
    fbg_core::entity_header!(header);

    fn describe(schema: &mut EntitySchema<Self>) {
        schema
            .nested("from", |m| &mut m.from)
            .entity_array("to/data", |m| &mut m.to)
            .string("subject", |m| &mut m.subject)
            .string("message", |m| &mut m.message)
            .datetime_or_default("updated_time", |m| &mut m.updated_time)
            .connection("comments", |m| &mut m.comments);
    }
}
